use colored::Colorize;
use stratus_cloud::StackProvider;
use stratus_cloud_aws::AwsProvider;

pub async fn handle(yes: bool) -> anyhow::Result<()> {
    let stack = stratus_core::website_stack();

    if !yes {
        println!(
            "{}",
            format!(
                "Warning: this tears down stack {} including the bucket contents.",
                stack.name
            )
            .yellow()
        );
        println!("Re-run with --yes to destroy");
        return Ok(());
    }

    let project_root = std::env::current_dir()?;
    let provider = AwsProvider::connect(&project_root).await;

    let auth = provider.check_auth().await?;
    if !auth.authenticated {
        anyhow::bail!(
            "not authenticated with AWS: {}",
            auth.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }

    println!("{}", format!("Destroying stack {}...", stack.name).blue());
    let result = provider.destroy(&stack).await?;

    for success in &result.succeeded {
        println!("  ✓ {} {}", success.key.cyan(), success.message);
    }
    for failure in &result.failed {
        println!(
            "  ✗ {} {}",
            failure.key.red(),
            failure.error.as_deref().unwrap_or("unknown error")
        );
    }

    if !result.is_success() {
        anyhow::bail!("teardown failed after {} ms", result.duration_ms);
    }

    println!();
    println!("{}", "Stack destroyed".green().bold());
    Ok(())
}
