use colored::Colorize;
use stratus_cloud::{StackProvider, StateManager};
use stratus_cloud_aws::AwsProvider;

pub async fn handle(yes: bool) -> anyhow::Result<()> {
    println!("{}", "Starting deployment...".blue().bold());

    let stack = stratus_core::website_stack();
    let project_root = std::env::current_dir()?;
    let provider = AwsProvider::connect(&project_root).await;

    println!("Stack: {}", stack.name.cyan());

    let auth = provider.check_auth().await?;
    if !auth.authenticated {
        anyhow::bail!(
            "not authenticated with AWS: {}",
            auth.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    println!("Account: {}", auth.account_info.unwrap_or_default().cyan());

    let plan = provider.plan(&stack).await?;
    println!();
    println!("{}", plan.summary().to_string().bold());

    if !yes {
        println!();
        println!(
            "{}",
            "Warning: this creates cloud resources and uploads the asset directory.".yellow()
        );
        println!("Re-run with --yes to apply");
        return Ok(());
    }

    println!();
    println!("{}", "Applying...".blue());
    let result = provider.apply(&stack, &plan).await?;

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
        anyhow::bail!("deployment failed after {} ms", result.duration_ms);
    }

    println!();
    println!(
        "{}",
        format!("Deployment finished in {} ms", result.duration_ms)
            .green()
            .bold()
    );

    // Outputs resolve against the state the apply just recorded.
    let state = StateManager::new(&project_root).load().await?;
    println!();
    println!("Outputs:");
    for output in &stack.outputs {
        match state.resolve(&output.value) {
            Ok(value) => println!("  {} = {}", output.name.cyan(), value),
            Err(e) => println!("  {} = {}", output.name.cyan(), format!("<{e}>").dimmed()),
        }
    }

    Ok(())
}
