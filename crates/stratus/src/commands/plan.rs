use colored::Colorize;
use stratus_cloud::{ActionType, StackProvider};
use stratus_cloud_aws::AwsProvider;

pub async fn handle() -> anyhow::Result<()> {
    let stack = stratus_core::website_stack();
    let project_root = std::env::current_dir()?;
    let provider = AwsProvider::connect(&project_root).await;

    println!("{}", "Checking AWS credentials...".blue());
    let auth = provider.check_auth().await?;
    if !auth.authenticated {
        anyhow::bail!(
            "not authenticated with AWS: {}",
            auth.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    println!(
        "  ✓ {}",
        auth.account_info.unwrap_or_default().cyan()
    );

    println!();
    println!("{}", format!("Planning stack {}...", stack.name).blue());
    let plan = provider.plan(&stack).await?;

    println!();
    for action in &plan.actions {
        let marker = match action.action_type {
            ActionType::Create => "+".green().bold(),
            ActionType::Update => "~".yellow().bold(),
            ActionType::Delete => "-".red().bold(),
            ActionType::NoOp => "·".dimmed(),
        };
        println!("  {} {} {}", marker, action.key().cyan(), action.description);
    }

    println!();
    println!("{}", plan.summary().to_string().bold());
    Ok(())
}
