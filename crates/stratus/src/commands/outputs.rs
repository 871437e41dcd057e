use colored::Colorize;
use stratus_cloud::StateManager;

pub async fn handle() -> anyhow::Result<()> {
    let stack = stratus_core::website_stack();
    let project_root = std::env::current_dir()?;
    let state = StateManager::new(&project_root).load().await?;

    if state.resources.is_empty() {
        println!("{}", "No recorded state; run deploy first".yellow());
        return Ok(());
    }

    for output in &stack.outputs {
        match state.resolve(&output.value) {
            Ok(value) => {
                println!("{} = {}", output.name.cyan(), value);
                println!("  {}", output.description.dimmed());
            }
            Err(e) => {
                println!("{} = {}", output.name.cyan(), format!("<{e}>").dimmed());
            }
        }
    }

    Ok(())
}
