use colored::Colorize;
use std::path::PathBuf;

pub async fn handle(output: Option<PathBuf>) -> anyhow::Result<()> {
    let stack = stratus_core::website_stack();
    let rendered = stratus_core::synth::render_string(&stack)?;

    match output {
        Some(path) => {
            std::fs::write(&path, rendered)?;
            println!(
                "{} {}",
                "Declaration written to".green(),
                path.display().to_string().cyan()
            );
        }
        None => print!("{rendered}"),
    }

    Ok(())
}
