use colored::Colorize;

pub async fn handle() -> anyhow::Result<()> {
    println!("{}", "Checking the stack declaration...".blue());

    let stack = stratus_core::website_stack();
    match stratus_core::synth::render(&stack) {
        Ok(_) => {
            println!("{}", "✓ Declaration is well formed".green().bold());
            println!();
            println!("Summary:");
            println!("  Stack: {} ({})", stack.name.cyan(), stack.description);
            println!("  Tags: {}", stack.tags.len());
            for (key, value) in stack.tags.iter() {
                println!("    - {}={}", key.cyan(), value);
            }
            println!("  Resources: {}", stack.resources.len());
            for resource in &stack.resources {
                println!(
                    "    - {} ({} tags)",
                    resource.key().cyan(),
                    resource.tags.len()
                );
            }
            println!("  Outputs: {}", stack.outputs.len());
            for output in &stack.outputs {
                println!("    - {}: {}", output.name.cyan(), output.description);
            }
        }
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ Declaration error".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
