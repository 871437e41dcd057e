mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stratus")]
#[command(about = "Declare, deploy, and tear down the static-site edge stack", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the stack declaration as JSON
    Synth {
        /// Write the declaration to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check the declaration and print a summary
    Validate,
    /// Show what deploy would change
    Plan,
    /// Provision the stack and deploy the assets
    Deploy {
        /// Run without confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Tear the stack down
    Destroy {
        /// Run without confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Print stack outputs recorded by the last deploy
    Outputs,
    /// Print version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt::init();

    if matches!(cli.command, Commands::Version) {
        println!("stratus {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    match cli.command {
        Commands::Synth { output } => commands::synth::handle(output).await,
        Commands::Validate => commands::validate::handle().await,
        Commands::Plan => commands::plan::handle().await,
        Commands::Deploy { yes } => commands::deploy::handle(yes).await,
        Commands::Destroy { yes } => commands::destroy::handle(yes).await,
        Commands::Outputs => commands::outputs::handle().await,
        Commands::Version => unreachable!("handled above"),
    }
}
