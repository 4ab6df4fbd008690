//! rollcall - Event attendance console

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rollcall::config::Config;
use rollcall::console::Console;
use std::io::IsTerminal;
use std::path::PathBuf;
use tokio::io::BufReader;

#[derive(Parser)]
#[command(name = "rollcall")]
#[command(about = "Track event registrations, check-ins and waitlists for one session")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read commands interactively from stdin
    Repl,
    /// Execute the commands of a script file
    Run {
        /// Script path, one command per line
        script: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let console = Console::new(&config);
    let stdout = tokio::io::stdout();

    let duration = match cli.command {
        Some(Commands::Run { script }) => {
            tracing::info!("Running script: {:?}", script);
            let file = tokio::fs::File::open(&script)
                .await
                .with_context(|| format!("Failed to open script {:?}", script))?;
            console.run(BufReader::new(file), stdout, false).await?
        }
        Some(Commands::Repl) | None => {
            let interactive = std::io::stdin().is_terminal();
            console
                .run(BufReader::new(tokio::io::stdin()), stdout, interactive)
                .await?
        }
    };

    tracing::info!("Session lasted {}s", duration.num_seconds());
    Ok(())
}
