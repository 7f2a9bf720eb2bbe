//! Notes CLI - Main Entry Point
//!
//! Dashboard, list, detail, search and edit commands over a notes backend.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use notes_cli::commands::{config, note};
use notes_cli::output::{self, print_error};
use notes_client::NoteService;
use notes_common::{ClientConfig, MessageLog};

/// Notes CLI
#[derive(Parser)]
#[command(name = "notes")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// URL of the notes collection
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Print the message log after the command
    #[arg(short, long, global = true)]
    messages: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Note(note::NoteCommands),

    /// Inspect or create the configuration file
    #[command(subcommand)]
    Config(config::ConfigCommands),

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(notes_common::default_config_path);
    let mut client_config = ClientConfig::load(&config_path)?.with_env()?;
    if let Some(url) = cli.base_url {
        client_config.base_url = url;
    }

    match cli.command {
        Commands::Note(cmd) => {
            let messages = MessageLog::new();
            let service = NoteService::new(&client_config, messages.clone())?;

            let result = note::execute(cmd, &service, cli.format).await;
            if cli.messages {
                output::print_messages(&messages.messages(), cli.format);
            }
            if let Err(e) = result {
                print_error(&e.to_string());
                std::process::exit(1);
            }
        }
        Commands::Config(cmd) => config::execute(cmd, &client_config, &config_path)?,
        Commands::Version => {
            println!("Notes CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Collection: {}", client_config.base_url);
        }
    }

    Ok(())
}
