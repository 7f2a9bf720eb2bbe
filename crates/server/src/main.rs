//! Notes server - Main Entry Point

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use notes_server::ServerConfig;

#[derive(Parser)]
#[command(name = "notes-server")]
#[command(about = "Reference backend for the notes collection")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides config and NOTES_SERVER_LISTEN)
    #[arg(short, long)]
    listen: Option<String>,

    /// SQLite database file (overrides config and NOTES_SERVER_DB)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Start with an empty store
    #[arg(long)]
    no_seed: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!("Notes server v{}", notes_common::VERSION);

    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    }
    .with_env()?;

    if let Some(listen) = cli.listen {
        config.listen = listen;
    }
    if let Some(db) = cli.db {
        config.db_path = Some(db);
    }
    if cli.no_seed {
        config.seed = false;
    }

    notes_server::server::serve(config).await
}
