//! Fatigue Analysis API - Main Entry Point

use api::{init_logging, run_server, ServerConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "fatigue-api", version, about = "Batch driver fatigue analysis server")]
struct Args {
    /// Settings file (defaults to ./monitor.toml when present)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Override the bind address
    #[arg(long)]
    bind: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    info!("=== Fatigue Analysis API v{} ===", env!("CARGO_PKG_VERSION"));

    let mut config = ServerConfig::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    run_server(config).await
}
