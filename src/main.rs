//! Hex Arena - Server Entry Point
//!
//! Loads configuration, sets up logging and serves the arena over TCP.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use hex_arena::core::config::ArenaConfig;
use hex_arena::core::error::Result;
use hex_arena::net::ArenaServer;

/// Hex Arena server
#[derive(Parser, Debug)]
#[command(name = "hex-arena")]
#[command(about = "Authoritative server for the hex auto-battler")]
struct Args {
    /// Interface to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// TCP port to listen on
    #[arg(long, default_value_t = 50007)]
    port: u16,

    /// TOML config file; missing keys use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for round pairing (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hex_arena=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ArenaConfig::load(path)?,
        None => ArenaConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    tracing::info!(host = %args.host, port = args.port, "Hex Arena starting...");
    let server = ArenaServer::bind((args.host.as_str(), args.port), config).await?;
    server.run().await
}
