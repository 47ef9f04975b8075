//! MCPBench web harness binary

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mcpbench_web::HarnessConfig;

#[derive(Parser)]
#[command(name = "mcpbench-web")]
#[command(about = "MCPBench test environment - pages and mock APIs for browser automation")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "MCPBENCH_CONFIG")]
    config: Option<PathBuf>,

    /// HTTP listen address
    #[arg(short, long, env = "MCPBENCH_LISTEN")]
    listen: Option<String>,

    /// SQLite database path (`:memory:` for a throwaway store)
    #[arg(long, env = "MCPBENCH_DB")]
    db: Option<PathBuf>,

    /// Disable simulated network latency
    #[arg(long, env = "MCPBENCH_NO_LATENCY")]
    no_latency: bool,

    /// Enable debug logging
    #[arg(short, long, env = "MCPBENCH_DEBUG")]
    debug: bool,
}

/// `--debug` beats `RUST_LOG`, which beats the `info` default.
fn log_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.debug))
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli
        .config
        .unwrap_or_else(|| mcpbench_common::default_store_path().join("config.toml"));
    let mut config = HarnessConfig::load(&config_path)?;

    if let Some(listen) = cli.listen {
        config.listen = listen;
    }
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if cli.no_latency {
        config.simulate_latency = false;
    }

    info!("MCPBench web v{}", mcpbench_common::VERSION);
    info!(
        "Database: {:?}, simulated latency: {}",
        config.db_path, config.simulate_latency
    );

    mcpbench_web::server::serve(config).await
}
