//! E2E harness entry point
//!
//! Runs the YAML scenarios against a freshly spawned server.
//! Run with: cargo build -p mcpbench-web && cargo test -p mcpbench-e2e --test e2e

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use mcpbench_e2e::runner::RunnerConfig;
use mcpbench_e2e::server::ServerConfig;
use mcpbench_e2e::{E2eResult, ScenarioRunner};

#[derive(Parser, Debug)]
#[command(name = "mcpbench-e2e")]
#[command(about = "E2E scenario runner for the MCPBench test environment")]
struct Args {
    /// Path to the scenarios directory
    #[arg(short, long, default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios"))]
    scenarios: PathBuf,

    /// Run only scenarios with this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only the scenario with this name
    #[arg(short, long)]
    name: Option<String>,

    /// Path to web server binary
    #[arg(long, default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/../../target/debug/mcpbench-web"))]
    server_binary: PathBuf,

    /// Port to run server on (0 = auto)
    #[arg(long, default_value = "0")]
    port: u16,

    /// Target an already running server instead of spawning one
    #[arg(long)]
    base_url: Option<String>,

    /// Keep the simulated network delays on
    #[arg(long)]
    latency: bool,

    /// Forward server logs to stderr
    #[arg(long)]
    server_logs: bool,

    /// Output directory for results
    #[arg(short, long, default_value = "test-results")]
    output: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // `cargo test` forwards libtest flags like --nocapture; ignore them
    let args = Args::parse_from(
        std::env::args().filter(|a| !matches!(a.as_str(), "--nocapture" | "--quiet" | "-q")),
    );

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            std::process::exit(2);
        }
    };

    match rt.block_on(async_main(args)) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> E2eResult<bool> {
    if args.base_url.is_none() && !args.server_binary.exists() {
        tracing::warn!(
            "Server binary {} not found; build mcpbench-web first. Skipping scenarios.",
            args.server_binary.display()
        );
        return Ok(true);
    }

    let config = RunnerConfig {
        server: ServerConfig {
            binary_path: args.server_binary,
            port: if args.port == 0 { None } else { Some(args.port) },
            simulate_latency: args.latency,
            show_server_logs: args.server_logs,
            ..Default::default()
        },
        base_url: args.base_url,
        scenarios_dir: args.scenarios,
        output_dir: args.output,
    };

    let mut runner = ScenarioRunner::with_config(config);
    runner.start_server().await?;

    let results = if let Some(name) = args.name {
        runner.run_named(&name).await?
    } else if let Some(tag) = args.tag {
        runner.run_tagged(&tag).await?
    } else {
        runner.run_all().await?
    };

    runner.write_results(&results)?;

    Ok(results.success())
}
