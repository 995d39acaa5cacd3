//! AbuseIPDB MCP server CLI.

use abuseipdb_mcp::{
    AbuseIpdbClient, AbuseIpdbServer, Config, Dispatcher, TokenBudgetGuard, ToolRegistry,
};
use anyhow::{Context, Result};
use clap::Parser;
use rmcp::service::serve_server;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "abuseipdb-mcp")]
#[command(about = "MCP server for AbuseIPDB - IP reputation, CIDR block checks and blacklist summaries")]
#[command(version)]
struct Args {
    /// Path to configuration file (environment variables are used when omitted)
    #[arg(short, long, env = "ABUSEIPDB_MCP_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "info")]
    log_level: String,

    /// Print example configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            let mut config = Config::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            config.apply_env_overrides()?;
            config.validate()?;
            Ok(config)
        }
        None => {
            info!("Loading configuration from environment");
            Config::from_env()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        println!("{}", Config::example());
        return Ok(());
    }

    // stdout carries the MCP stream, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(args.config.as_ref())?;

    if args.validate {
        info!("Configuration is valid");
        return Ok(());
    }

    let client = AbuseIpdbClient::new(&config.abuseipdb)?;
    let registry = ToolRegistry::with_default_operations()?;
    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        Arc::new(client),
        TokenBudgetGuard::new(config.limits.max_token_call),
    );
    let server = AbuseIpdbServer::new(Arc::new(dispatcher), config.server.clone());

    info!(
        name = %config.server.name,
        max_token_call = config.limits.max_token_call,
        "Starting AbuseIPDB MCP server on stdio"
    );

    let running = serve_server(server, rmcp::transport::stdio())
        .await
        .map_err(|e| anyhow::anyhow!("failed to start server: {e}"))?;
    running
        .waiting()
        .await
        .map_err(|e| anyhow::anyhow!("server task ended: {e}"))?;

    Ok(())
}
