use clap::Parser;
use eth_tx_monitor::api::{ApiServer, AppState};
use eth_tx_monitor::blockchain::{RpcClient, ScanEngine};
use eth_tx_monitor::config::AppConfig;
use eth_tx_monitor::error::Result;
use eth_tx_monitor::logging::{init_logging, ErrorLogger, LogContext};
use eth_tx_monitor::store::{DedupTracker, TransactionStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

#[derive(Parser)]
#[command(name = "tx-monitor")]
#[command(about = "Watches an Ethereum-compatible chain for transactions of subscribed addresses")]
#[command(version)]
struct Args {
    /// Configuration file (defaults to $CONFIG_PATH or configs/config.toml)
    #[arg(long)]
    config: Option<String>,

    /// Override the listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config_path = args.config.unwrap_or_else(AppConfig::config_path);
    let mut config = match AppConfig::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration from {}: {}", config_path, e);
            return Err(e.into());
        }
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let root = init_logging(&config.logging);
    if let Err(e) = run(config, &root).await {
        ErrorLogger::log_error(&root, &e);
        return Err(e.into());
    }
    Ok(())
}

async fn run(config: AppConfig, root: &LogContext) -> Result<()> {
    root.info(&format!("Starting transaction monitor against {}", config.rpc.endpoint));

    let rpc_client = RpcClient::new(
        config.rpc.endpoint.clone(),
        Duration::from_secs(config.rpc.timeout_seconds),
        root,
    )?;
    let store = Arc::new(TransactionStore::new());
    let dedup = Arc::new(DedupTracker::new());
    let engine = Arc::new(ScanEngine::new(Arc::new(rpc_client), store, dedup, root).await);

    let server = ApiServer::new(AppState::new(engine, root), &config.server.host, config.server.port);
    let shutdown_log = root.for_operation("shutdown");
    server
        .start(async move {
            match signal::ctrl_c().await {
                Ok(()) => shutdown_log.info("Received shutdown signal"),
                Err(err) => shutdown_log.error(&format!("Unable to listen for shutdown signal: {}", err)),
            }
        })
        .await?;

    Ok(())
}
