use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use aptos_gateway::blockchain::AptosClient;
use aptos_gateway::http::GatewayServer;
use aptos_gateway::lifecycle::{resolve_config, spawn_signal_handler, CliOverrides, Shutdown};
use aptos_gateway::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "aptos-gateway")]
#[command(about = "HTTP gateway for an Aptos fullnode", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen port (overrides PORT and the config file).
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level when RUST_LOG is unset.
    #[arg(long)]
    log_level: Option<String>,

    /// Aptos node REST URL (overrides APTOS_NODE_URL).
    #[arg(long)]
    node_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let overrides = CliOverrides {
        port: args.port,
        log_level: args.log_level,
        node_url: args.node_url,
    };

    let config = resolve_config(args.config.as_deref(), &overrides)?;
    logging::init_logging(&config.observability.log_level);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "aptos-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        environment = config.environment.as_str(),
        node_url = %config.node.url,
        admins = config.admin.addresses.len(),
        rate_limit_window_ms = config.rate_limit.window_ms,
        rate_limit_max_requests = config.rate_limit.max_requests,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let node = AptosClient::connect(&config.node).await?;

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    let server = GatewayServer::new(config, Arc::new(node));
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
