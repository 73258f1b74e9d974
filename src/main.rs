//! woo-proxy
//!
//! A reverse proxy in front of a WooCommerce REST API. Clients call
//! `{mount_prefix}/<endpoint>`; the proxy forwards to
//! `{base_url}/wp-json/wc/v3/<endpoint>` with credentials attached and CORS
//! headers added to every response.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request      ┌──────────────────────────────────────────────┐
//!     ────────────────────┼─▶ http::server ──▶ proxy::Forwarder          │
//!                         │   (request id,      path → auth → reqwest ───┼──▶ WooCommerce
//!                         │    CORS, OPTIONS)                            │
//!     Client Response     │                                              │
//!     ◀───────────────────┼── http::response ◀── status + body as-is ◀───┼─── upstream
//!                         │                                              │
//!                         │   config · observability · lifecycle         │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use woo_proxy::config::{loader, AuthPolicy};
use woo_proxy::http::HttpServer;
use woo_proxy::lifecycle::{signals, Shutdown};
use woo_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "woo-proxy")]
#[command(about = "Credential-injecting reverse proxy for the WooCommerce REST API", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the authentication policy (passthrough | server_credentials)
    #[arg(long)]
    auth_policy: Option<AuthPolicy>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match cli.config.as_deref() {
        Some(path) => loader::read_config(path)?,
        None => Default::default(),
    };
    loader::apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(policy) = cli.auth_policy {
        config.auth.policy = policy;
    }
    let config = loader::finalize(config)?;

    logging::init(&config.observability);

    tracing::info!("woo-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        mount_prefix = %config.mount.prefix,
        auth_policy = config.auth.policy.as_str(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Address already validated by loader::finalize.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            if let Err(e) = metrics::init_metrics(addr) {
                tracing::error!(error = %e, "Failed to start metrics endpoint");
            }
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
