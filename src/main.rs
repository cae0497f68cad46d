//! Streamnode edge proxy binary.
//!
//! Loads configuration (TOML file plus environment overrides), refuses to
//! start on a missing or malformed service credential, and serves the
//! playlist/segment routes until shutdown.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use streamnode::config::loader;
use streamnode::observability::{logging, metrics};
use streamnode::{HttpServer, Shutdown};

#[derive(Parser, Debug)]
#[command(
    name = "streamnode",
    version,
    about = "HLS edge proxy in front of a Pipe KV object store"
)]
struct Args {
    /// Path to a TOML config file. Without it, defaults plus
    /// STREAMNODE_* environment variables are used.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Config errors are fatal before any request is served.
    let config = match &args.config {
        Some(path) => loader::load_config(path)?,
        None => loader::load_from_env()?,
    };

    logging::init(&format!(
        "streamnode={},tower_http=info",
        config.observability.log_level
    ));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        allowed_origin = %config.access.allowed_origin,
        timeout_secs = config.upstream.timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;

    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
