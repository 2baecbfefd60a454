//! SpeedTracer demo server.
//!
//! Serves a small application behind the SpeedTracer layer. Every response
//! carries `X-TraceUrl`; fetch that URL to read the captured trace.
//!
//! ```text
//! $ speedtracer --config speedtracer.toml
//! $ curl -i localhost:8080/
//! X-TraceUrl: /speedtracer?id=3f2b...
//! $ curl localhost:8080/speedtracer?id=3f2b...
//! {"trace":{...}}
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use speedtracer::config::{load_config, AppConfig};
use speedtracer::observability::logging;
use speedtracer::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "speedtracer")]
#[command(about = "Serve an application with per-request trace capture", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability);
    tracing::info!("speedtracer v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        storage = %config.tracer.storage,
        store_timeout_ms = ?config.tracer.store_timeout_ms,
        "Configuration loaded"
    );

    // Fails here on a bad storage configuration, before binding.
    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
