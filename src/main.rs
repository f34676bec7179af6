//! Car Pooling Service
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │               CAR POOLING SERVICE             │
//!                         │                                              │
//!     Client Request      │  ┌─────────┐    ┌──────────┐    ┌─────────┐  │
//!     ────────────────────┼─▶│  http   │───▶│ handlers │───▶│ pooling │  │
//!                         │  │ server  │    │ validate │    │ engine  │  │
//!                         │  └─────────┘    └──────────┘    └────┬────┘  │
//!                         │                                      │       │
//!                         │              ┌───────────────────────┼─────┐ │
//!                         │              ▼            ▼          ▼     │ │
//!                         │         ┌────────┐  ┌──────────┐ ┌───────┐ │ │
//!                         │         │registry│  │ capacity │ │waiting│ │ │
//!                         │         │        │  │  index   │ │ queue │ │ │
//!                         │         └────────┘  └──────────┘ └───────┘ │ │
//!                         │              └─────── one RwLock ──────────┘ │
//!                         │                                              │
//!                         │  config · observability · lifecycle          │
//!                         └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use car_pooling::config::{self, ConfigError, ServiceConfig};
use car_pooling::http::HttpServer;
use car_pooling::lifecycle::{signals, Shutdown};
use car_pooling::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "car-pooling")]
#[command(about = "Car pooling allocation service", long_about = None, version)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the log level.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if let Some(level) = args.log_level {
        config.observability.log_level = level;
    }
    config::validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_tracing(&config.observability);

    tracing::info!("car-pooling v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config_file = ?args.config,
        bind_address = %config.listener.bind_address,
        max_concurrent_requests = config.listener.max_concurrent_requests,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
