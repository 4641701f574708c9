//! audiometa-probe - Audio metadata microservice
//!
//! Serves `GET /analyze?f=<path>`: probes the file with ffprobe and returns
//! normalized audio metadata as JSON. At most `max_concurrent_probes` probes
//! run at once; excess requests wait for a slot.

use std::path::PathBuf;

use anyhow::{Context, Result};
use audiometa_common::config::{load_optional_toml, ConfigOverrides, ServiceConfig};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use audiometa_probe::{build_router, AppState};

/// Command-line arguments for audiometa-probe
#[derive(Parser, Debug)]
#[command(name = "audiometa-probe")]
#[command(about = "Audio metadata extraction microservice")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// IP address to bind
    #[arg(short, long)]
    bind: Option<String>,

    /// Maximum number of probes running at once
    #[arg(short = 'k', long)]
    max_concurrent_probes: Option<usize>,

    /// Probe binary name or path
    #[arg(long, value_name = "PATH")]
    probe_binary: Option<String>,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            bind: self.bind.clone(),
            port: self.port,
            max_concurrent_probes: self.max_concurrent_probes,
            probe_binary: self.probe_binary.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Resolved before tracing init so the configured level applies from the first line
    let loaded = load_optional_toml(args.config.as_deref())?;
    let config_path = loaded.as_ref().map(|l| l.path.clone());
    let config = ServiceConfig::resolve(args.overrides(), loaded.map(|l| l.config))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "audiometa_probe={level},audiometa_common={level},tower_http={level}",
                    level = config.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting audiometa-probe v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file found, using built-in defaults"),
    }
    info!("Probe binary: {}", config.probe_binary);
    info!("Max concurrent probes: {}", config.max_concurrent_probes);

    let state = AppState::from_config(&config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;
    info!("Listening on http://{}", config.bind_addr);
    info!("Analyze: http://{}/analyze?f=<path>", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
