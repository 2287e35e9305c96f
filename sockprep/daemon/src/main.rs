//! sockprep Daemon - Local Unix Socket Endpoint
//!
//! Prepares a Unix domain socket endpoint the safe way (umask first, then
//! stale socket cleanup that never deletes non-socket files, then bind) and
//! holds it open for local clients until told to stop.
//!
//! # Usage
//!
//! ```bash
//! # Start with defaults ($XDG_RUNTIME_DIR/sockprep/sockprep.sock)
//! sockprepd
//!
//! # Custom endpoint, owner-only socket
//! sockprepd --endpoint unix:///tmp/my-service.sock --umask 077
//!
//! # With config file
//! sockprepd --config /etc/sockprep/sockprep.toml
//!
//! # Verbose logging
//! RUST_LOG=debug sockprepd
//! ```
//!
//! # Signals
//!
//! - `SIGTERM` / `SIGINT`: Graceful shutdown (removes the socket)

mod server;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use sockprep_core::{
    default_config_path, load_config_from_path, ConfigOverrides, PermissionMask, SocketEndpoint,
};

use server::DaemonServer;

/// sockprep Daemon - Unix socket endpoint with safe stale-socket cleanup
#[derive(Parser, Debug)]
#[command(name = "sockprepd")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Socket endpoint (unix:///path or a bare path)
    #[arg(short = 'e', long, value_name = "ENDPOINT")]
    endpoint: Option<SocketEndpoint>,

    /// Octal umask installed before the socket is created (e.g. 077)
    #[arg(short = 'u', long, value_name = "MASK")]
    umask: Option<PermissionMask>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "SOCKPREP_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "SOCKPREP_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

/// Initialize logging with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "sockprep_daemon={level},sockprep_core={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}

/// Resolve when SIGTERM or SIGINT arrives
fn shutdown_signal() -> Result<impl std::future::Future<Output = ()>> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, initiating shutdown"),
            _ = sigint.recv() => info!("Received SIGINT, initiating shutdown"),
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    info!("sockprep daemon starting");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("PID: {}", std::process::id());

    let config_path = args.config.or_else(default_config_path);
    let mut config = load_config_from_path(config_path).context("Failed to load configuration")?;

    let mut overrides = ConfigOverrides::new();
    if let Some(endpoint) = args.endpoint {
        overrides = overrides.with_endpoint(endpoint);
    }
    if let Some(umask) = args.umask {
        overrides = overrides.with_umask(umask);
    }
    overrides.apply(&mut config);

    info!(
        path = ?config.options.path,
        source = %config.endpoint_source,
        "Socket path"
    );
    match config.options.umask {
        Some(mask) => info!(umask = %mask, source = %config.umask_source, "Umask"),
        None => info!("No umask configured, using the inherited process mask"),
    }
    if let Some(ref file) = config.config_file_path {
        info!(config_path = ?file, "Config file");
    }

    let shutdown = shutdown_signal()?;

    let server = DaemonServer::new(config.options);
    let result = server.run(shutdown).await;

    match result {
        Ok(()) => {
            info!("sockprep daemon stopped cleanly");
            Ok(())
        }
        Err(e) => {
            error!(error = ?e, "Daemon stopped with error");
            Err(e)
        }
    }
}
