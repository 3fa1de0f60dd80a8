//! Logger module
//!
//! Sets up `tracing` output and provides the server lifecycle and access log
//! helpers. Access lines go to the `access` target so they can be filtered
//! separately, e.g. `RUST_LOG=info,access=off`.

use std::net::SocketAddr;
use std::time::Duration;

use hyper::{Method, StatusCode};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, LoggingConfig};
use crate::error::ServerError;
use crate::handler::AssetService;

/// Initialize the global subscriber
///
/// `RUST_LOG` wins over `logging.level` when set. Should be called once at
/// application startup.
pub fn init(config: &LoggingConfig) -> Result<(), ServerError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| ServerError::Logger(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| ServerError::Logger(e.to_string()))
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, assets: &AssetService) {
    let prefixes = assets.resolver().prefixes();
    let cache = assets.responder().policy();

    info!("Listening on: http://{addr}");
    info!(
        prefixes = ?prefixes.iter().collect::<Vec<_>>(),
        encoding = assets.resolver().charset().label(),
        "Serving bundled assets"
    );
    if prefixes.is_empty() {
        info!("No packages configured; every request will be answered with 404");
    }
    if cache.cache_disabled {
        info!("Browser caching disabled");
    } else {
        info!(
            expires_secs = cache.expires_delta_secs,
            last_modified = %cache.last_modified,
            "Browser caching enabled"
        );
    }
    if let Some(workers) = config.server.workers {
        info!("Worker threads: {workers}");
    }
    if let Some(max) = config.performance.max_connections {
        info!("Max connections: {max}");
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    error!("Failed to serve connection: {err:?}");
}

/// One line per request
pub fn log_access(method: &Method, path: &str, status: StatusCode, bytes: u64, elapsed: Duration) {
    info!(
        target: "access",
        %method,
        path,
        status = status.as_u16(),
        bytes,
        elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
        "request"
    );
}
