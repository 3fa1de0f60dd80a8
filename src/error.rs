//! Error types
//!
//! Only startup can fail loudly. Everything that goes wrong while answering a
//! request is either recovered inside the resolver or turned into a status code
//! by the handler.

use std::io;
use std::net::AddrParseError;

use thiserror::Error;

/// Configuration loading and validation failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("package list must not contain the bundle root \"/\"")]
    RootPrefix,

    #[error("unsupported character encoding: {0}")]
    UnknownEncoding(String),

    #[error("invalid listen address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    #[error("overlay directory '{path}' is not usable: {source}")]
    Overlay {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Errors that stop the server from starting or running
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("logger initialization failed: {0}")]
    Logger(String),
}
