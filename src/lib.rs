//! Static asset server for resources bundled into the binary
//!
//! A request path is tried against each configured prefix in order; the first
//! bundled resource found is served with `Last-Modified`/`Expires` caching
//! headers, or answered with 304 when the client's copy is still current.

pub mod bundle;
pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod resolver;
pub mod server;

pub use error::{ConfigError, ServerError};
