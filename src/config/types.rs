// Configuration types module
// Raw configuration as deserialized from file and environment

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub assets: AssetsConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `bundle_static=debug`
    pub level: String,
    pub access_log: bool,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds a connection may take before it is dropped
    pub request_timeout: u64,
    pub max_connections: Option<u64>,
}

/// Asset serving options, before validation
#[derive(Debug, Deserialize, Clone)]
pub struct AssetsConfig {
    /// Prefixes separated by comma, semicolon, space, tab or newline
    pub packages: String,
    /// Only `true` (any case) disables caching; other text counts as false
    pub disable_cache: String,
    pub encoding: String,
    /// Kept as text so that a bad value can fall back instead of failing the load
    pub expires: String,
    /// Directory consulted before the compiled-in bundle
    #[serde(default)]
    pub overlay_dir: Option<String>,
}
