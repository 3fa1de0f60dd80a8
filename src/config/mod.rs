// Configuration module entry point
// Loads layered configuration and validates it into startup-time state

mod settings;
mod state;
mod types;

use std::net::SocketAddr;

use crate::error::ConfigError;

// Re-export public types
pub use settings::{parse_expires, AssetSettings, PrefixList};
pub use state::AppState;
pub use types::{AssetsConfig, Config, LoggingConfig, PerformanceConfig, ServerConfig};

/// Config file used when none is given (extension resolved by the `config` crate)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Prefix of environment overrides, e.g. `BUNDLE__ASSETS__PACKAGES`
pub const ENV_PREFIX: &str = "BUNDLE";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; environment variables override it and built-in
    /// defaults fill whatever neither provides.
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.request_timeout", 30)?
            .set_default("assets.packages", "")?
            .set_default("assets.disable_cache", "false")?
            .set_default("assets.encoding", "UTF-8")?
            .set_default("assets.expires", "31536000")?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|source| ConfigError::InvalidAddress { addr, source })
    }
}
