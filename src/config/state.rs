// Application state module
// Everything a request handler needs, built once at startup

use chrono::Utc;
use tracing::info;

use super::settings::AssetSettings;
use super::types::Config;
use crate::bundle::{DirectoryProvider, EmbeddedProvider, ProviderChain, StaticBundle};
use crate::error::ConfigError;
use crate::handler::AssetService;
use crate::resolver::Resolver;

/// Application state
pub struct AppState {
    pub config: Config,
    pub assets: AssetService,
    /// Cached from `config.logging` for the hot path
    pub access_log: bool,
}

impl AppState {
    /// Validate the configuration and assemble the provider chain
    ///
    /// Fails when the package list contains the bundle root, the encoding is
    /// unknown, or the overlay directory cannot be opened.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let settings = AssetSettings::from_config(&config.assets, Utc::now())?;

        let mut providers = ProviderChain::new();
        if let Some(dir) = &settings.overlay_dir {
            let overlay = DirectoryProvider::new(dir).map_err(|source| ConfigError::Overlay {
                path: dir.display().to_string(),
                source,
            })?;
            info!(root = %overlay.root().display(), "serving overlay directory ahead of bundle");
            providers = providers.with(overlay);
        }
        providers = providers.with(EmbeddedProvider::<StaticBundle>::default());

        let resolver = Resolver::new(settings.prefixes.clone(), settings.charset, providers);
        Ok(Self::from_parts(config, AssetService::new(resolver, settings.cache)))
    }

    /// Assemble state from an already built service
    pub fn from_parts(config: Config, assets: AssetService) -> Self {
        let access_log = config.logging.access_log;
        Self {
            config,
            assets,
            access_log,
        }
    }
}
