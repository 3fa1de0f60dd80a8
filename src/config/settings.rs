// Validated asset settings
// Turns the raw [assets] section into immutable values shared by all requests

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use super::types::AssetsConfig;
use crate::error::ConfigError;
use crate::http::cache::{CachePolicy, DEFAULT_EXPIRES_SECS};
use crate::http::decode::Charset;

const PACKAGE_DELIMITERS: [char; 5] = [',', ';', ' ', '\t', '\n'];
const ROOT_PREFIX: &str = "/";

/// Ordered, validated list of lookup prefixes
///
/// Never contains the bundle root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixList(Arc<[String]>);

impl PrefixList {
    /// Build from individual prefixes, rejecting the root
    pub fn new<I, S>(prefixes: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefixes: Vec<String> = prefixes.into_iter().map(Into::into).collect();
        if prefixes.iter().any(|p| p == ROOT_PREFIX) {
            return Err(ConfigError::RootPrefix);
        }
        Ok(Self(prefixes.into()))
    }

    /// Split a delimited `packages` value; empty tokens are dropped
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        Self::new(
            raw.split(PACKAGE_DELIMITERS)
                .map(str::trim)
                .filter(|token| !token.is_empty()),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything the asset handler needs, fixed at startup
#[derive(Debug, Clone)]
pub struct AssetSettings {
    pub prefixes: PrefixList,
    pub charset: Charset,
    pub cache: CachePolicy,
    pub overlay_dir: Option<PathBuf>,
}

impl AssetSettings {
    /// Validate the `[assets]` section
    ///
    /// `started_at` becomes the `Last-Modified` instant of every resource.
    pub fn from_config(
        config: &AssetsConfig,
        started_at: DateTime<Utc>,
    ) -> Result<Self, ConfigError> {
        let prefixes = PrefixList::parse(&config.packages)?;
        let charset = Charset::from_label(&config.encoding)
            .ok_or_else(|| ConfigError::UnknownEncoding(config.encoding.clone()))?;
        let expires = parse_expires(&config.expires);
        let cache_disabled = parse_flag("disable_cache", &config.disable_cache);

        Ok(Self {
            prefixes,
            charset,
            cache: CachePolicy::new(cache_disabled, expires, started_at),
            overlay_dir: config.overlay_dir.as_ref().map(PathBuf::from),
        })
    }
}

/// Parse the `expires` option, falling back to one year on bad input
pub fn parse_expires(raw: &str) -> i64 {
    match raw.trim().parse::<i64>() {
        Ok(secs) => secs,
        Err(e) => {
            warn!(
                value = raw,
                error = %e,
                fallback = DEFAULT_EXPIRES_SECS,
                "invalid expires value, using default"
            );
            DEFAULT_EXPIRES_SECS
        }
    }
}

/// Read a boolean option leniently: `true` in any case is true, anything else
/// is false
pub fn parse_flag(name: &str, raw: &str) -> bool {
    let value = raw.trim();
    if value.eq_ignore_ascii_case("true") {
        return true;
    }
    if !value.eq_ignore_ascii_case("false") {
        warn!(option = name, value = raw, "non-boolean value, treating as false");
    }
    false
}
