//! Resource bundle module
//!
//! A [`ResourceProvider`] knows where a logical path lives inside some bundle
//! and how to open a byte stream for it. Providers are consulted in order
//! through a [`ProviderChain`]; the first one that locates a path owns the
//! lookup.

mod directory;
mod embedded;
mod memory;

pub use directory::DirectoryProvider;
pub use embedded::{EmbeddedProvider, StaticBundle};
pub use memory::MemoryProvider;

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

/// Byte stream over a bundled resource
pub type ResourceStream = Box<dyn Read + Send>;

/// A source of bundled resources
pub trait ResourceProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Storage location of `path`, if this provider has it
    ///
    /// The returned string identifies the resource in the provider's own
    /// terms (a filesystem path, an `embedded:/` URI, ...).
    fn locate(&self, path: &str) -> Option<String>;

    /// Open a stream for a location previously returned by [`Self::locate`]
    fn open(&self, location: &str) -> io::Result<ResourceStream>;
}

/// A location found by one provider of a chain
pub struct Located<'a> {
    provider: &'a dyn ResourceProvider,
    pub location: String,
}

impl Located<'_> {
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn open(&self) -> io::Result<ResourceStream> {
        self.provider.open(&self.location)
    }
}

/// Ordered list of providers, most specific scope first
#[derive(Clone, Default)]
pub struct ProviderChain {
    providers: Vec<Arc<dyn ResourceProvider>>,
}

impl ProviderChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider (builder style)
    #[must_use]
    pub fn with(mut self, provider: impl ResourceProvider + 'static) -> Self {
        self.push(Arc::new(provider));
        self
    }

    pub fn push(&mut self, provider: Arc<dyn ResourceProvider>) {
        self.providers.push(provider);
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Ask each provider in turn; the first that knows `path` wins
    pub fn locate(&self, path: &str) -> Option<Located<'_>> {
        self.providers.iter().find_map(|provider| {
            provider.locate(path).map(|location| Located {
                provider: provider.as_ref(),
                location,
            })
        })
    }
}

/// Resolve `.` and `..` segments the way a URL path is resolved
///
/// `..` never climbs above the top of the bundle.
pub fn normalize_key(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

impl fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|p| p.name()))
            .finish()
    }
}
