// Embedded resource provider
// Serves files compiled into the binary from the crate's bundle/ folder

use std::io::{self, Cursor};
use std::marker::PhantomData;

use rust_embed::RustEmbed;

use super::{normalize_key, ResourceProvider, ResourceStream};

const SCHEME: &str = "embedded:/";

/// The application's compiled-in bundle
#[derive(RustEmbed)]
#[folder = "bundle/"]
pub struct StaticBundle;

/// Provider over any `RustEmbed` bundle
pub struct EmbeddedProvider<E: RustEmbed = StaticBundle> {
    name: String,
    _bundle: PhantomData<fn() -> E>,
}

impl<E: RustEmbed> EmbeddedProvider<E> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _bundle: PhantomData,
        }
    }
}

impl Default for EmbeddedProvider<StaticBundle> {
    fn default() -> Self {
        Self::new("embedded")
    }
}

impl<E: RustEmbed> ResourceProvider for EmbeddedProvider<E> {
    fn name(&self) -> &str {
        &self.name
    }

    /// The location carries the normalized key, so a path with `..`
    /// segments never yields a location ending in that path
    fn locate(&self, path: &str) -> Option<String> {
        let key = normalize_key(path);
        E::get(&key).map(|_| format!("{SCHEME}{key}"))
    }

    fn open(&self, location: &str) -> io::Result<ResourceStream> {
        let file = location
            .strip_prefix(SCHEME)
            .and_then(E::get)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, location.to_string()))?;
        Ok(Box::new(Cursor::new(file.data)))
    }
}
