// In-memory resource provider
// Holds a map of logical path -> bytes assembled at runtime

use std::collections::HashMap;
use std::io::{self, Cursor};

use hyper::body::Bytes;

use super::{ResourceProvider, ResourceStream};

const SCHEME: &str = "memory:/";

/// Provider backed by an in-process map
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    name: String,
    resources: HashMap<String, Bytes>,
}

impl MemoryProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources: HashMap::new(),
        }
    }

    /// Add a resource (builder style)
    #[must_use]
    pub fn with_resource(mut self, path: impl Into<String>, content: impl Into<Bytes>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<Bytes>) {
        self.resources.insert(path.into(), content.into());
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl ResourceProvider for MemoryProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn locate(&self, path: &str) -> Option<String> {
        self.resources
            .contains_key(path)
            .then(|| format!("{SCHEME}{path}"))
    }

    fn open(&self, location: &str) -> io::Result<ResourceStream> {
        location
            .strip_prefix(SCHEME)
            .and_then(|path| self.resources.get(path))
            .map(|content| Box::new(Cursor::new(content.clone())) as ResourceStream)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, location.to_string()))
    }
}
