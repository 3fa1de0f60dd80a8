// Directory resource provider
// Overlays a directory on disk ahead of the compiled-in bundle

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf, MAIN_SEPARATOR, MAIN_SEPARATOR_STR};

use super::{ResourceProvider, ResourceStream};

/// Provider over a directory on the local filesystem
///
/// Locations are canonical filesystem paths, so a request that climbs out of
/// the directory with `..` never produces a location ending in the requested
/// path.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    name: String,
    root: PathBuf,
}

impl DirectoryProvider {
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref().canonicalize()?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", root.display()),
            ));
        }
        Ok(Self {
            name: format!("dir:{}", root.display()),
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceProvider for DirectoryProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn locate(&self, path: &str) -> Option<String> {
        let candidate = self.root.join(path.trim_start_matches('/'));
        // Missing files are the common case, not worth logging
        let canonical = candidate.canonicalize().ok()?;
        if !canonical.starts_with(&self.root) || !canonical.is_file() {
            return None;
        }
        Some(to_location(&canonical))
    }

    fn open(&self, location: &str) -> io::Result<ResourceStream> {
        Ok(Box::new(File::open(from_location(location))?))
    }
}

/// Render a path with `/` separators so it can be compared with logical paths
fn to_location(path: &Path) -> String {
    path.to_string_lossy().replace(MAIN_SEPARATOR, "/")
}

/// Inverse of [`to_location`]
fn from_location(location: &str) -> PathBuf {
    PathBuf::from(location.replace('/', MAIN_SEPARATOR_STR))
}
