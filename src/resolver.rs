//! Resource resolution
//!
//! Maps a request path onto a bundled resource by trying each configured
//! prefix in order. The first prefix whose qualified path can be located,
//! passes the location check and opens successfully wins.
//!
//! The location check only requires the provider's location string to end with
//! the qualified path. It is a suffix match, not a canonical containment check:
//! a differently rooted resource whose location happens to share the same
//! suffix is accepted.

use std::fmt;
use std::io::{self, Read};

use tracing::debug;

use crate::bundle::{ProviderChain, ResourceStream};
use crate::config::PrefixList;
use crate::http::decode::{decode_path, Charset};

/// A bundled resource opened for one request
///
/// Dropping it releases the underlying stream.
pub struct ResolvedResource {
    qualified_path: String,
    location: String,
    stream: ResourceStream,
}

impl ResolvedResource {
    pub fn new(qualified_path: String, location: String, stream: ResourceStream) -> Self {
        Self {
            qualified_path,
            location,
            stream,
        }
    }

    /// Prefix + request path, decoded
    pub fn qualified_path(&self) -> &str {
        &self.qualified_path
    }

    /// Where the provider found it
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Release the stream without reading it
    pub fn close(self) {
        drop(self);
    }
}

impl Read for ResolvedResource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl fmt::Debug for ResolvedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedResource")
            .field("qualified_path", &self.qualified_path)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

/// Resolves request paths against an ordered prefix list
#[derive(Debug, Clone)]
pub struct Resolver {
    prefixes: PrefixList,
    charset: Charset,
    providers: ProviderChain,
}

impl Resolver {
    pub const fn new(prefixes: PrefixList, charset: Charset, providers: ProviderChain) -> Self {
        Self {
            prefixes,
            charset,
            providers,
        }
    }

    pub const fn prefixes(&self) -> &PrefixList {
        &self.prefixes
    }

    pub const fn charset(&self) -> Charset {
        self.charset
    }

    /// Find the first prefix that serves `request_path`
    pub fn resolve(&self, request_path: &str) -> Option<ResolvedResource> {
        for prefix in self.prefixes.iter() {
            let Some(qualified) = qualify(prefix, request_path, self.charset) else {
                debug!(prefix, request_path, charset = self.charset.label(), "undecodable path");
                continue;
            };

            let Some(found) = self.providers.locate(&qualified) else {
                continue;
            };

            if !found.location.ends_with(&qualified) {
                debug!(
                    qualified = %qualified,
                    location = %found.location,
                    "location does not end with qualified path, skipping"
                );
                continue;
            }

            match found.open() {
                Ok(stream) => {
                    debug!(
                        qualified = %qualified,
                        provider = found.provider_name(),
                        "resolved"
                    );
                    return Some(ResolvedResource::new(qualified, found.location, stream));
                }
                Err(e) => {
                    debug!(qualified = %qualified, error = %e, "failed to open, skipping");
                }
            }
        }
        None
    }
}

/// Join a prefix and a request path, then decode the result
///
/// One separator is dropped when both sides supply it.
pub fn qualify(prefix: &str, request_path: &str, charset: Charset) -> Option<String> {
    let joined = match request_path.strip_prefix('/') {
        Some(rest) if prefix.ends_with('/') => format!("{prefix}{rest}"),
        _ => format!("{prefix}{request_path}"),
    };
    decode_path(&joined, charset)
}
