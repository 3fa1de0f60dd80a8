//! Request path decoding
//!
//! Paths are decoded form-style: `+` becomes a space and `%XX` escapes become
//! raw bytes, which are then interpreted in the configured character encoding.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use percent_encoding::percent_decode_str;

/// Character encoding named by the `encoding` option
///
/// Labels are looked up the way browsers do, so `latin1` and `ISO-8859-1`
/// both name windows-1252.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charset(&'static Encoding);

impl Default for Charset {
    fn default() -> Self {
        Self(UTF_8)
    }
}

impl Charset {
    /// Look up a charset by its (case-insensitive) label
    pub fn from_label(label: &str) -> Option<Self> {
        Encoding::for_label(label.trim().as_bytes()).map(Self)
    }

    /// Canonical name, as reported in logs
    pub fn label(self) -> &'static str {
        self.0.name()
    }

    /// Interpret raw bytes in this charset. `None` if they are malformed.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        self.0
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(Cow::into_owned)
    }
}

/// Decode a form-encoded path component
///
/// Malformed escapes such as `%zz` are kept literally.
pub fn decode_path(input: &str, charset: Charset) -> Option<String> {
    let spaced = input.replace('+', " ");
    let bytes: Vec<u8> = percent_decode_str(&spaced).collect();
    charset.decode(&bytes)
}
