//! HTTP protocol layer module
//!
//! Caching headers, content types, path decoding and response builders,
//! decoupled from how resources are found.

pub mod cache;
pub mod decode;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use response::{
    build_304_response, build_404_response, build_405_response, build_500_response,
    build_asset_response,
};
