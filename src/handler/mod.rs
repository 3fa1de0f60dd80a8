//! Request handler module
//!
//! Method validation and dispatch live in [`router`]; the asset decision logic
//! lives in [`assets`].

pub mod assets;
pub mod router;

// Re-export main entry point
pub use assets::{AssetService, ResponseBuilder, ResponseOutcome, ServedAsset};
pub use router::{handle_request, RequestContext};
