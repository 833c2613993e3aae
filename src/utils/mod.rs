//! Shared utilities.

mod hash;
mod version;

pub use hash::{content_hash, structural_hash};
pub use version::parse_version;
