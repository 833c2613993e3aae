//! CLI command handlers.
//!
//! Testable command handlers invoked by main.rs. Each handler returns the
//! process exit code; the caller exits with it when non-zero.

mod compare;
mod usescan;

pub use compare::run_compare;
pub use usescan::{UseScanPaths, run_use_scan};
