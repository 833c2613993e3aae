//! Pipeline orchestration shared by the CLI command handlers.
//!
//! load → compare/search → report, with consistent error context and
//! output routing.

mod output;
mod parse;

pub use output::{OutputTarget, should_use_color, write_output};
pub use parse::load_baseline;

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Success, or problems found without `--fail-on-breaking`
    pub const SUCCESS: i32 = 0;
    /// Breaking changes were found
    pub const BREAKING_CHANGES: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 3;
    /// The search was cancelled
    pub const CANCELLED: i32 = 4;
}
