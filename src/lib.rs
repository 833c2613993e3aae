//! **Binary compatibility and API use analysis for component baselines.**
//!
//! `api-tools` compares two baselines of compiled components (a reference
//! baseline and a newer one) and reports every change that would break
//! clients compiled against the reference. It also searches a baseline
//! for references to other components' API and internal elements.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: the resolved [`Baseline`] of components, their type
//!   containers, types and members, plus visibility maps and restriction tags.
//! - **[`diff`]**: the [`DeltaEngine`], producing a [`DeltaForest`] of
//!   change records per component.
//! - **[`problems`]**: the [`ProblemClassifier`], turning deltas into
//!   problems with stable numeric ids and severities.
//! - **[`extract`]** and **[`search`]**: reference extraction and the
//!   [`SearchEngine`] that resolves and filters references.
//! - **[`reports`]**: comparison reports and the use-scan directory report.
//! - **[`parsers`]**: loading baselines from JSON or YAML manifests.
//!
//! ## Comparing Two Baselines
//!
//! ```no_run
//! use std::path::Path;
//! use api_tools::{DeltaEngine, ProblemClassifier, parse_baseline};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let old = parse_baseline(Path::new("platform-1.0.json"))?;
//!     let new = parse_baseline(Path::new("platform-1.1.json"))?;
//!
//!     let forest = DeltaEngine::new().compare(&old, &new)?;
//!     let problems = ProblemClassifier::new().classify_comparison(&old, &new, &forest)?;
//!
//!     for problem in problems.iter().filter(|p| p.is_breaking()) {
//!         println!("{}: {}", problem.component.as_deref().unwrap_or("?"), problem.message);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Searching for API Use
//!
//! ```no_run
//! use std::path::Path;
//! use api_tools::parse_baseline;
//! use api_tools::reports::DirectoryReporter;
//! use api_tools::search::{CancelToken, SearchEngine, UseScanRequestor};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let baseline = parse_baseline(Path::new("workspace.json"))?;
//!     let requestor = UseScanRequestor::new().with_visibility(false, true);
//!     let mut reporter = DirectoryReporter::new("use-report");
//!
//!     SearchEngine::new().search(
//!         Some(&baseline),
//!         Some(&requestor),
//!         Some(&mut reporter),
//!         &CancelToken::new(),
//!     )?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::unwrap_used)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::similar_names
)]

pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod extract;
pub mod model;
pub mod parsers;
pub mod pipeline;
pub mod problems;
pub mod reports;
pub mod search;
pub mod utils;

pub use config::{AppConfig, AppConfigBuilder, ConfigError, Validatable};
pub use diff::{DeltaEngine, DeltaForest, DeltaSummary};
pub use error::{ApiToolsError, ErrorContext, Result};
pub use model::{Baseline, BaselineBuilder, Component};
pub use parsers::{parse_baseline, parse_baseline_str};
pub use problems::{Problem, ProblemClassifier, ProblemId, Severity};
pub use reports::{ReportFormat, ReportGenerator};
pub use search::{SearchEngine, SearchOutcome};
