//! API use search.
//!
//! A search walks the components of a baseline, extracts the references
//! each type makes, resolves them against a (possibly different) baseline
//! and hands the accepted ones to a [`Reporter`]. A [`Requestor`] decides
//! which components are searched and which references are kept.
//!
//! A search moves through three phases:
//!
//! 1. metadata is reported and components are partitioned into searched
//!    and not-searched (excluded, or carrying resolution errors)
//! 2. each searched component is walked; the [`CancelToken`] is checked
//!    before every component
//! 3. counts are reported, unless the search was cancelled
//!
//! ```ignore
//! let requestor = UseScanRequestor::new().with_targets(Scope::of(["org.example.core"]));
//! let mut reporter = CollectingReporter::new();
//! SearchEngine::new().search(Some(&baseline), Some(&requestor), Some(&mut reporter), &CancelToken::new())?;
//! ```

mod cancel;
mod engine;
mod exclusion;
mod reporter;
mod requestor;
mod scope;

pub use cancel::CancelToken;
pub use engine::{SearchEngine, SearchOutcome};
pub use exclusion::ExclusionList;
pub use reporter::{CollectingReporter, Reporter, SearchCounts, SearchMetadata};
pub use requestor::{Requestor, UseScanRequestor};
pub use scope::Scope;
