//! Problem classification.
//!
//! Turns delta leaves and resolved references into [`Problem`]s keyed by a
//! compact [`ProblemId`]. Classification is driven by a static table of
//! `(category, element, kind, flag)` rows; a combination missing from the
//! table is a defect and fails with
//! [`ApiToolsError::UnclassifiedChange`](crate::error::ApiToolsError::UnclassifiedChange).

mod classifier;
mod id;
mod table;
mod version;

pub use classifier::{Problem, ProblemClassifier, UsageIndex};
pub use id::{
    ProblemCategory, ProblemFlag, ProblemId, ProblemKey, ProblemKind, UsageKind, VersionKind,
};
pub use table::{Severity, format_message, known_keys};
