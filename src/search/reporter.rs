//! Search result sinks.

use crate::error::Result;
use crate::extract::Reference;
use crate::model::{MemberHandle, SkippedComponent, Visibility};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parameters of one search run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMetadata {
    /// Baseline whose components were searched
    pub baseline: String,
    /// Baseline used to resolve references, when different
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_baseline: Option<String>,
    pub started: DateTime<Utc>,
    pub include_api: bool,
    pub include_internal: bool,
    pub include_illegal_use: bool,
    pub include_local_references: bool,
    /// Names of the extracted reference kinds
    pub reference_kinds: Vec<String>,
    pub exclusion_entries: usize,
    pub tool_version: String,
}

/// Totals of one search run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCounts {
    pub components_searched: usize,
    pub components_skipped: usize,
    pub types_searched: usize,
    /// Elements with at least one accepted reference
    pub elements_reported: usize,
    pub references: usize,
    pub api_references: usize,
    pub internal_references: usize,
    pub illegal_references: usize,
}

impl SearchCounts {
    /// Count accepted references by visibility and legality.
    pub fn record(&mut self, references: &[Reference]) {
        self.elements_reported += 1;
        self.references += references.len();
        for reference in references {
            let Some(resolution) = &reference.resolution else {
                continue;
            };
            match resolution.visibility {
                Visibility::Api => self.api_references += 1,
                Visibility::Private => self.internal_references += 1,
            }
            if resolution.illegal {
                self.illegal_references += 1;
            }
        }
    }
}

/// Receives the results of a search.
///
/// Calls arrive in this order: metadata once, then results and
/// not-searched batches, then counts once unless the search was cancelled.
pub trait Reporter {
    /// All accepted references made by one element.
    fn report_results(&mut self, element: &MemberHandle, references: &[Reference]) -> Result<()>;

    /// Components that were not searched, with the reason.
    fn report_not_searched(&mut self, skipped: &[SkippedComponent]) -> Result<()>;

    fn report_metadata(&mut self, metadata: &SearchMetadata) -> Result<()>;

    fn report_counts(&mut self, counts: &SearchCounts) -> Result<()>;
}

/// Reporter that keeps everything in memory.
#[derive(Debug, Clone, Default)]
pub struct CollectingReporter {
    pub results: Vec<(MemberHandle, Vec<Reference>)>,
    /// One entry per `report_not_searched` call
    pub not_searched: Vec<Vec<SkippedComponent>>,
    pub metadata: Option<SearchMetadata>,
    pub counts: Option<SearchCounts>,
    /// How many times `report_counts` was called
    pub counts_calls: usize,
}

impl CollectingReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every accepted reference, in report order.
    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.results.iter().flat_map(|(_, refs)| refs.iter())
    }

    /// Every skipped component across all batches.
    pub fn skipped(&self) -> impl Iterator<Item = &SkippedComponent> {
        self.not_searched.iter().flatten()
    }
}

impl Reporter for CollectingReporter {
    fn report_results(&mut self, element: &MemberHandle, references: &[Reference]) -> Result<()> {
        self.results.push((element.clone(), references.to_vec()));
        Ok(())
    }

    fn report_not_searched(&mut self, skipped: &[SkippedComponent]) -> Result<()> {
        self.not_searched.push(skipped.to_vec());
        Ok(())
    }

    fn report_metadata(&mut self, metadata: &SearchMetadata) -> Result<()> {
        self.metadata = Some(metadata.clone());
        Ok(())
    }

    fn report_counts(&mut self, counts: &SearchCounts) -> Result<()> {
        self.counts = Some(counts.clone());
        self.counts_calls += 1;
        Ok(())
    }
}
