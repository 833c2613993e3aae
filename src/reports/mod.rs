//! Report generation.
//!
//! Comparison results are rendered by a [`ReportGenerator`]:
//! - JSON: structured data for programmatic integration
//! - Summary: compact shell-friendly output
//!
//! Search results are persisted by [`DirectoryReporter`], a
//! [`Reporter`](crate::search::Reporter) writing the `used/using/` directory
//! index consumed by downstream tooling.

mod directory;
mod json;
mod summary;
mod types;

pub use directory::{COUNTS_FILE, DirectoryReporter, META_FILE, NOT_SEARCHED_FILE};
pub use json::JsonReporter;
pub use summary::SummaryReporter;
pub use types::{ReportConfig, ReportFormat, ReportMetadata};

use crate::diff::DeltaForest;
use crate::error::{ApiToolsError, Result};
use crate::problems::Problem;
use std::io::Write;

/// Trait for comparison report generators
pub trait ReportGenerator {
    /// Render the problems found by a comparison.
    fn generate_comparison_report(
        &self,
        forest: &DeltaForest,
        problems: &[Problem],
        config: &ReportConfig,
    ) -> Result<String>;

    /// Write the report to a writer
    fn write_comparison_report(
        &self,
        forest: &DeltaForest,
        problems: &[Problem],
        config: &ReportConfig,
        writer: &mut dyn Write,
    ) -> Result<()> {
        let report = self.generate_comparison_report(forest, problems, config)?;
        writer.write_all(report.as_bytes()).map_err(ApiToolsError::from)?;
        Ok(())
    }

    /// Get the format this generator produces
    fn format(&self) -> ReportFormat;
}

/// Create a report generator for the given format
#[must_use]
pub fn create_reporter(format: ReportFormat) -> Box<dyn ReportGenerator> {
    create_reporter_with_options(format, true)
}

/// Create a report generator with color control
#[must_use]
pub fn create_reporter_with_options(format: ReportFormat, use_color: bool) -> Box<dyn ReportGenerator> {
    match format {
        ReportFormat::Summary => {
            if use_color {
                Box::new(SummaryReporter::new())
            } else {
                Box::new(SummaryReporter::new().no_color())
            }
        }
        ReportFormat::Json => Box::new(JsonReporter::new()),
    }
}
