//! Report type definitions.

use crate::problems::Severity;
use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output format for comparison reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Brief summary output
    #[default]
    Summary,
    /// Structured JSON output
    Json,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Summary => write!(f, "summary"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Configuration for report generation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Title for the report
    pub title: Option<String>,
    /// Maximum problems listed per severity
    pub max_items: Option<usize>,
    /// Hide problems below this severity
    pub min_severity: Option<Severity>,
    pub metadata: ReportMetadata,
}

impl ReportConfig {
    #[must_use]
    pub fn with_metadata(mut self, metadata: ReportMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Whether a problem of `severity` should appear in the report.
    #[must_use]
    pub fn includes(&self, severity: Severity) -> bool {
        self.min_severity.is_none_or(|min| severity >= min)
    }
}

/// Metadata included in reports
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Path of the old baseline manifest
    pub old_path: Option<String>,
    /// Path of the new baseline manifest
    pub new_path: Option<String>,
    pub tool_version: String,
}

impl ReportMetadata {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            ..Default::default()
        }
    }
}
