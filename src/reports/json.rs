//! JSON report generator.

use super::{ReportConfig, ReportFormat, ReportGenerator};
use crate::diff::{DeltaForest, DeltaSummary};
use crate::error::{ApiToolsError, ReportErrorKind, Result};
use crate::problems::{Problem, Severity};
use chrono::Utc;
use serde::Serialize;

/// JSON report generator
pub struct JsonReporter {
    /// Whether to only include the summary
    summary_only: bool,
    pretty: bool,
}

impl JsonReporter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            summary_only: false,
            pretty: true,
        }
    }

    /// Create a summary-only reporter
    #[must_use]
    pub const fn summary_only() -> Self {
        Self {
            summary_only: true,
            pretty: true,
        }
    }

    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for JsonReporter {
    fn generate_comparison_report(
        &self,
        forest: &DeltaForest,
        problems: &[Problem],
        config: &ReportConfig,
    ) -> Result<String> {
        let visible: Vec<&Problem> = problems
            .iter()
            .filter(|p| config.includes(p.severity))
            .collect();

        let report = JsonComparisonReport {
            metadata: JsonReportMetadata {
                tool: ToolInfo {
                    name: "api-tools",
                    version: env!("CARGO_PKG_VERSION"),
                },
                title: config.title.as_deref(),
                generated_at: Utc::now().to_rfc3339(),
                old_baseline: BaselineInfo {
                    name: &forest.old_baseline,
                    file_path: config.metadata.old_path.as_deref(),
                },
                new_baseline: BaselineInfo {
                    name: &forest.new_baseline,
                    file_path: config.metadata.new_path.as_deref(),
                },
            },
            summary: JsonSummary {
                deltas: forest.summary(),
                problems: ProblemCounts::count(&visible),
                breaking: visible.iter().any(|p| p.is_breaking()),
            },
            problems: if self.summary_only {
                None
            } else {
                Some(match config.max_items {
                    Some(max) => visible.into_iter().take(max).collect(),
                    None => visible,
                })
            },
        };

        let rendered = if self.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        };
        rendered.map_err(|e| {
            ApiToolsError::report(
                "rendering comparison report",
                ReportErrorKind::JsonSerializationError(e.to_string()),
            )
        })
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }
}

#[derive(Serialize)]
struct JsonComparisonReport<'a> {
    metadata: JsonReportMetadata<'a>,
    summary: JsonSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    problems: Option<Vec<&'a Problem>>,
}

#[derive(Serialize)]
struct JsonReportMetadata<'a> {
    tool: ToolInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    generated_at: String,
    old_baseline: BaselineInfo<'a>,
    new_baseline: BaselineInfo<'a>,
}

#[derive(Serialize)]
struct ToolInfo {
    name: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct BaselineInfo<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_path: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonSummary {
    deltas: DeltaSummary,
    problems: ProblemCounts,
    breaking: bool,
}

#[derive(Serialize, Default)]
struct ProblemCounts {
    errors: usize,
    warnings: usize,
}

impl ProblemCounts {
    fn count(problems: &[&Problem]) -> Self {
        let mut counts = Self::default();
        for problem in problems {
            match problem.severity {
                Severity::Error => counts.errors += 1,
                Severity::Warning => counts.warnings += 1,
                Severity::Ignore => {}
            }
        }
        counts
    }
}
