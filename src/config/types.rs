//! Configuration types for api-tools operations.

use crate::error::{ApiToolsError, Result};
use crate::extract::ReferenceKindMask;
use crate::model::ReferenceKind;
use crate::problems::Severity;
use crate::reports::ReportFormat;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
///
/// CLI values are layered over file values with [`AppConfig::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Baseline comparison settings
    pub compare: CompareConfig,
    /// API use search settings
    pub search: SearchConfig,
    /// Output configuration (format, file, colors)
    pub output: OutputConfig,
}

impl AppConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub const fn output_format(mut self, format: ReportFormat) -> Self {
        self.config.output.format = format;
        self
    }

    pub fn output_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.output.file = file;
        self
    }

    pub const fn no_color(mut self, no_color: bool) -> Self {
        self.config.output.no_color = no_color;
        self
    }

    /// Exit with a failure code when breaking changes are found.
    pub const fn fail_on_breaking(mut self, fail: bool) -> Self {
        self.config.compare.fail_on_breaking = fail;
        self
    }

    pub const fn check_versions(mut self, check: bool) -> Self {
        self.config.compare.check_versions = check;
        self
    }

    /// Set which visibilities a search keeps.
    pub const fn search_visibility(mut self, api: bool, internal: bool) -> Self {
        self.config.search.include_api = api;
        self.config.search.include_internal = internal;
        self
    }

    pub const fn include_illegal_use(mut self, include: bool) -> Self {
        self.config.search.include_illegal_use = include;
        self
    }

    pub const fn include_local_references(mut self, include: bool) -> Self {
        self.config.search.include_local_references = include;
        self
    }

    pub fn reference_kinds(mut self, kinds: Vec<String>) -> Self {
        self.config.search.reference_kinds = kinds;
        self
    }

    pub fn exclusion_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.search.exclusion_file = file;
        self
    }

    /// Enable parallel comparison and search.
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.config.compare.parallel = parallel;
        self.config.search.parallel = parallel;
        self
    }

    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Section configurations
// ============================================================================

/// Baseline comparison settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CompareConfig {
    /// Exit with code 1 when breaking changes are found
    pub fail_on_breaking: bool,
    /// Check that component versions reflect the changes
    pub check_versions: bool,
    /// Compare components in parallel
    pub parallel: bool,
    /// Lowest severity reported
    pub min_severity: Severity,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            fail_on_breaking: false,
            check_versions: true,
            parallel: false,
            min_severity: Severity::Warning,
        }
    }
}

/// API use search settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SearchConfig {
    /// Keep references to API elements
    pub include_api: bool,
    /// Keep references to internal elements
    pub include_internal: bool,
    /// Keep references that violate restriction tags
    pub include_illegal_use: bool,
    /// Keep references into the referencing component itself
    pub include_local_references: bool,
    /// Reference kinds to extract (kebab-case names); empty means the default set
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reference_kinds: Vec<String>,
    /// File listing components that are never searched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusion_file: Option<PathBuf>,
    /// Search components in parallel
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            include_api: true,
            include_internal: true,
            include_illegal_use: false,
            include_local_references: false,
            reference_kinds: Vec::new(),
            exclusion_file: None,
            parallel: false,
        }
    }
}

impl SearchConfig {
    /// Mask for the configured reference kinds.
    pub fn reference_mask(&self) -> Result<ReferenceKindMask> {
        if self.reference_kinds.is_empty() {
            return Ok(ReferenceKindMask::DEFAULT);
        }
        let kinds = self
            .reference_kinds
            .iter()
            .map(|name| {
                ReferenceKind::from_name(name)
                    .ok_or_else(|| ApiToolsError::config(format!("unknown reference kind '{name}'")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ReferenceKindMask::only(&kinds))
    }
}

/// Output configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Comparison report format
    pub format: ReportFormat,
    /// Output file path (stdout when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Disable colored output
    pub no_color: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.compare.check_versions);
        assert!(config.search.include_api && config.search.include_internal);
        assert_eq!(config.search.reference_mask().expect("mask"), ReferenceKindMask::DEFAULT);
    }

    #[test]
    fn test_reference_mask() {
        let search = SearchConfig {
            reference_kinds: vec!["extends".into(), "static-method".into()],
            ..SearchConfig::default()
        };
        let mask = search.reference_mask().expect("mask");
        assert_eq!(mask.kinds(), vec![ReferenceKind::Extends, ReferenceKind::StaticMethod]);

        let bad = SearchConfig {
            reference_kinds: vec!["goto".into()],
            ..SearchConfig::default()
        };
        assert!(bad.reference_mask().is_err());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: AppConfig = serde_yaml::from_str("search:\n  include_internal: false\n").expect("parse");
        assert!(!config.search.include_internal);
        assert!(config.search.include_api);
        assert!(config.compare.check_versions);
    }
}
