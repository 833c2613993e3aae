//! Configuration validation for api-tools.

use super::types::{AppConfig, CompareConfig, OutputConfig, SearchConfig};
use crate::model::ReferenceKind;
use crate::problems::Severity;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.compare.validate());
        errors.extend(self.search.validate());
        errors.extend(self.output.validate());
        errors
    }
}

impl Validatable for CompareConfig {
    fn validate(&self) -> Vec<ConfigError> {
        if self.min_severity == Severity::Ignore {
            return vec![ConfigError::new(
                "compare.min_severity",
                "'ignore' is not a reportable severity. Valid options: warning, error",
            )];
        }
        Vec::new()
    }
}

impl Validatable for SearchConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        for name in &self.reference_kinds {
            if ReferenceKind::from_name(name).is_none() {
                let valid: Vec<&str> = ReferenceKind::ALL.iter().map(|k| k.name()).collect();
                errors.push(ConfigError::new(
                    "search.reference_kinds",
                    format!("Unknown reference kind '{name}'. Valid options: {}", valid.join(", ")),
                ));
            }
        }
        if !self.include_api && !self.include_internal && !self.include_illegal_use {
            errors.push(ConfigError::new(
                "search",
                "search mask is empty: enable include_api, include_internal or include_illegal_use",
            ));
        }
        if let Some(path) = &self.exclusion_file
            && !path.exists()
        {
            errors.push(ConfigError::new(
                "search.exclusion_file",
                format!("File not found: {}", path.display()),
            ));
        }
        errors
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(file_path) = &self.file
            && let Some(parent) = file_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            errors.push(ConfigError::new(
                "output.file",
                format!("Parent directory does not exist: {}", parent.display()),
            ));
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().is_valid());
    }

    #[test]
    fn test_empty_search_mask() {
        let config = AppConfig::builder().search_visibility(false, false).build();
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "search");

        let illegal_only = AppConfig::builder()
            .search_visibility(false, false)
            .include_illegal_use(true)
            .build();
        assert!(illegal_only.is_valid());
    }

    #[test]
    fn test_unknown_reference_kind() {
        let config = AppConfig::builder()
            .reference_kinds(vec!["extends".into(), "jump".into()])
            .build();
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("'jump'"));
    }

    #[test]
    fn test_ignore_min_severity_rejected() {
        let mut config = AppConfig::default();
        config.compare.min_severity = Severity::Ignore;
        assert!(!config.is_valid());
    }
}
