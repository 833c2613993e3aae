//! Unified error types for api-tools.
//!
//! This module provides the error hierarchy for the library, with rich
//! context for debugging and user-friendly messages. Resolution failures
//! are deliberately *not* part of [`ApiToolsError`]: they are recorded as
//! data on the component that failed to resolve (see [`ResolutionError`]).

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for api-tools operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiToolsError {
    /// An operation was attempted on a disposed baseline
    #[error("Baseline '{baseline}' has been disposed")]
    Disposed { baseline: String },

    /// A type's structural model is inconsistent
    #[error("Malformed type '{type_name}': {reason}")]
    MalformedType { type_name: String, reason: String },

    /// The problem classifier has no table entry for a change
    #[error(
        "Unclassified change: category={category}, element={element}, kind={kind}, flag={flag}"
    )]
    UnclassifiedChange {
        category: String,
        element: String,
        kind: String,
        flag: String,
    },

    /// Errors while loading a baseline manifest
    #[error("Failed to parse baseline: {context}")]
    Parse {
        context: String,
        #[source]
        source: ParseErrorKind,
    },

    /// Errors during report generation
    #[error("Report generation failed: {context}")]
    Report {
        context: String,
        #[source]
        source: ReportErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific parse error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("Unknown manifest format - expected JSON or YAML")]
    UnknownFormat,

    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Invalid YAML structure: {0}")]
    InvalidYaml(String),

    #[error("Missing required field: {field} in {context}")]
    MissingField { field: String, context: String },

    #[error("Duplicate component '{0}' in baseline")]
    DuplicateComponent(String),
}

/// Specific report error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReportErrorKind {
    #[error("JSON serialization failed: {0}")]
    JsonSerializationError(String),
}

/// A component failed to resolve its dependencies or execution environment.
///
/// Stored on the component as data; searches and comparisons carry on with
/// every other component.
#[derive(Error, Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[error("{component}: {message}")]
pub struct ResolutionError {
    pub component: String,
    pub message: String,
}

impl ResolutionError {
    pub fn new(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for api-tools operations
pub type Result<T> = std::result::Result<T, ApiToolsError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl ApiToolsError {
    /// Create a disposed-baseline error
    pub fn disposed(baseline: impl Into<String>) -> Self {
        Self::Disposed {
            baseline: baseline.into(),
        }
    }

    /// Create a malformed-type error
    pub fn malformed(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedType {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a parse error with context
    pub fn parse(context: impl Into<String>, source: ParseErrorKind) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    /// Create a parse error for missing field
    pub fn missing_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::parse(
            "missing required field",
            ParseErrorKind::MissingField {
                field: field.into(),
                context: context.into(),
            },
        )
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a report error
    pub fn report(context: impl Into<String>, source: ReportErrorKind) -> Self {
        Self::Report {
            context: context.into(),
            source,
        }
    }

    /// Whether this error is a disposed-baseline failure
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        matches!(self, Self::Disposed { .. })
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for ApiToolsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for ApiToolsError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(
            "JSON deserialization",
            ParseErrorKind::InvalidJson(err.to_string()),
        )
    }
}

impl From<serde_yaml::Error> for ApiToolsError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::parse(
            "YAML deserialization",
            ParseErrorKind::InvalidYaml(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// The context string is prepended to the error's existing context,
/// creating a chain that shows the path through the code.
///
/// # Example
///
/// ```ignore
/// use api_tools::error::ErrorContext;
///
/// fn load(path: &Path) -> Result<Baseline> {
///     let content = std::fs::read_to_string(path).context("reading manifest")?;
///     parse_baseline_str(&content, ManifestFormat::Json)
///         .with_context(|| format!("parsing baseline from {}", path.display()))
/// }
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure (lazy evaluation).
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<ApiToolsError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: ApiToolsError, new_ctx: &str) -> ApiToolsError {
    match err {
        ApiToolsError::Parse {
            context: existing,
            source,
        } => ApiToolsError::Parse {
            context: chain_context(new_ctx, &existing),
            source,
        },
        ApiToolsError::Report {
            context: existing,
            source,
        } => ApiToolsError::Report {
            context: chain_context(new_ctx, &existing),
            source,
        },
        ApiToolsError::Io {
            path,
            message,
            source,
        } => ApiToolsError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        ApiToolsError::MalformedType { type_name, reason } => ApiToolsError::MalformedType {
            type_name,
            reason: chain_context(new_ctx, &reason),
        },
        ApiToolsError::Config(msg) => ApiToolsError::Config(chain_context(new_ctx, &msg)),
        ApiToolsError::Validation(msg) => ApiToolsError::Validation(chain_context(new_ctx, &msg)),
        // Disposed and unclassified errors are programming defects; keep them as-is
        other => other,
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}
