//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::types::AppConfig;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
const CONFIG_FILE_NAMES: &[&str] = &[
    ".api-tools.yaml",
    ".api-tools.yml",
    "api-tools.yaml",
    "api-tools.yml",
];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/api-tools/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path
        && path.exists()
    {
        return Some(path.to_path_buf());
    }

    if let Ok(cwd) = std::env::current_dir()
        && let Some(path) = find_config_in_dir(&cwd)
    {
        return Some(path);
    }

    if let Some(git_root) = find_git_root()
        && let Some(path) = find_config_in_dir(&git_root)
    {
        return Some(path);
    }

    if let Some(config_dir) = dirs::config_dir()
        && let Some(path) = find_config_in_dir(&config_dir.join("api-tools"))
    {
        return Some(path);
    }

    dirs::home_dir().and_then(|home| find_config_in_dir(&home))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "loaded config file");
                (config, Some(path))
            }
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Configuration Merging
// ============================================================================

impl AppConfig {
    /// Merge another config into this one, with `other` taking precedence.
    ///
    /// Values equal to their default are treated as unset, so CLI args only
    /// override what the user actually passed.
    pub fn merge(&mut self, other: &Self) {
        let defaults = Self::default();

        if other.compare.fail_on_breaking {
            self.compare.fail_on_breaking = true;
        }
        if other.compare.check_versions != defaults.compare.check_versions {
            self.compare.check_versions = other.compare.check_versions;
        }
        if other.compare.parallel {
            self.compare.parallel = true;
        }
        if other.compare.min_severity != defaults.compare.min_severity {
            self.compare.min_severity = other.compare.min_severity;
        }

        if other.search.include_api != defaults.search.include_api
            || other.search.include_internal != defaults.search.include_internal
        {
            self.search.include_api = other.search.include_api;
            self.search.include_internal = other.search.include_internal;
        }
        if other.search.include_illegal_use {
            self.search.include_illegal_use = true;
        }
        if other.search.include_local_references {
            self.search.include_local_references = true;
        }
        if !other.search.reference_kinds.is_empty() {
            self.search.reference_kinds.clone_from(&other.search.reference_kinds);
        }
        if other.search.exclusion_file.is_some() {
            self.search.exclusion_file.clone_from(&other.search.exclusion_file);
        }
        if other.search.parallel {
            self.search.parallel = true;
        }

        if other.output.format != defaults.output.format {
            self.output.format = other.output.format;
        }
        if other.output.file.is_some() {
            self.output.file.clone_from(&other.output.file);
        }
        if other.output.no_color {
            self.output.no_color = true;
        }
    }

    /// Load from file and merge with CLI overrides.
    #[must_use]
    pub fn from_file_with_overrides(config_path: Option<&Path>, cli_overrides: &Self) -> (Self, Option<PathBuf>) {
        let (mut config, loaded_from) = load_or_default(config_path);
        config.merge(cli_overrides);
        (config, loaded_from)
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_example_config() -> String {
    r"# api-tools configuration
# Place this file at .api-tools.yaml in your project root or
# ~/.config/api-tools/api-tools.yaml. CLI arguments override file settings.

compare:
  # Exit with code 1 when breaking changes are found
  fail_on_breaking: false
  # Check that component versions reflect the changes
  check_versions: true
  parallel: false
  # Lowest reported severity: warning, error
  min_severity: warning

search:
  include_api: true
  include_internal: true
  # Keep references that violate @noreference, @noextend, ...
  include_illegal_use: false
  include_local_references: false
  # Reference kinds to extract; omit for the default set
  # reference_kinds: [extends, implements, static-method]
  # exclusion_file: search-exclusions.txt
  parallel: false

output:
  # Format: summary, json
  format: summary
  # file: report.json
  no_color: false
"
    .to_string()
}
