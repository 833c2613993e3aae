//! Configuration module for api-tools.
//!
//! This module provides:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Configuration File
//!
//! Place a `.api-tools.yaml` file in your project root or `~/.config/api-tools/`:
//!
//! ```yaml
//! compare:
//!   fail_on_breaking: true
//! search:
//!   include_internal: false
//!   exclusion_file: search-exclusions.txt
//! ```

pub mod file;
mod types;
mod validation;

pub use types::{AppConfig, AppConfigBuilder, CompareConfig, OutputConfig, SearchConfig};
pub use validation::{ConfigError, Validatable};

pub use file::{ConfigFileError, discover_config_file, generate_example_config, load_config_file, load_or_default};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// Editors can use it to validate and complete `.api-tools.yaml` files.
pub fn generate_json_schema() -> crate::error::Result<String> {
    let schema = schemars::schema_for!(AppConfig);
    Ok(serde_json::to_string_pretty(&schema)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lists_sections() {
        let schema = generate_json_schema().expect("schema");
        let value: serde_json::Value = serde_json::from_str(&schema).expect("json");
        let properties = &value["properties"];
        assert!(properties.get("compare").is_some());
        assert!(properties.get("search").is_some());
        assert!(properties.get("output").is_some());
    }
}
