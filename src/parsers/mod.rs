//! Baseline manifest parsers.
//!
//! Baselines are populated by an external bytecode reader that writes a
//! manifest (JSON or YAML). Loading a manifest goes through
//! [`BaselineBuilder`](crate::model::BaselineBuilder), so a file-loaded
//! baseline is resolved exactly like one built in code.
//!
//! ## Format Detection
//!
//! The file extension decides first (`.json`, `.yaml`, `.yml`); otherwise
//! the content is sniffed: a leading `{` means JSON, anything else YAML.
//!
//! ```no_run
//! use api_tools::parsers::parse_baseline;
//! use std::path::Path;
//!
//! let baseline = parse_baseline(Path::new("target-platform.json")).unwrap();
//! println!("{} components", baseline.components().unwrap().len());
//! ```

mod detection;
mod manifest;

pub use detection::ManifestFormat;
pub use manifest::BaselineManifest;

use crate::error::{ApiToolsError, ErrorContext, ParseErrorKind, Result};
use crate::model::Baseline;
use std::path::Path;

/// Maximum manifest file size (512 MB).
const MAX_MANIFEST_FILE_SIZE: u64 = 512 * 1024 * 1024;

/// Load and resolve a baseline from a manifest file.
///
/// The baseline's location is set to `path`.
pub fn parse_baseline(path: &Path) -> Result<Baseline> {
    let metadata = std::fs::metadata(path).map_err(|e| ApiToolsError::io(path, e))?;
    if metadata.len() > MAX_MANIFEST_FILE_SIZE {
        return Err(ApiToolsError::validation(format!(
            "manifest {} is {} MB, exceeding the {} MB limit",
            path.display(),
            metadata.len() / (1024 * 1024),
            MAX_MANIFEST_FILE_SIZE / (1024 * 1024),
        )));
    }
    let content = std::fs::read_to_string(path).map_err(|e| ApiToolsError::io(path, e))?;
    let format = ManifestFormat::resolve(path, &content).ok_or_else(|| {
        ApiToolsError::parse(format!("reading {}", path.display()), ParseErrorKind::UnknownFormat)
    })?;
    let manifest = parse_manifest(&content, format)
        .with_context(|| format!("parsing baseline from {}", path.display()))?;
    manifest.into_baseline(Some(path.to_path_buf()))
}

/// Parse and resolve a baseline from manifest content.
pub fn parse_baseline_str(content: &str, format: ManifestFormat) -> Result<Baseline> {
    parse_manifest(content, format)?.into_baseline(None)
}

/// Parse manifest content without resolving it.
pub fn parse_manifest(content: &str, format: ManifestFormat) -> Result<BaselineManifest> {
    let manifest: BaselineManifest = match format {
        ManifestFormat::Json => serde_json::from_str(content)?,
        ManifestFormat::Yaml => serde_yaml::from_str(content)?,
    };
    tracing::debug!(
        baseline = %manifest.name,
        format = %format,
        components = manifest.components.len(),
        "parsed baseline manifest"
    );
    Ok(manifest)
}
