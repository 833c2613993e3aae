//! Manifest format detection.

use std::path::Path;

/// Serialization format of a baseline manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Yaml,
}

impl ManifestFormat {
    /// Human-readable name for this format.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }

    /// Format implied by the file extension, if any.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Sniff the format from content: an object opening brace means JSON,
    /// any other non-blank content is treated as YAML.
    #[must_use]
    pub fn detect(content: &str) -> Option<Self> {
        let first = content.trim_start_matches('\u{feff}').trim_start().chars().next()?;
        let format = if first == '{' { Self::Json } else { Self::Yaml };
        tracing::debug!(format = format.name(), "detected manifest format from content");
        Some(format)
    }

    /// Extension first, then content.
    #[must_use]
    pub fn resolve(path: &Path, content: &str) -> Option<Self> {
        Self::from_path(path).or_else(|| Self::detect(content))
    }
}

impl std::fmt::Display for ManifestFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
