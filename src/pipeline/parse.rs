//! Baseline loading stage.

use crate::model::Baseline;
use crate::parsers::parse_baseline;
use anyhow::{Context, Result};
use std::path::Path;

/// Load a baseline manifest, attaching the path to any error.
pub fn load_baseline(path: &Path, quiet: bool) -> Result<Baseline> {
    let baseline =
        parse_baseline(path).with_context(|| format!("Failed to load baseline: {}", path.display()))?;
    if !quiet {
        let components = baseline.components().map(<[_]>::len).unwrap_or_default();
        let unresolved = baseline
            .components()
            .map(|all| all.iter().filter(|c| c.has_resolution_errors()).count())
            .unwrap_or_default();
        tracing::info!(
            baseline = %baseline.name(),
            components,
            unresolved,
            "loaded baseline from {}",
            path.display()
        );
    }
    Ok(baseline)
}
