//! Use-scan command handler.
//!
//! Implements the `use-scan` subcommand: search a baseline for API use and
//! write the directory report.

use crate::config::{AppConfig, Validatable};
use crate::pipeline::{exit_codes, load_baseline};
use crate::reports::DirectoryReporter;
use crate::search::{CancelToken, ExclusionList, Scope, SearchEngine, SearchOutcome, UseScanRequestor};
use anyhow::{Context, Result, bail};
use std::path::PathBuf;

/// Inputs and scopes of a use scan.
#[derive(Debug, Clone, Default)]
pub struct UseScanPaths {
    /// Baseline whose components are searched
    pub baseline: PathBuf,
    /// Baseline used to resolve references, when different
    pub scope_baseline: Option<PathBuf>,
    pub report_dir: PathBuf,
    /// Components to search; empty means all
    pub sources: Vec<String>,
    /// Components whose elements are reported as used; empty means all
    pub targets: Vec<String>,
}

/// Run the use-scan command, returning the desired exit code.
pub fn run_use_scan(paths: &UseScanPaths, config: &AppConfig, cancel: &CancelToken, quiet: bool) -> Result<i32> {
    let errors = config.search.validate();
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!("Invalid search configuration:\n  {}", messages.join("\n  "));
    }

    let baseline = load_baseline(&paths.baseline, quiet)?;
    let scope_baseline = paths
        .scope_baseline
        .as_deref()
        .map(|path| load_baseline(path, quiet))
        .transpose()?;

    let mut requestor = UseScanRequestor::new()
        .with_kinds(config.search.reference_mask()?)
        .with_visibility(config.search.include_api, config.search.include_internal)
        .with_illegal_use(config.search.include_illegal_use)
        .with_local_references(config.search.include_local_references);
    if !paths.sources.is_empty() {
        requestor = requestor.with_sources(Scope::of(paths.sources.iter().cloned()));
    }
    if !paths.targets.is_empty() {
        requestor = requestor.with_targets(Scope::of(paths.targets.iter().cloned()));
    } else if let Some(scope) = &scope_baseline {
        requestor = requestor.with_targets(Scope::of_baseline(scope)?);
    }
    if let Some(file) = &config.search.exclusion_file {
        let exclusions = ExclusionList::from_file(file)
            .with_context(|| format!("Failed to load exclusion list: {}", file.display()))?;
        requestor = requestor.with_exclusions(exclusions);
    }

    let mut engine = SearchEngine::new().with_parallel(config.search.parallel);
    if let Some(scope) = &scope_baseline {
        engine = engine.with_scope_baseline(scope);
    }
    let mut reporter = DirectoryReporter::new(&paths.report_dir);
    let outcome = engine
        .search(Some(&baseline), Some(&requestor), Some(&mut reporter), cancel)
        .context("Search failed")?;

    match outcome {
        SearchOutcome::Completed => {
            if !quiet {
                tracing::info!("Search report written to {}", paths.report_dir.display());
            }
            Ok(exit_codes::SUCCESS)
        }
        SearchOutcome::Cancelled => {
            tracing::warn!("Search cancelled; partial report in {}", paths.report_dir.display());
            Ok(exit_codes::CANCELLED)
        }
    }
}
