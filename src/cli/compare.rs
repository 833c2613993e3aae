//! Compare command handler.
//!
//! Implements the `compare` subcommand: delta two baselines, classify the
//! deltas and render a report.

use crate::config::AppConfig;
use crate::diff::DeltaEngine;
use crate::pipeline::{OutputTarget, exit_codes, load_baseline, should_use_color, write_output};
use crate::problems::{Problem, ProblemClassifier};
use crate::reports::{ReportConfig, ReportMetadata, create_reporter_with_options};
use anyhow::{Context, Result};
use std::path::Path;

/// Run the compare command, returning the desired exit code.
pub fn run_compare(old_path: &Path, new_path: &Path, config: &AppConfig, quiet: bool) -> Result<i32> {
    let old = load_baseline(old_path, quiet)?;
    let new = load_baseline(new_path, quiet)?;

    let forest = DeltaEngine::new()
        .with_parallel(config.compare.parallel)
        .compare(&old, &new)
        .context("Comparison failed")?;
    let problems = ProblemClassifier::new()
        .with_min_severity(config.compare.min_severity)
        .with_version_check(config.compare.check_versions)
        .classify_comparison(&old, &new, &forest)
        .context("Classification failed")?;

    let target = OutputTarget::from_option(config.output.file.clone());
    let reporter = create_reporter_with_options(
        config.output.format,
        should_use_color(config.output.no_color, &target),
    );
    let report_config = ReportConfig::default().with_metadata(ReportMetadata {
        old_path: Some(old_path.display().to_string()),
        new_path: Some(new_path.display().to_string()),
        ..ReportMetadata::new()
    });
    let report = reporter
        .generate_comparison_report(&forest, &problems, &report_config)
        .context("Failed to render report")?;
    write_output(&report, &target, quiet)?;

    Ok(determine_exit_code(config, &problems))
}

/// Determine the exit code based on problems and config flags.
fn determine_exit_code(config: &AppConfig, problems: &[Problem]) -> i32 {
    if config.compare.fail_on_breaking && problems.iter().any(Problem::is_breaking) {
        return exit_codes::BREAKING_CHANGES;
    }
    exit_codes::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    const OLD: &str = r#"{"name": "old", "components": [{"symbolic_name": "core", "version": "1.0.0",
        "type_containers": [{"name": "core.jar", "roots": [
            {"status": "parsed", "qualified_name": "org.example.Gone", "modifiers": 1}]}]}]}"#;
    const NEW: &str = r#"{"name": "new", "components": [{"symbolic_name": "core", "version": "1.0.0"}]}"#;

    fn write_baselines(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
        let old = dir.join("old.json");
        let new = dir.join("new.json");
        std::fs::write(&old, OLD).expect("write");
        std::fs::write(&new, NEW).expect("write");
        (old, new)
    }

    #[test]
    fn test_fail_on_breaking_exit_code() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (old, new) = write_baselines(dir.path());
        let report = dir.path().join("report.json");
        let config = AppConfig::builder()
            .fail_on_breaking(true)
            .output_format(crate::reports::ReportFormat::Json)
            .output_file(Some(report.clone()))
            .build();

        let code = run_compare(&old, &new, &config, true).expect("compare");
        assert_eq!(code, exit_codes::BREAKING_CHANGES);
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(report).expect("read")).expect("json");
        assert_eq!(value["summary"]["breaking"], true);
    }

    #[test]
    fn test_breaking_without_flag_succeeds() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (old, new) = write_baselines(dir.path());
        let config = AppConfig::builder()
            .output_file(Some(dir.path().join("summary.txt")))
            .build();
        assert_eq!(run_compare(&old, &new, &config, true).expect("compare"), exit_codes::SUCCESS);
    }
}
