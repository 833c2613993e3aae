//! Integration tests for baseline manifest loading
//!
//! These tests load the manifest fixtures and check the resolved baseline
//! graph: component order, package resolution and dependency closures.

use api_tools::{
    ApiToolsError,
    model::{SkipReason, TypeKind},
    parsers::{BaselineManifest, ManifestFormat, parse_baseline, parse_baseline_str},
};
use std::path::{Path, PathBuf};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> PathBuf {
    Path::new(FIXTURES_DIR).join(name)
}

#[test]
fn test_json_fixture_loads() {
    let path = fixture_path("old-platform.json");
    let baseline = parse_baseline(&path).expect("parse");
    assert_eq!(baseline.name(), "platform-1.0");
    assert_eq!(baseline.execution_environment(), Some("JavaSE-17"));
    assert_eq!(baseline.location(), Some(path.as_path()));

    let core = baseline.get_component("org.example.core").expect("live").expect("present");
    let color = core.find_type("org.example.Color").expect("parsed");
    assert_eq!(color.kind, TypeKind::Enum);
    assert_eq!(color.enum_constants().collect::<Vec<_>>(), vec!["RED", "GREEN", "BLUE"]);
}

#[test]
fn test_yaml_fixture_matches_json_shape() {
    let old = parse_baseline(&fixture_path("old-platform.json")).expect("json");
    let new = parse_baseline(&fixture_path("new-platform.yaml")).expect("yaml");
    let names = |b: &api_tools::Baseline| -> Vec<String> {
        b.components()
            .expect("live")
            .iter()
            .map(|c| c.symbolic_name.clone())
            .collect()
    };
    assert_eq!(names(&old), names(&new));
}

#[test]
fn test_package_resolution_and_closures() {
    let baseline = parse_baseline(&fixture_path("workspace.yaml")).expect("parse");
    let p1 = baseline.get_component("p1").expect("live").expect("present");
    let p3 = baseline.get_component("p3").expect("live").expect("present");

    let providers = baseline.resolve_package(p1, "p2").expect("live");
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].symbolic_name, "p2");

    let prerequisites: Vec<&str> = baseline
        .prerequisites_of(&[p1])
        .expect("live")
        .iter()
        .map(|c| c.symbolic_name.as_str())
        .collect();
    assert_eq!(prerequisites, vec!["p2", "p3"]);

    let dependents: Vec<&str> = baseline
        .dependents_of(&[p3])
        .expect("live")
        .iter()
        .map(|c| c.symbolic_name.as_str())
        .collect();
    assert_eq!(dependents, vec!["p1", "p2"]);
}

#[test]
fn test_cyclic_requirements_terminate() {
    let yaml = r"
name: cycle
components:
  - symbolic_name: a
    version: 1.0.0
    required: [{ name: b }]
  - symbolic_name: b
    version: 1.0.0
    required: [{ name: a }]
";
    let baseline = parse_baseline_str(yaml, ManifestFormat::Yaml).expect("parse");
    let a = baseline.get_component("a").expect("live").expect("present");
    let closure = baseline.prerequisites_of(&[a]).expect("live");
    assert_eq!(closure.len(), 1);
    assert_eq!(closure[0].symbolic_name, "b");
}

#[test]
fn test_missing_requirement_recorded_as_data() {
    let json = r#"{"name": "broken", "components": [
        {"symbolic_name": "ui", "version": "1.0.0", "required": [{"name": "absent"}]}
    ]}"#;
    let baseline = parse_baseline_str(json, ManifestFormat::Json).expect("parse succeeds");
    let ui = baseline.get_component("ui").expect("live").expect("present");
    let skipped = api_tools::model::SkippedComponent::unresolved(ui);
    assert!(matches!(&skipped.reason, SkipReason::ResolutionFailed(errors) if errors.len() == 1));
}

#[test]
fn test_unknown_extension_is_sniffed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("baseline.manifest");
    std::fs::write(&path, "name: sniffed\ncomponents: []\n").expect("write");
    assert_eq!(parse_baseline(&path).expect("yaml").name(), "sniffed");
}

#[test]
fn test_missing_file_is_io_error() {
    let err = parse_baseline(&fixture_path("does-not-exist.json")).expect_err("missing");
    assert!(matches!(err, ApiToolsError::Io { .. }));
}

#[test]
fn test_manifest_capture_round_trip() {
    let baseline = parse_baseline(&fixture_path("workspace.yaml")).expect("parse");
    let manifest = BaselineManifest::from_baseline(&baseline).expect("live");
    let json = serde_json::to_string(&manifest).expect("serialize");
    let reloaded = parse_baseline_str(&json, ManifestFormat::Json).expect("reload");
    assert_eq!(
        reloaded.components().expect("live"),
        baseline.components().expect("live")
    );
}
