//! Integration tests for baseline comparison
//!
//! These tests load baselines from manifest fixtures and verify the delta
//! forest, the classified problems and the rendered reports.

use api_tools::{
    DeltaEngine, ProblemClassifier,
    diff::{ChangeFlag, ChangeKind, Delta},
    model::{
        BaselineBuilder, Component, ElementKind, Method, RestrictionTags, Type, TypeKind, Visibility,
        VisibilityEntry, VisibilityMap,
    },
    parsers::parse_baseline,
    problems::{ProblemKey, ProblemKind, Severity, VersionKind},
    reports::{ReportConfig, ReportFormat, create_reporter},
};
use std::path::{Path, PathBuf};

// ============================================================================
// Test Fixtures
// ============================================================================

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> PathBuf {
    Path::new(FIXTURES_DIR).join(name)
}

fn load_platforms() -> (api_tools::Baseline, api_tools::Baseline) {
    let old = parse_baseline(&fixture_path("old-platform.json")).expect("old baseline");
    let new = parse_baseline(&fixture_path("new-platform.yaml")).expect("new baseline");
    (old, new)
}

fn leaves_with_flag(delta: &Delta, flag: ChangeFlag) -> Vec<&Delta> {
    delta.leaves().into_iter().filter(|d| d.has_flag(flag)).collect()
}

// ============================================================================
// Delta Tests
// ============================================================================

mod delta_tests {
    use super::*;

    #[test]
    fn test_enum_constant_removal() {
        let (old, new) = load_platforms();
        let forest = DeltaEngine::new().compare(&old, &new).expect("compare");

        let core = forest.component("org.example.core").expect("core changed");
        assert_eq!(core.change_kind, ChangeKind::Changed);
        let removed = leaves_with_flag(core, ChangeFlag::EnumConstant);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].change_kind, ChangeKind::Removed);
        assert_eq!(removed[0].key, "BLUE");
        assert_eq!(removed[0].type_name.as_deref(), Some("org.example.Color"));
    }

    #[test]
    fn test_annotation_default_removal() {
        let (old, new) = load_platforms();
        let forest = DeltaEngine::new().compare(&old, &new).expect("compare");
        let core = forest.component("org.example.core").expect("core changed");

        let removed = leaves_with_flag(core, ChangeFlag::MethodWithDefaultValue);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].change_kind, ChangeKind::Removed);
        assert_eq!(removed[0].element_kind, ElementKind::AnnotationElement);
    }

    #[test]
    fn test_unchanged_component_absent() {
        let (old, new) = load_platforms();
        let forest = DeltaEngine::new().compare(&old, &new).expect("compare");
        assert!(forest.component("org.example.ui").is_none());
    }

    #[test]
    fn test_parallel_compare_is_deterministic() {
        let (old, new) = load_platforms();
        let sequential = DeltaEngine::new().compare(&old, &new).expect("compare");
        let parallel = DeltaEngine::new().with_parallel(true).compare(&old, &new).expect("compare");
        assert_eq!(sequential.components(), parallel.components());
    }

    #[test]
    fn test_in_memory_and_manifest_baselines_agree() {
        let build = |constants: &[&str]| {
            let color = constants
                .iter()
                .fold(Type::new("org.example.Color", TypeKind::Enum), |ty, c| ty.with_enum_constant(c));
            BaselineBuilder::new("mem")
                .component(Component::new("org.example.core", "1.0.0").with_type(color))
                .build()
                .expect("baseline")
        };
        let forest = DeltaEngine::new()
            .compare(&build(&["RED", "GREEN", "BLUE"]), &build(&["RED", "GREEN"]))
            .expect("compare");
        let core = forest.component("org.example.core").expect("core changed");
        assert_eq!(leaves_with_flag(core, ChangeFlag::EnumConstant).len(), 1);
    }
}

// ============================================================================
// Problem Tests
// ============================================================================

mod problem_tests {
    use super::*;

    #[test]
    fn test_breaking_changes_classified() {
        let (old, new) = load_platforms();
        let forest = DeltaEngine::new().compare(&old, &new).expect("compare");
        let problems = ProblemClassifier::new()
            .with_version_check(false)
            .classify_comparison(&old, &new, &forest)
            .expect("classify");

        assert_eq!(problems.len(), 2, "{problems:#?}");
        assert!(problems.iter().all(|p| p.is_breaking()));
        assert!(problems.iter().all(|p| p.severity == Severity::Error));
        assert!(
            problems
                .iter()
                .any(|p| p.key == ProblemKey::change(ElementKind::Type, ChangeKind::Removed, ChangeFlag::EnumConstant))
        );
        for problem in &problems {
            assert_eq!(problem.id.decode(), Some(problem.key));
            assert_eq!(problem.component.as_deref(), Some("org.example.core (1.0.0)"));
        }
    }

    #[test]
    fn test_internal_changes_not_reported() {
        let (old, new) = load_platforms();
        let forest = DeltaEngine::new().compare(&old, &new).expect("compare");
        let problems = ProblemClassifier::new()
            .classify_comparison(&old, &new, &forest)
            .expect("classify");
        assert!(
            problems
                .iter()
                .all(|p| p.type_name.as_deref() != Some("org.example.internal.Impl"))
        );
    }

    #[test]
    fn test_version_check_requires_major_bump() {
        let (old, new) = load_platforms();
        let forest = DeltaEngine::new().compare(&old, &new).expect("compare");
        let problems = ProblemClassifier::new()
            .with_version_check(true)
            .classify_comparison(&old, &new, &forest)
            .expect("classify");
        let versions: Vec<_> = problems
            .iter()
            .filter(|p| matches!(p.key.kind, ProblemKind::Version(_)))
            .collect();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].key, ProblemKey::version(VersionKind::MajorVersionRequired));
    }

    #[test]
    fn test_major_bump_satisfies_version_check() {
        let removed_api = |version: &str, with_method: bool| {
            let mut ty = Type::new("a.Api", TypeKind::Interface);
            if with_method {
                ty = ty.with_method(Method::new("a.Api", "run", "()V"));
            }
            BaselineBuilder::new(version)
                .component(Component::new("a", version).with_type(ty))
                .build()
                .expect("baseline")
        };
        let old = removed_api("1.2.0", true);
        let new = removed_api("2.0.0", false);
        let forest = DeltaEngine::new().compare(&old, &new).expect("compare");
        let problems = ProblemClassifier::new()
            .classify_comparison(&old, &new, &forest)
            .expect("classify");
        assert!(problems.iter().any(|p| p.is_breaking()));
        assert!(!problems.iter().any(|p| matches!(p.key.kind, ProblemKind::Version(_))));
    }

    #[test]
    fn test_api_demotion_and_new_restriction_are_breaking() {
        let platform = |visibility: VisibilityMap| {
            BaselineBuilder::new("platform")
                .component(
                    Component::new("a", "1.0.0")
                        .with_type(Type::new("a.Base", TypeKind::Class))
                        .with_type(Type::new("a.Helper", TypeKind::Class))
                        .with_visibility(visibility),
                )
                .build()
                .expect("baseline")
        };
        let old = platform(VisibilityMap::new());
        let new = platform(
            VisibilityMap::new()
                .with_type("a.Base", VisibilityEntry::new(Visibility::Api, RestrictionTags::NO_EXTEND))
                .with_type("a.Helper", VisibilityEntry::private()),
        );

        let forest = DeltaEngine::new().compare(&old, &new).expect("compare");
        let problems = ProblemClassifier::new()
            .with_version_check(false)
            .classify_comparison(&old, &new, &forest)
            .expect("classify");

        assert_eq!(problems.len(), 2, "{problems:#?}");
        assert!(problems.iter().all(|p| p.is_breaking()));
        let demoted = problems
            .iter()
            .find(|p| p.key == ProblemKey::change(ElementKind::Type, ChangeKind::Removed, ChangeFlag::ApiVisibility))
            .expect("demotion reported");
        assert_eq!(demoted.message, "The type a.Helper is no longer API in a (1.0.0)");
        let restricted = problems
            .iter()
            .find(|p| p.key == ProblemKey::change(ElementKind::Type, ChangeKind::Changed, ChangeFlag::RestrictionsAdded))
            .expect("restriction reported");
        assert_eq!(restricted.type_name.as_deref(), Some("a.Base"));
    }
}

// ============================================================================
// Report Tests
// ============================================================================

mod report_tests {
    use super::*;

    #[test]
    fn test_json_report_counts() {
        let (old, new) = load_platforms();
        let forest = DeltaEngine::new().compare(&old, &new).expect("compare");
        let problems = ProblemClassifier::new()
            .classify_comparison(&old, &new, &forest)
            .expect("classify");
        let report = create_reporter(ReportFormat::Json)
            .generate_comparison_report(&forest, &problems, &ReportConfig::default())
            .expect("report");
        let value: serde_json::Value = serde_json::from_str(&report).expect("valid json");
        assert_eq!(value["summary"]["breaking"], true);
        assert_eq!(
            value["problems"].as_array().map(Vec::len),
            Some(problems.len())
        );
    }

    #[test]
    fn test_summary_report_mentions_component() {
        let (old, new) = load_platforms();
        let forest = DeltaEngine::new().compare(&old, &new).expect("compare");
        let problems = ProblemClassifier::new()
            .classify_comparison(&old, &new, &forest)
            .expect("classify");
        let report = create_reporter(ReportFormat::Summary)
            .generate_comparison_report(&forest, &problems, &ReportConfig::default())
            .expect("report");
        assert!(report.contains("org.example.core"));
        assert!(report.contains("Breaking changes detected"));
    }
}
