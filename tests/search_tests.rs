//! Integration tests for the API use search
//!
//! These tests run the search engine over manifest fixtures and in-memory
//! baselines and check what reaches the reporter.

use api_tools::{
    SearchEngine, SearchOutcome,
    extract::Reference,
    model::{
        BaselineBuilder, Component, MemberHandle, Method, ReferenceKind, SkipReason, SkippedComponent, Type,
        TypeKind, UseSite, Visibility, VisibilityEntry, VisibilityMap,
    },
    parsers::parse_baseline,
    reports::{COUNTS_FILE, DirectoryReporter, META_FILE, NOT_SEARCHED_FILE},
    search::{
        CancelToken, CollectingReporter, ExclusionList, Reporter, Requestor, Scope, SearchCounts, SearchMetadata,
        UseScanRequestor,
    },
};
use std::path::Path;

// ============================================================================
// Test Fixtures
// ============================================================================

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn workspace() -> api_tools::Baseline {
    parse_baseline(&Path::new(FIXTURES_DIR).join("workspace.yaml")).expect("workspace baseline")
}

fn run(baseline: &api_tools::Baseline, requestor: &UseScanRequestor) -> CollectingReporter {
    let mut reporter = CollectingReporter::new();
    let outcome = SearchEngine::new()
        .search(Some(baseline), Some(requestor), Some(&mut reporter), &CancelToken::new())
        .expect("search");
    assert_eq!(outcome, SearchOutcome::Completed);
    reporter
}

/// `app` references one API type and one internal type of `lib`.
fn mixed_visibility() -> api_tools::Baseline {
    BaselineBuilder::new("mixed")
        .component(
            Component::new("lib", "1.0.0")
                .with_type(Type::new("lib.Api", TypeKind::Class))
                .with_type(Type::new("lib.internal.Impl", TypeKind::Class))
                .with_visibility(VisibilityMap::new().with_package("lib.internal", VisibilityEntry::private())),
        )
        .component(
            Component::new("app", "1.0.0").requires("lib").with_type(
                Type::new("app.Main", TypeKind::Class).with_method(
                    Method::new("app.Main", "main", "()V")
                        .with_use(UseSite::type_use(ReferenceKind::Instantiate, "lib.Api").at_line(3))
                        .with_use(UseSite::type_use(ReferenceKind::Instantiate, "lib.internal.Impl").at_line(4)),
                ),
            ),
        )
        .build()
        .expect("baseline")
}

// ============================================================================
// Scope Tests
// ============================================================================

mod scope_tests {
    use super::*;

    #[test]
    fn test_chain_with_source_scope() {
        let baseline = workspace();
        let requestor = UseScanRequestor::new().with_sources(Scope::of(["p1", "p2"]));
        let reporter = run(&baseline, &requestor);

        let elements: Vec<(Option<&str>, usize)> = reporter
            .results
            .iter()
            .map(|(element, refs)| (element.component.as_deref(), refs.len()))
            .collect();
        assert_eq!(elements, vec![(Some("p1"), 1), (Some("p2"), 1)]);

        let targets: Vec<&str> = reporter
            .references()
            .filter_map(|r| r.resolution.as_ref())
            .map(|res| res.component_name.as_str())
            .collect();
        assert_eq!(targets, vec!["p2", "p3"]);
        assert!(reporter.not_searched.is_empty(), "out-of-scope components are not skipped");
        assert_eq!(reporter.counts_calls, 1);
    }

    #[test]
    fn test_target_scope_filters_references() {
        let baseline = workspace();
        let requestor = UseScanRequestor::new().with_targets(Scope::of(["p3"]));
        let reporter = run(&baseline, &requestor);
        let sources: Vec<&MemberHandle> = reporter.results.iter().map(|(element, _)| element).collect();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].type_name.as_deref(), Some("p2.Service"));
    }

    #[test]
    fn test_extends_and_implements_kinds() {
        let baseline = workspace();
        let reporter = run(&baseline, &UseScanRequestor::new());
        let kinds: Vec<ReferenceKind> = reporter.references().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![ReferenceKind::Extends, ReferenceKind::Implements]);
    }
}

// ============================================================================
// Exclusion Tests
// ============================================================================

mod exclusion_tests {
    use super::*;

    #[test]
    fn test_full_exclusion() {
        let baseline = workspace();
        let requestor = UseScanRequestor::new().with_exclusions(ExclusionList::from_entries(["*"]));
        let reporter = run(&baseline, &requestor);

        assert!(reporter.results.is_empty());
        assert_eq!(reporter.not_searched.len(), 1, "one batch");
        let skipped: Vec<&str> = reporter.skipped().map(|s| s.id.as_str()).collect();
        assert_eq!(skipped, vec!["p1", "p2", "p3"]);
        assert!(reporter.skipped().all(|s| s.is_excluded()));
    }

    #[test]
    fn test_exclusion_precedes_resolution_errors() {
        let baseline = BaselineBuilder::new("broken")
            .component(Component::new("orphan", "1.0.0").requires("missing"))
            .component(Component::new("dangling", "1.0.0").requires("missing"))
            .build()
            .expect("baseline");
        let requestor = UseScanRequestor::new().with_exclusions(ExclusionList::from_entries(["orphan"]));
        let reporter = run(&baseline, &requestor);

        let skipped: Vec<_> = reporter.skipped().collect();
        assert_eq!(skipped.len(), 2);
        assert_eq!(skipped[0].id, "orphan");
        assert_eq!(skipped[0].reason, SkipReason::Excluded);
        assert_eq!(skipped[1].id, "dangling");
        assert!(matches!(&skipped[1].reason, SkipReason::ResolutionFailed(errors) if !errors.is_empty()));
    }

    #[test]
    fn test_regex_exclusion() {
        let baseline = workspace();
        let requestor = UseScanRequestor::new().with_exclusions(ExclusionList::from_entries(["R:p[12]"]));
        let reporter = run(&baseline, &requestor);
        assert!(reporter.results.is_empty(), "p3 makes no references");
        assert_eq!(reporter.skipped().count(), 2);
        assert!(requestor.exclusions().is_some_and(|list| list.is_excluded("p1")));
    }
}

// ============================================================================
// Visibility Tests
// ============================================================================

mod visibility_tests {
    use super::*;

    fn visibilities(requestor: &UseScanRequestor) -> Vec<Visibility> {
        run(&mixed_visibility(), requestor)
            .references()
            .filter_map(|r| r.resolution.as_ref().map(|res| res.visibility))
            .collect()
    }

    #[test]
    fn test_api_and_internal_partition() {
        let api = visibilities(&UseScanRequestor::new().with_visibility(true, false));
        let internal = visibilities(&UseScanRequestor::new().with_visibility(false, true));
        let both = visibilities(&UseScanRequestor::new());
        assert_eq!(api, vec![Visibility::Api]);
        assert_eq!(internal, vec![Visibility::Private]);
        assert_eq!(both.len(), api.len() + internal.len());
    }

    #[test]
    fn test_counts_by_visibility() {
        let reporter = run(&mixed_visibility(), &UseScanRequestor::new());
        let counts = reporter.counts.expect("counts reported");
        assert_eq!(counts.references, 2);
        assert_eq!(counts.api_references, 1);
        assert_eq!(counts.internal_references, 1);
        assert_eq!(counts.elements_reported, 1);
    }
}

// ============================================================================
// Engine Contract Tests
// ============================================================================

mod contract_tests {
    use super::*;

    #[test]
    fn test_missing_inputs_are_noop() {
        let baseline = workspace();
        let requestor = UseScanRequestor::new();
        let mut reporter = CollectingReporter::new();
        let engine = SearchEngine::new();
        let cancel = CancelToken::new();

        assert_eq!(
            engine.search(None, Some(&requestor), Some(&mut reporter), &cancel).expect("noop"),
            SearchOutcome::Completed
        );
        assert_eq!(
            engine.search(Some(&baseline), None, Some(&mut reporter), &cancel).expect("noop"),
            SearchOutcome::Completed
        );
        assert_eq!(
            engine.search(Some(&baseline), Some(&requestor), None, &cancel).expect("noop"),
            SearchOutcome::Completed
        );
        assert!(reporter.metadata.is_none());
        assert_eq!(reporter.counts_calls, 0);
    }

    #[test]
    fn test_cancelled_search_skips_counts() {
        let baseline = workspace();
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut reporter = CollectingReporter::new();
        let outcome = SearchEngine::new()
            .search(Some(&baseline), Some(&UseScanRequestor::new()), Some(&mut reporter), &cancel)
            .expect("search");
        assert_eq!(outcome, SearchOutcome::Cancelled);
        assert!(reporter.metadata.is_some());
        assert_eq!(reporter.counts_calls, 0);
    }

    /// Collects results and cancels the search after the first batch.
    struct CancelAfterFirst {
        inner: CollectingReporter,
        cancel: CancelToken,
    }

    impl Reporter for CancelAfterFirst {
        fn report_results(&mut self, element: &MemberHandle, references: &[Reference]) -> api_tools::Result<()> {
            self.cancel.cancel();
            self.inner.report_results(element, references)
        }

        fn report_not_searched(&mut self, skipped: &[SkippedComponent]) -> api_tools::Result<()> {
            self.inner.report_not_searched(skipped)
        }

        fn report_metadata(&mut self, metadata: &SearchMetadata) -> api_tools::Result<()> {
            self.inner.report_metadata(metadata)
        }

        fn report_counts(&mut self, counts: &SearchCounts) -> api_tools::Result<()> {
            self.inner.report_counts(counts)
        }
    }

    #[test]
    fn test_cancel_during_reporting_keeps_partial_results() {
        let baseline = workspace();
        for parallel in [false, true] {
            let cancel = CancelToken::new();
            let mut reporter = CancelAfterFirst {
                inner: CollectingReporter::new(),
                cancel: cancel.clone(),
            };
            let outcome = SearchEngine::new()
                .with_parallel(parallel)
                .search(Some(&baseline), Some(&UseScanRequestor::new()), Some(&mut reporter), &cancel)
                .expect("search");

            assert_eq!(outcome, SearchOutcome::Cancelled, "parallel {parallel}");
            assert_eq!(reporter.inner.results.len(), 1, "parallel {parallel}");
            assert_eq!(reporter.inner.results[0].0.component.as_deref(), Some("p1"));
            assert_eq!(reporter.inner.counts_calls, 0, "parallel {parallel}");
        }
    }

    #[test]
    fn test_disposed_baseline_fails() {
        let mut baseline = workspace();
        baseline.dispose();
        let mut reporter = CollectingReporter::new();
        let result = SearchEngine::new().search(
            Some(&baseline),
            Some(&UseScanRequestor::new()),
            Some(&mut reporter),
            &CancelToken::new(),
        );
        assert!(result.is_err());
    }
}

// ============================================================================
// Directory Report Tests
// ============================================================================

mod directory_tests {
    use super::*;

    #[test]
    fn test_directory_layout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let baseline = workspace();
        let mut reporter = DirectoryReporter::new(dir.path());
        SearchEngine::new()
            .search(
                Some(&baseline),
                Some(&UseScanRequestor::new()),
                Some(&mut reporter),
                &CancelToken::new(),
            )
            .expect("search");

        assert!(dir.path().join(META_FILE).is_file());
        assert!(dir.path().join(COUNTS_FILE).is_file());
        assert!(!dir.path().join(NOT_SEARCHED_FILE).exists());

        let leaf = reporter.leaf_path("p2 (1.0.0)", "p1 (1.0.0)", "type_references");
        let content = std::fs::read_to_string(&leaf).expect("leaf file");
        let references: serde_json::Value = serde_json::from_str(&content).expect("json");
        assert_eq!(references.as_array().map(Vec::len), Some(1));
        assert!(reporter.leaf_path("p3 (1.0.0)", "p2 (1.0.0)", "type_references").is_file());
    }

    #[test]
    fn test_not_searched_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let baseline = workspace();
        let requestor = UseScanRequestor::new().with_exclusions(ExclusionList::from_entries(["p3"]));
        let mut reporter = DirectoryReporter::new(dir.path());
        SearchEngine::new()
            .search(Some(&baseline), Some(&requestor), Some(&mut reporter), &CancelToken::new())
            .expect("search");

        let content = std::fs::read_to_string(dir.path().join(NOT_SEARCHED_FILE)).expect("not searched");
        let skipped: serde_json::Value = serde_json::from_str(&content).expect("json");
        assert_eq!(skipped[0]["id"], "p3");
    }
}
