//! Comparison result structures.

use super::{ChangeKind, Delta};
use crate::model::ElementKind;
use serde::{Deserialize, Serialize};

/// Result of comparing two baselines: one root delta with one child per
/// changed component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub struct DeltaForest {
    pub old_baseline: String,
    pub new_baseline: String,
    pub root: Delta,
}

impl DeltaForest {
    /// Create a forest from per-component deltas.
    pub fn new(
        old_baseline: impl Into<String>,
        new_baseline: impl Into<String>,
        components: Vec<Delta>,
    ) -> Self {
        let new_baseline = new_baseline.into();
        let root = Delta::node(ElementKind::Baseline, ChangeKind::Changed, new_baseline.clone())
            .with_children(components);
        Self {
            old_baseline: old_baseline.into(),
            new_baseline,
            root,
        }
    }

    /// Per-component deltas.
    #[must_use]
    pub fn components(&self) -> &[Delta] {
        &self.root.children
    }

    /// Delta for one component, by symbolic name.
    #[must_use]
    pub fn component(&self, symbolic_name: &str) -> Option<&Delta> {
        self.root.children.iter().find(|d| d.key == symbolic_name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Every leaf delta of the forest.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Delta> {
        self.root.leaves()
    }

    #[must_use]
    pub fn summary(&self) -> DeltaSummary {
        let mut summary = DeltaSummary {
            components_changed: self.root.children.len(),
            ..DeltaSummary::default()
        };
        for leaf in self.leaves() {
            match leaf.change_kind {
                ChangeKind::Added => summary.added += 1,
                ChangeKind::Removed => summary.removed += 1,
                ChangeKind::Changed => summary.changed += 1,
            }
        }
        summary.total = summary.added + summary.removed + summary.changed;
        summary
    }
}

/// Counts of leaf deltas by direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaSummary {
    pub components_changed: usize,
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::ChangeFlag;

    #[test]
    fn test_summary_counts_leaves() {
        let component = Delta::node(ElementKind::Component, ChangeKind::Changed, "p").with_children(vec![
            Delta::leaf(ElementKind::Type, ChangeKind::Removed, ChangeFlag::Type, "a.A"),
            Delta::node(ElementKind::Type, ChangeKind::Changed, "a.B").with_children(vec![
                Delta::leaf(ElementKind::Field, ChangeKind::Added, ChangeFlag::Field, "x"),
            ]),
        ]);
        let forest = DeltaForest::new("old", "new", vec![component]);
        let summary = forest.summary();
        assert_eq!(summary.components_changed, 1);
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.added, 1);
        assert_eq!(summary.total, 2);
        assert!(forest.component("p").is_some());
    }

    #[test]
    fn test_empty_forest() {
        let forest = DeltaForest::new("old", "new", Vec::new());
        assert!(forest.is_empty());
        assert_eq!(forest.summary().total, 0);
    }
}
