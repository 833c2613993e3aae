//! Delta engine implementation.

use super::changes::{
    FieldChangeComputer, HierarchyChangeComputer, MethodChangeComputer, VisibilityChangeComputer,
};
use super::traits::{ChangeComputer, Side, TypeContext};
use super::{ChangeFlag, ChangeKind, Delta, DeltaForest};
use crate::error::Result;
use crate::model::{Baseline, Component, ElementKind, Type, TypeRoot};
use indexmap::IndexMap;
use rayon::prelude::*;

/// Structural comparison of types, components and baselines.
pub struct DeltaEngine {
    parallel: bool,
    hash_fast_path: bool,
}

impl DeltaEngine {
    /// Create a new delta engine with default settings
    #[must_use]
    pub const fn new() -> Self {
        Self {
            parallel: true,
            hash_fast_path: true,
        }
    }

    /// Compare components on the rayon thread pool
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Skip components whose structural hashes are identical
    #[must_use]
    pub const fn with_hash_fast_path(mut self, enabled: bool) -> Self {
        self.hash_fast_path = enabled;
        self
    }

    /// Compare two standalone types.
    ///
    /// Returns a `Changed` type node whose children are the individual
    /// changes; comparing a type with itself yields a node without children.
    pub fn compare_types(&self, old: &Type, new: &Type) -> Delta {
        self.compare_types_in(old, new, &TypeContext::detached())
    }

    /// Compare two versions of a type within their components.
    pub fn compare_types_in(&self, old: &Type, new: &Type, ctx: &TypeContext<'_>) -> Delta {
        let old_entry = ctx.type_visibility(Side::Old, old);
        let new_entry = ctx.type_visibility(Side::New, new);

        let hierarchy = HierarchyChangeComputer::new();
        let mut children: Vec<Delta> = hierarchy
            .compute(old, new, ctx)
            .into_iter()
            .map(|d| d.with_visibility(old_entry))
            .collect();
        children.extend(FieldChangeComputer::new().compute(old, new, ctx));
        children.extend(MethodChangeComputer::new().compute(old, new, ctx));
        children.extend(VisibilityChangeComputer::new().compute(old, new, ctx));

        let (old_id, new_id) = (ctx.old_id(), ctx.new_id());
        let children = children
            .into_iter()
            .map(|d| {
                let d = d.between(old_id.clone(), new_id.clone());
                if d.type_name.is_some() {
                    d
                } else {
                    d.in_type(&new.qualified_name)
                }
            })
            .collect();

        let mut node = Delta::node(ElementKind::Type, ChangeKind::Changed, &new.qualified_name)
            .in_type(&new.qualified_name)
            .between(old_id, new_id)
            .with_children(children);
        node.visibility = old_entry.visibility;
        node.restrictions = new_entry.restrictions;
        node
    }

    /// Compare two versions of a component.
    ///
    /// Either side may be absent (component added or removed). Returns
    /// `None` when nothing changed.
    pub fn compare_components(
        &self,
        old: Option<&Component>,
        new: Option<&Component>,
        old_baseline: Option<&Baseline>,
        new_baseline: Option<&Baseline>,
    ) -> Option<Delta> {
        let (old, new) = match (old, new) {
            (Some(old), Some(new)) => (old, new),
            (Some(old), None) => {
                tracing::debug!(component = %old.symbolic_name, "component removed");
                return Some(
                    Delta::leaf(ElementKind::Component, ChangeKind::Removed, ChangeFlag::Component, &old.symbolic_name)
                        .between(Some(old.id().to_string()), None),
                );
            }
            (None, Some(new)) => {
                tracing::debug!(component = %new.symbolic_name, "component added");
                return Some(
                    Delta::leaf(ElementKind::Component, ChangeKind::Added, ChangeFlag::Component, &new.symbolic_name)
                        .between(None, Some(new.id().to_string())),
                );
            }
            (None, None) => return None,
        };

        if self.hash_fast_path && old.content_hash != 0 && old.content_hash == new.content_hash {
            tracing::trace!(component = %new.symbolic_name, "content hash unchanged");
            return None;
        }

        let ctx = TypeContext {
            old_component: Some(old),
            new_component: Some(new),
            old_baseline,
            new_baseline,
        };
        let old_roots: IndexMap<&str, &TypeRoot> = old.type_roots().map(|r| (r.name(), r)).collect();
        let new_roots: IndexMap<&str, &TypeRoot> = new.type_roots().map(|r| (r.name(), r)).collect();

        let mut children = Vec::new();
        for (name, old_root) in &old_roots {
            match (old_root, new_roots.get(name)) {
                (TypeRoot::Parsed(old_type), Some(TypeRoot::Parsed(new_type))) => {
                    match old_type.validate().and_then(|()| new_type.validate()) {
                        Ok(()) => {
                            let node = self.compare_types_in(old_type, new_type, &ctx);
                            if !node.is_empty() {
                                children.push(node);
                            }
                        }
                        Err(err) => children.push(unresolvable(name, &err.to_string(), &ctx)),
                    }
                }
                (_, Some(TypeRoot::Unreadable { reason, .. })) => {
                    children.push(unresolvable(name, reason, &ctx));
                }
                (TypeRoot::Unreadable { reason, .. }, Some(TypeRoot::Parsed(_))) => {
                    children.push(unresolvable(name, &format!("unreadable in old version: {reason}"), &ctx));
                }
                (TypeRoot::Parsed(old_type), None) => {
                    let entry = ctx.type_visibility(Side::Old, old_type);
                    children.push(
                        Delta::leaf(ElementKind::Type, ChangeKind::Removed, ChangeFlag::Type, *name)
                            .in_type(*name)
                            .between(ctx.old_id(), ctx.new_id())
                            .with_visibility(entry),
                    );
                }
                (TypeRoot::Unreadable { .. }, None) => {
                    tracing::warn!(type_name = %name, "unreadable type removed, not compared");
                }
            }
        }
        for (name, new_root) in &new_roots {
            if old_roots.contains_key(name) {
                continue;
            }
            match new_root {
                TypeRoot::Parsed(new_type) => match new_type.validate() {
                    Ok(()) => {
                        let entry = ctx.type_visibility(Side::New, new_type);
                        children.push(
                            Delta::leaf(ElementKind::Type, ChangeKind::Added, ChangeFlag::Type, *name)
                                .in_type(*name)
                                .between(ctx.old_id(), ctx.new_id())
                                .with_visibility(entry),
                        );
                    }
                    Err(err) => children.push(unresolvable(name, &err.to_string(), &ctx)),
                },
                TypeRoot::Unreadable { reason, .. } => {
                    children.push(unresolvable(name, reason, &ctx));
                }
            }
        }

        if children.is_empty() {
            return None;
        }
        tracing::debug!(
            component = %new.symbolic_name,
            types = children.len(),
            "component changed"
        );
        Some(
            Delta::node(ElementKind::Component, ChangeKind::Changed, &new.symbolic_name)
                .between(ctx.old_id(), ctx.new_id())
                .with_children(children),
        )
    }

    /// Compare two baselines.
    ///
    /// Components are paired by symbolic name. A type that cannot be read
    /// or is malformed yields a single `UNRESOLVABLE` diagnostic delta and
    /// the comparison carries on.
    pub fn compare(&self, old: &Baseline, new: &Baseline) -> Result<DeltaForest> {
        let mut pairs: IndexMap<&str, (Option<&Component>, Option<&Component>)> = IndexMap::new();
        for component in old.components()? {
            pairs.entry(component.symbolic_name.as_str()).or_default().0 = Some(component);
        }
        for component in new.components()? {
            pairs.entry(component.symbolic_name.as_str()).or_default().1 = Some(component);
        }
        let pairs: Vec<(Option<&Component>, Option<&Component>)> = pairs.into_values().collect();

        let components: Vec<Delta> = if self.parallel {
            pairs
                .par_iter()
                .filter_map(|(o, n)| self.compare_components(*o, *n, Some(old), Some(new)))
                .collect()
        } else {
            pairs
                .iter()
                .filter_map(|(o, n)| self.compare_components(*o, *n, Some(old), Some(new)))
                .collect()
        };

        let forest = DeltaForest::new(old.name(), new.name(), components);
        let summary = forest.summary();
        tracing::info!(
            old = %old.name(),
            new = %new.name(),
            components = summary.components_changed,
            changes = summary.total,
            "baseline comparison complete"
        );
        Ok(forest)
    }
}

impl Default for DeltaEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn unresolvable(type_name: &str, reason: &str, ctx: &TypeContext<'_>) -> Delta {
    tracing::warn!(type_name, reason, "type could not be compared");
    Delta::leaf(ElementKind::Type, ChangeKind::Changed, ChangeFlag::Unresolvable, type_name)
        .in_type(type_name)
        .between(ctx.old_id(), ctx.new_id())
        .with_values(None, Some(reason.to_string()))
}
