//! Trait definitions for delta computation strategies.
//!
//! Each concern of a type comparison (hierarchy, fields, methods) is a
//! separate [`ChangeComputer`]; the engine runs them in turn over a matched
//! pair of types and collects their deltas as children of the type node.

use super::Delta;
use crate::model::{Baseline, Component, MemberKey, Type, Visibility, VisibilityEntry};
use std::collections::BTreeSet;

/// Trait for computing one category of changes between two versions of a type.
pub trait ChangeComputer: Send + Sync {
    /// The type of changes this computer produces.
    type ChangeSet;

    /// Compute changes between the old and new type.
    fn compute(&self, old: &Type, new: &Type, ctx: &TypeContext<'_>) -> Self::ChangeSet;

    /// Get the name of this change computer for logging/debugging.
    fn name(&self) -> &str;
}

/// Where a matched type pair lives.
///
/// Components supply visibility maps and component ids; baselines, when
/// present, let the hierarchy computer resolve supertypes transitively.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeContext<'a> {
    pub old_component: Option<&'a Component>,
    pub new_component: Option<&'a Component>,
    pub old_baseline: Option<&'a Baseline>,
    pub new_baseline: Option<&'a Baseline>,
}

/// Which side of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Old,
    New,
}

impl<'a> TypeContext<'a> {
    /// Context for two standalone types.
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn component(&self, side: Side) -> Option<&'a Component> {
        match side {
            Side::Old => self.old_component,
            Side::New => self.new_component,
        }
    }

    #[must_use]
    pub const fn baseline(&self, side: Side) -> Option<&'a Baseline> {
        match side {
            Side::Old => self.old_baseline,
            Side::New => self.new_baseline,
        }
    }

    #[must_use]
    pub fn old_id(&self) -> Option<String> {
        self.old_component.map(|c| c.id().to_string())
    }

    #[must_use]
    pub fn new_id(&self) -> Option<String> {
        self.new_component.map(|c| c.id().to_string())
    }

    /// Effective visibility of a type on one side.
    ///
    /// Types that are not public are treated as private whatever their map
    /// entry says.
    #[must_use]
    pub fn type_visibility(&self, side: Side, ty: &Type) -> VisibilityEntry {
        let mut entry = self
            .component(side)
            .map(|c| c.visibility.resolve(&ty.qualified_name, None))
            .unwrap_or_default();
        if !ty.modifiers.is_visible() {
            entry.visibility = Visibility::Private;
        }
        entry
    }

    /// Effective visibility of a member on one side.
    #[must_use]
    pub fn member_visibility(
        &self,
        side: Side,
        ty: &Type,
        key: &MemberKey,
        visible_modifiers: bool,
    ) -> VisibilityEntry {
        let mut entry = self
            .component(side)
            .map(|c| c.visibility.resolve(&ty.qualified_name, Some(key)))
            .unwrap_or_default();
        if !visible_modifiers || self.type_visibility(side, ty).visibility == Visibility::Private {
            entry.visibility = Visibility::Private;
        }
        entry
    }

    /// Superclass chain of `ty`, nearest first.
    ///
    /// Without a baseline only the direct superclass is known. Cycles and
    /// unresolvable names end the walk.
    #[must_use]
    pub fn superclass_chain(&self, side: Side, ty: &Type) -> Vec<String> {
        let mut chain = Vec::new();
        let mut current = ty.superclass.clone();
        while let Some(name) = current {
            if chain.contains(&name) || name == ty.qualified_name {
                break;
            }
            current = self
                .lookup(side, &name)
                .and_then(|resolved| resolved.superclass.clone());
            chain.push(name);
        }
        chain
    }

    /// All superinterfaces of `ty`, including those inherited through the
    /// superclass chain and through other interfaces.
    #[must_use]
    pub fn superinterfaces(&self, side: Side, ty: &Type) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut pending: Vec<String> = ty.interfaces.clone();
        for superclass in self.superclass_chain(side, ty) {
            if let Some(resolved) = self.lookup(side, &superclass) {
                pending.extend(resolved.interfaces.iter().cloned());
            }
        }
        while let Some(name) = pending.pop() {
            if !seen.insert(name.clone()) {
                continue;
            }
            if let Some(resolved) = self.lookup(side, &name) {
                pending.extend(resolved.interfaces.iter().cloned());
            }
        }
        seen
    }

    fn lookup(&self, side: Side, type_name: &str) -> Option<&'a Type> {
        let baseline = self.baseline(side)?;
        let from = self.component(side)?;
        baseline
            .find_type(from, type_name)
            .ok()
            .flatten()
            .map(|(_, ty)| ty)
            .or_else(|| from.find_type(type_name))
    }
}

/// Convenience alias for the change set every computer produces.
pub type DeltaSet = Vec<Delta>;
