//! Search scopes.

use crate::error::Result;
use crate::model::{Baseline, Component, MemberHandle};
use std::collections::HashSet;

/// A set of components, by symbolic name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Scope {
    /// Every component
    #[default]
    All,
    Components(HashSet<String>),
}

impl Scope {
    /// Scope over the given component names.
    pub fn of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Components(names.into_iter().map(Into::into).collect())
    }

    /// Scope over every component of a baseline.
    pub fn of_baseline(baseline: &Baseline) -> Result<Self> {
        Ok(Self::of(
            baseline.components()?.iter().map(|c| c.symbolic_name.clone()),
        ))
    }

    #[must_use]
    pub fn contains_component(&self, symbolic_name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Components(names) => names.contains(symbolic_name),
        }
    }

    #[must_use]
    pub fn includes(&self, component: &Component) -> bool {
        self.contains_component(&component.symbolic_name)
    }

    /// Whether the element, or one of its ancestors, belongs to a component
    /// in scope. Handles without a component are enclosed only by `All`.
    #[must_use]
    pub fn encloses(&self, handle: &MemberHandle) -> bool {
        if matches!(self, Self::All) {
            return true;
        }
        let mut current = Some(handle.clone());
        while let Some(element) = current {
            if let Some(component) = &element.component
                && element.is_component()
            {
                return self.contains_component(component);
            }
            current = element.parent();
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MemberKey;

    #[test]
    fn test_encloses_walks_ancestors() {
        let scope = Scope::of(["p1", "p2"]);
        let member = MemberHandle::of_member("a.A", MemberKey::new("run", "()V")).in_component("p1");
        assert!(scope.encloses(&member));
        assert!(scope.encloses(&MemberHandle::of_type("b.B").in_component("p2")));
        assert!(!scope.encloses(&MemberHandle::of_type("c.C").in_component("p3")));
        assert!(!scope.encloses(&MemberHandle::of_type("c.C")));
    }

    #[test]
    fn test_all_encloses_everything() {
        assert!(Scope::All.encloses(&MemberHandle::of_type("x.Y")));
        assert!(Scope::All.contains_component("anything"));
    }
}
