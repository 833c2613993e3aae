//! Components and their type containers.

use super::{ComponentId, Type, VisibilityMap};
use crate::error::ResolutionError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Requirement on another component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRef {
    pub name: String,
    /// Version range as written in the manifest (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_range: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

impl ComponentRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version_range: None,
            optional: false,
        }
    }

    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// A type as delivered by the bytecode reader, or the reason it could not
/// be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TypeRoot {
    Parsed(Type),
    Unreadable { name: String, reason: String },
}

impl TypeRoot {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Parsed(ty) => &ty.qualified_name,
            Self::Unreadable { name, .. } => name,
        }
    }

    #[must_use]
    pub const fn as_type(&self) -> Option<&Type> {
        match self {
            Self::Parsed(ty) => Some(ty),
            Self::Unreadable { .. } => None,
        }
    }

    #[must_use]
    pub fn package(&self) -> &str {
        super::package_of(self.name())
    }
}

/// A jar, directory or other unit holding compiled types.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeContainer {
    pub name: String,
    #[serde(default)]
    pub roots: Vec<TypeRoot>,
}

impl TypeContainer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roots: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_type(mut self, ty: Type) -> Self {
        self.roots.push(TypeRoot::Parsed(ty));
        self
    }

    #[must_use]
    pub fn with_unreadable(mut self, name: impl Into<String>, reason: impl Into<String>) -> Self {
        self.roots.push(TypeRoot::Unreadable {
            name: name.into(),
            reason: reason.into(),
        });
        self
    }

    /// Distinct packages, sorted.
    #[must_use]
    pub fn packages(&self) -> BTreeSet<&str> {
        self.roots.iter().map(TypeRoot::package).collect()
    }

    /// Roots belonging to `package`, in container order.
    pub fn roots_in<'a>(&'a self, package: &'a str) -> impl Iterator<Item = &'a TypeRoot> + 'a {
        self.roots.iter().filter(move |r| r.package() == package)
    }
}

/// One versioned unit of compiled code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub symbolic_name: String,
    pub version: String,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default)]
    pub is_source_only: bool,
    #[serde(default)]
    pub required: Vec<ComponentRef>,
    #[serde(default)]
    pub type_containers: Vec<TypeContainer>,
    #[serde(default)]
    pub visibility: VisibilityMap,
    /// Set by the resolution phase when the component could not be resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_errors: Option<Vec<ResolutionError>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<PathBuf>,
    /// Hash of the structural content, computed on population
    #[serde(skip)]
    pub content_hash: u64,
}

impl Component {
    pub fn new(symbolic_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            symbolic_name: symbolic_name.into(),
            version: version.into(),
            is_system: false,
            is_source_only: false,
            required: Vec::new(),
            type_containers: Vec::new(),
            visibility: VisibilityMap::default(),
            resolution_errors: None,
            location: None,
            content_hash: 0,
        }
    }

    #[must_use]
    pub fn requires(mut self, name: impl Into<String>) -> Self {
        self.required.push(ComponentRef::new(name));
        self
    }

    #[must_use]
    pub fn with_requirement(mut self, requirement: ComponentRef) -> Self {
        self.required.push(requirement);
        self
    }

    #[must_use]
    pub fn with_container(mut self, container: TypeContainer) -> Self {
        self.type_containers.push(container);
        self
    }

    /// Convenience: add a single type in a container named after the component.
    #[must_use]
    pub fn with_type(mut self, ty: Type) -> Self {
        if let Some(container) = self.type_containers.first_mut() {
            container.roots.push(TypeRoot::Parsed(ty));
        } else {
            let container = TypeContainer::new(format!("{}.jar", self.symbolic_name)).with_type(ty);
            self.type_containers.push(container);
        }
        self
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: VisibilityMap) -> Self {
        self.visibility = visibility;
        self
    }

    #[must_use]
    pub const fn system(mut self) -> Self {
        self.is_system = true;
        self
    }

    #[must_use]
    pub fn id(&self) -> ComponentId {
        ComponentId::new(self.symbolic_name.clone(), self.version.clone())
    }

    #[must_use]
    pub fn has_resolution_errors(&self) -> bool {
        self.resolution_errors
            .as_ref()
            .is_some_and(|errors| !errors.is_empty())
    }

    /// Distinct packages across all containers, sorted.
    #[must_use]
    pub fn packages(&self) -> BTreeSet<&str> {
        self.type_containers
            .iter()
            .flat_map(TypeContainer::packages)
            .collect()
    }

    #[must_use]
    pub fn provides_package(&self, package: &str) -> bool {
        self.type_containers
            .iter()
            .any(|c| c.roots.iter().any(|r| r.package() == package))
    }

    /// Find a parsed type by qualified name.
    #[must_use]
    pub fn find_type(&self, qualified_name: &str) -> Option<&Type> {
        self.type_roots()
            .filter_map(TypeRoot::as_type)
            .find(|ty| ty.qualified_name == qualified_name)
    }

    /// All type roots across containers, in container order.
    pub fn type_roots(&self) -> impl Iterator<Item = &TypeRoot> {
        self.type_containers.iter().flat_map(|c| c.roots.iter())
    }

    pub fn type_count(&self) -> usize {
        self.type_containers.iter().map(|c| c.roots.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeKind;

    #[test]
    fn test_packages_and_lookup() {
        let comp = Component::new("p1", "1.0.0")
            .with_type(Type::new("a.b.One", TypeKind::Class))
            .with_type(Type::new("a.c.Two", TypeKind::Interface));
        assert_eq!(comp.type_containers.len(), 1);
        assert!(comp.provides_package("a.b"));
        assert!(!comp.provides_package("a"));
        assert_eq!(comp.packages().into_iter().collect::<Vec<_>>(), vec!["a.b", "a.c"]);
        assert!(comp.find_type("a.c.Two").is_some());
        assert!(comp.find_type("a.c.Three").is_none());
    }

    #[test]
    fn test_unreadable_root_has_package() {
        let container = TypeContainer::new("x.jar").with_unreadable("a.Broken", "truncated");
        assert_eq!(container.packages().into_iter().collect::<Vec<_>>(), vec!["a"]);
        assert!(container.roots[0].as_type().is_none());
    }

    #[test]
    fn test_resolution_errors_flag() {
        let mut comp = Component::new("p", "1.0");
        assert!(!comp.has_resolution_errors());
        comp.resolution_errors = Some(vec![ResolutionError::new("p", "missing q")]);
        assert!(comp.has_resolution_errors());
    }
}
