//! Element identifiers and handles.
//!
//! Every element of the structural model (component, type, member) can be
//! named by a [`MemberHandle`]. Handles form an ancestor chain
//! `member → type → component` that scope tests walk, and they provide the
//! stable identifiers used as keys in reports.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of element a delta or problem is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Baseline,
    Component,
    Type,
    Field,
    Method,
    Constructor,
    AnnotationElement,
}

impl ElementKind {
    /// All element kinds, in code order.
    pub const ALL: [Self; 7] = [
        Self::Baseline,
        Self::Component,
        Self::Type,
        Self::Field,
        Self::Method,
        Self::Constructor,
        Self::AnnotationElement,
    ];

    /// Stable numeric code used by problem id packing.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Baseline => 1,
            Self::Component => 2,
            Self::Type => 3,
            Self::Field => 4,
            Self::Method => 5,
            Self::Constructor => 6,
            Self::AnnotationElement => 7,
        }
    }

    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Component => "component",
            Self::Type => "type",
            Self::Field => "field",
            Self::Method => "method",
            Self::Constructor => "constructor",
            Self::AnnotationElement => "annotation-element",
        }
    }

    /// Whether this kind names a member of a type.
    #[must_use]
    pub const fn is_member(self) -> bool {
        matches!(
            self,
            Self::Field | Self::Method | Self::Constructor | Self::AnnotationElement
        )
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of a member within its declaring type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberKey {
    pub name: String,
    /// Field type descriptor or method descriptor
    pub signature: String,
}

impl MemberKey {
    pub fn new(name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature: signature.into(),
        }
    }

    /// Whether the key names a method (its signature is a method descriptor).
    #[must_use]
    pub fn is_method(&self) -> bool {
        self.signature.starts_with('(')
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_method() {
            write!(f, "{}{}", self.name, self.signature)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// Versioned identity of a component, rendered as `name (version)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId {
    pub symbolic_name: String,
    pub version: String,
}

impl ComponentId {
    pub fn new(symbolic_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            symbolic_name: symbolic_name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.symbolic_name, self.version)
    }
}

/// Handle naming a component, a type, or a member.
///
/// The handle level is implied by which parts are present: a member handle
/// has a type and a member, a type handle only a type, and a component
/// handle neither.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberHandle {
    /// Symbolic name of the owning component, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<MemberKey>,
}

impl MemberHandle {
    pub fn component(component: impl Into<String>) -> Self {
        Self {
            component: Some(component.into()),
            type_name: None,
            member: None,
        }
    }

    pub fn of_type(type_name: impl Into<String>) -> Self {
        Self {
            component: None,
            type_name: Some(type_name.into()),
            member: None,
        }
    }

    pub fn of_member(type_name: impl Into<String>, member: MemberKey) -> Self {
        Self {
            component: None,
            type_name: Some(type_name.into()),
            member: Some(member),
        }
    }

    /// Attach the owning component.
    #[must_use]
    pub fn in_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    #[must_use]
    pub const fn is_component(&self) -> bool {
        self.type_name.is_none() && self.member.is_none()
    }

    /// The enclosing element, one level up the ancestor chain.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.member.is_some() {
            Some(Self {
                component: self.component.clone(),
                type_name: self.type_name.clone(),
                member: None,
            })
        } else if self.type_name.is_some() {
            self.component.as_ref().map(|c| Self::component(c.clone()))
        } else {
            None
        }
    }

    /// Stable textual identifier (`component/type#member`).
    #[must_use]
    pub fn stable_id(&self) -> String {
        let mut id = self.component.clone().unwrap_or_default();
        if let Some(type_name) = &self.type_name {
            id.push('/');
            id.push_str(type_name);
        }
        if let Some(member) = &self.member {
            id.push('#');
            id.push_str(&member.to_string());
        }
        id
    }
}

impl fmt::Display for MemberHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stable_id())
    }
}

/// Package part of a qualified type name (`""` for the default package).
#[must_use]
pub fn package_of(qualified_name: &str) -> &str {
    qualified_name
        .rfind('.')
        .map_or("", |idx| &qualified_name[..idx])
}

/// Simple name of a qualified type name, keeping nested-type separators.
#[must_use]
pub fn simple_name_of(qualified_name: &str) -> &str {
    qualified_name
        .rfind('.')
        .map_or(qualified_name, |idx| &qualified_name[idx + 1..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_kind_codes_roundtrip() {
        for kind in ElementKind::ALL {
            assert_eq!(ElementKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ElementKind::from_code(0), None);
    }

    #[test]
    fn test_handle_ancestor_chain() {
        let handle = MemberHandle::of_member("a.b.C", MemberKey::new("run", "()V")).in_component("p1");
        let ty = handle.parent().expect("type level");
        assert_eq!(ty.type_name.as_deref(), Some("a.b.C"));
        assert!(ty.member.is_none());
        let comp = ty.parent().expect("component level");
        assert!(comp.is_component());
        assert_eq!(comp.component.as_deref(), Some("p1"));
        assert!(comp.parent().is_none());
    }

    #[test]
    fn test_stable_id() {
        let handle = MemberHandle::of_member("a.C", MemberKey::new("f", "I")).in_component("p");
        assert_eq!(handle.stable_id(), "p/a.C#f");
        let handle = MemberHandle::of_member("a.C", MemberKey::new("m", "(I)V")).in_component("p");
        assert_eq!(handle.stable_id(), "p/a.C#m(I)V");
    }

    #[test]
    fn test_package_and_simple_names() {
        assert_eq!(package_of("org.example.Color"), "org.example");
        assert_eq!(package_of("Color"), "");
        assert_eq!(simple_name_of("org.example.Outer$Inner"), "Outer$Inner");
    }

    #[test]
    fn test_component_id_display() {
        assert_eq!(ComponentId::new("p1", "1.0.0").to_string(), "p1 (1.0.0)");
    }
}
