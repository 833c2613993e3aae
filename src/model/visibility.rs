//! API visibility and restriction tags.
//!
//! Visibility is a declared contract status (`API` or `Private`) that is
//! independent of language access modifiers. Entries are attached to a
//! package, a type or a member; lookups inherit the closest enclosing entry.
//! Restriction tags only apply to the element they are declared on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::BitOr;

/// Declared API status of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Api,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api => f.write_str("API"),
            Self::Private => f.write_str("private"),
        }
    }
}

/// Restriction tags (`@noreference`, `@noextend`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RestrictionTags(pub u8);

impl RestrictionTags {
    pub const NONE: Self = Self(0);
    pub const NO_REFERENCE: Self = Self(0x01);
    pub const NO_EXTEND: Self = Self(0x02);
    pub const NO_IMPLEMENT: Self = Self(0x04);
    pub const NO_INSTANTIATE: Self = Self(0x08);
    pub const NO_OVERRIDE: Self = Self(0x10);

    const NAMES: [(Self, &'static str); 5] = [
        (Self::NO_REFERENCE, "noreference"),
        (Self::NO_EXTEND, "noextend"),
        (Self::NO_IMPLEMENT, "noimplement"),
        (Self::NO_INSTANTIATE, "noinstantiate"),
        (Self::NO_OVERRIDE, "nooverride"),
    ];

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Parse a tag name, with or without the leading `@`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().trim_start_matches('@').to_lowercase();
        Self::NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(tag, _)| *tag)
    }

    /// Tag names in declaration order.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(tag, _)| self.contains(*tag))
            .map(|(_, n)| *n)
            .collect()
    }
}

impl BitOr for RestrictionTags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for RestrictionTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.names().iter().map(|n| format!("@{n}")).collect();
        f.write_str(&names.join(" "))
    }
}

/// Visibility and restrictions of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VisibilityEntry {
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub restrictions: RestrictionTags,
}

impl VisibilityEntry {
    #[must_use]
    pub const fn new(visibility: Visibility, restrictions: RestrictionTags) -> Self {
        Self {
            visibility,
            restrictions,
        }
    }

    #[must_use]
    pub const fn api() -> Self {
        Self::new(Visibility::Api, RestrictionTags::NONE)
    }

    #[must_use]
    pub const fn private() -> Self {
        Self::new(Visibility::Private, RestrictionTags::NONE)
    }
}

/// Per-component API description.
///
/// Keys are package names (`org.example.internal`), qualified type names
/// (`org.example.Color`), or member keys (`org.example.Color#RED`,
/// `org.example.Foo#bar(I)V`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VisibilityMap {
    /// Visibility applied when no entry encloses an element
    #[serde(default)]
    pub default: Visibility,
    #[serde(default)]
    pub packages: BTreeMap<String, VisibilityEntry>,
    #[serde(default)]
    pub types: BTreeMap<String, VisibilityEntry>,
    #[serde(default)]
    pub members: BTreeMap<String, VisibilityEntry>,
}

impl VisibilityMap {
    /// Map where every element is API.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_package(mut self, package: impl Into<String>, entry: VisibilityEntry) -> Self {
        self.packages.insert(package.into(), entry);
        self
    }

    #[must_use]
    pub fn with_type(mut self, type_name: impl Into<String>, entry: VisibilityEntry) -> Self {
        self.types.insert(type_name.into(), entry);
        self
    }

    /// Add a member entry; `member` is the field name or `name(descriptor)`.
    #[must_use]
    pub fn with_member(
        mut self,
        type_name: &str,
        member: &super::MemberKey,
        entry: VisibilityEntry,
    ) -> Self {
        self.members.insert(member_key(type_name, member), entry);
        self
    }

    /// Resolve the effective entry of a type or member.
    ///
    /// Visibility is inherited from the member, then the type, then each
    /// enclosing type, then the package, then the map default. Restrictions
    /// come from the exact element only.
    #[must_use]
    pub fn resolve(&self, type_name: &str, member: Option<&super::MemberKey>) -> VisibilityEntry {
        let exact = match member {
            Some(m) => self.members.get(&member_key(type_name, m)),
            None => self.types.get(type_name),
        };
        let restrictions = exact.map(|e| e.restrictions).unwrap_or_default();

        if let Some(entry) = exact {
            return VisibilityEntry::new(entry.visibility, restrictions);
        }

        let mut current = Some(type_name);
        while let Some(name) = current {
            if let Some(entry) = self.types.get(name) {
                return VisibilityEntry::new(entry.visibility, restrictions);
            }
            current = name.rfind('$').map(|idx| &name[..idx]);
        }

        let visibility = self
            .packages
            .get(super::package_of(type_name))
            .map_or(self.default, |e| e.visibility);
        VisibilityEntry::new(visibility, restrictions)
    }
}

fn member_key(type_name: &str, member: &super::MemberKey) -> String {
    if member.is_method() {
        format!("{type_name}#{}{}", member.name, member.signature)
    } else {
        format!("{type_name}#{}", member.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MemberKey;

    fn sample_map() -> VisibilityMap {
        VisibilityMap::new()
            .with_package("org.example.internal", VisibilityEntry::private())
            .with_type(
                "org.example.Base",
                VisibilityEntry::new(Visibility::Api, RestrictionTags::NO_EXTEND),
            )
            .with_member(
                "org.example.Base",
                &MemberKey::new("hook", "()V"),
                VisibilityEntry::new(Visibility::Api, RestrictionTags::NO_OVERRIDE),
            )
    }

    #[test]
    fn test_package_visibility_inherited() {
        let map = sample_map();
        let entry = map.resolve("org.example.internal.Impl", None);
        assert_eq!(entry.visibility, Visibility::Private);
        let entry = map.resolve(
            "org.example.internal.Impl$Nested",
            Some(&MemberKey::new("x", "I")),
        );
        assert_eq!(entry.visibility, Visibility::Private);
    }

    #[test]
    fn test_restrictions_not_inherited() {
        let map = sample_map();
        let ty = map.resolve("org.example.Base", None);
        assert!(ty.restrictions.contains(RestrictionTags::NO_EXTEND));

        let member = map.resolve("org.example.Base", Some(&MemberKey::new("other", "()V")));
        assert!(member.restrictions.is_empty());
        assert_eq!(member.visibility, Visibility::Api);

        let hook = map.resolve("org.example.Base", Some(&MemberKey::new("hook", "()V")));
        assert!(hook.restrictions.contains(RestrictionTags::NO_OVERRIDE));
    }

    #[test]
    fn test_enclosing_type_visibility() {
        let map = VisibilityMap::new().with_type("a.Outer", VisibilityEntry::private());
        assert_eq!(map.resolve("a.Outer$Inner", None).visibility, Visibility::Private);
    }

    #[test]
    fn test_tag_names() {
        assert_eq!(
            RestrictionTags::from_name("@noreference"),
            Some(RestrictionTags::NO_REFERENCE)
        );
        let tags = RestrictionTags::NO_EXTEND | RestrictionTags::NO_INSTANTIATE;
        assert_eq!(tags.to_string(), "@noextend @noinstantiate");
        assert!(!tags.contains(RestrictionTags::NONE));
    }
}
