//! Reference records and kind masks.

use crate::model::{MemberHandle, MemberKey, ReferenceKind, RestrictionTags, Visibility};
use serde::{Deserialize, Serialize};
use std::ops::BitOr;

/// Set of [`ReferenceKind`]s an extraction or search is interested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceKindMask(pub u32);

impl ReferenceKindMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self((1 << ReferenceKind::ALL.len()) - 1);
    /// Everything except constant-pool-only entries, which are compiler
    /// artifacts rather than dependencies.
    pub const DEFAULT: Self = Self(Self::ALL.0 & !ReferenceKind::ConstantPool.bit());

    #[must_use]
    pub fn only(kinds: &[ReferenceKind]) -> Self {
        Self(kinds.iter().fold(0, |acc, k| acc | k.bit()))
    }

    #[must_use]
    pub const fn contains(self, kind: ReferenceKind) -> bool {
        self.0 & kind.bit() != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Kinds in the mask, in bit order.
    #[must_use]
    pub fn kinds(self) -> Vec<ReferenceKind> {
        ReferenceKind::ALL
            .into_iter()
            .filter(|k| self.contains(*k))
            .collect()
    }
}

impl Default for ReferenceKindMask {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitOr for ReferenceKindMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<ReferenceKind> for ReferenceKindMask {
    type Output = Self;

    fn bitor(self, rhs: ReferenceKind) -> Self {
        Self(self.0 | rhs.bit())
    }
}

/// What a reference resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Component declaring the target, as `name (version)`
    pub component: String,
    /// Symbolic name of that component
    pub component_name: String,
    /// Type that declares the target member (may be a supertype of the
    /// referenced type)
    pub declaring_type: String,
    pub visibility: Visibility,
    /// Restrictions declared on the target element
    pub restrictions: RestrictionTags,
    /// Restrictions declared on the declaring type
    pub type_restrictions: RestrictionTags,
    /// Whether the reference violates a restriction tag
    pub illegal: bool,
    /// Component making the reference, as `name (version)`
    #[serde(default)]
    pub source_component: String,
    /// API status of the referencing element in its own component
    #[serde(default)]
    pub source_visibility: Visibility,
}

/// One use-site where a member depends on another element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// The member (or type) making the reference
    pub source: MemberHandle,
    pub target_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_member: Option<MemberKey>,
    pub kind: ReferenceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// Filled in by the search engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

impl Reference {
    pub fn to_type(source: MemberHandle, target_type: impl Into<String>, kind: ReferenceKind) -> Self {
        Self {
            source,
            target_type: target_type.into(),
            target_member: None,
            kind,
            line: None,
            resolution: None,
        }
    }

    pub fn to_member(
        source: MemberHandle,
        target_type: impl Into<String>,
        member: MemberKey,
        kind: ReferenceKind,
    ) -> Self {
        Self {
            source,
            target_type: target_type.into(),
            target_member: Some(member),
            kind,
            line: None,
            resolution: None,
        }
    }

    /// Handle of the referenced element, in the resolved component when
    /// known. Member references point at the declaring type.
    #[must_use]
    pub fn target_handle(&self) -> MemberHandle {
        let (type_name, component) = match &self.resolution {
            Some(res) => (res.declaring_type.clone(), Some(res.component_name.clone())),
            None => (self.target_type.clone(), None),
        };
        MemberHandle {
            component,
            type_name: Some(type_name),
            member: self.target_member.clone(),
        }
    }

    #[must_use]
    pub fn is_illegal(&self) -> bool {
        self.resolution.as_ref().is_some_and(|r| r.illegal)
    }

    /// The restriction tag this reference violates, if any.
    ///
    /// Extends, implements and instantiate are checked against the tags of
    /// the referenced type, override against the overridden method;
    /// `@noreference` on the target forbids every kind of reference.
    #[must_use]
    pub fn violation(&self) -> Option<RestrictionTags> {
        let res = self.resolution.as_ref()?;
        let specific = match self.kind {
            ReferenceKind::Extends => Some((res.type_restrictions, RestrictionTags::NO_EXTEND)),
            ReferenceKind::Implements => Some((res.type_restrictions, RestrictionTags::NO_IMPLEMENT)),
            ReferenceKind::Instantiate => {
                Some((res.type_restrictions, RestrictionTags::NO_INSTANTIATE))
            }
            ReferenceKind::Override => Some((res.restrictions, RestrictionTags::NO_OVERRIDE)),
            _ => None,
        };
        if let Some((tags, tag)) = specific
            && tags.contains(tag)
        {
            return Some(tag);
        }
        res.restrictions
            .contains(RestrictionTags::NO_REFERENCE)
            .then_some(RestrictionTags::NO_REFERENCE)
    }
}
