//! Delta tree nodes.

use crate::model::{ElementKind, MemberKey, RestrictionTags, Visibility, VisibilityEntry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Direction of a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Changed,
}

impl ChangeKind {
    pub const ALL: [Self; 3] = [Self::Added, Self::Removed, Self::Changed];

    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Added => 1,
            Self::Removed => 2,
            Self::Changed => 3,
        }
    }

    #[must_use]
    pub const fn inverted(self) -> Self {
        match self {
            Self::Added => Self::Removed,
            Self::Removed => Self::Added,
            Self::Changed => Self::Changed,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Removed => write!(f, "removed"),
            Self::Changed => write!(f, "changed"),
        }
    }
}

/// Fine-grained detail of a delta, used for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeFlag {
    // Hierarchy
    SuperclassExpanded,
    SuperclassContracted,
    SuperclassChanged,
    SuperinterfacesExpanded,
    SuperinterfacesContracted,
    SuperinterfacesChanged,
    TypeConversion,
    // Modifiers
    NonFinalToFinal,
    FinalToNonFinal,
    NonAbstractToAbstract,
    AbstractToNonAbstract,
    NonStaticToStatic,
    StaticToNonStatic,
    DecreaseAccess,
    IncreaseAccess,
    // Elements added or removed
    Component,
    Type,
    TypeMember,
    EnumConstant,
    Field,
    Method,
    Constructor,
    MethodWithDefaultValue,
    // Member details
    AnnotationDefaultValue,
    FieldType,
    ReturnType,
    ThrownExceptions,
    TypeParameters,
    Value,
    /// The type could not be read on one side
    Unresolvable,
    // API contract
    /// The element became, or stopped being, API
    ApiVisibility,
    RestrictionsAdded,
    RestrictionsRemoved,
}

impl ChangeFlag {
    pub const ALL: [Self; 33] = [
        Self::SuperclassExpanded,
        Self::SuperclassContracted,
        Self::SuperclassChanged,
        Self::SuperinterfacesExpanded,
        Self::SuperinterfacesContracted,
        Self::SuperinterfacesChanged,
        Self::TypeConversion,
        Self::NonFinalToFinal,
        Self::FinalToNonFinal,
        Self::NonAbstractToAbstract,
        Self::AbstractToNonAbstract,
        Self::NonStaticToStatic,
        Self::StaticToNonStatic,
        Self::DecreaseAccess,
        Self::IncreaseAccess,
        Self::Component,
        Self::Type,
        Self::TypeMember,
        Self::EnumConstant,
        Self::Field,
        Self::Method,
        Self::Constructor,
        Self::MethodWithDefaultValue,
        Self::AnnotationDefaultValue,
        Self::FieldType,
        Self::ReturnType,
        Self::ThrownExceptions,
        Self::TypeParameters,
        Self::Value,
        Self::Unresolvable,
        Self::ApiVisibility,
        Self::RestrictionsAdded,
        Self::RestrictionsRemoved,
    ];

    /// Position in [`Self::ALL`].
    #[must_use]
    pub const fn ordinal(self) -> u32 {
        self as u32
    }

    #[must_use]
    pub fn from_ordinal(ordinal: u32) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }

    /// The flag describing the same change seen from the other side.
    #[must_use]
    pub const fn dual(self) -> Self {
        match self {
            Self::SuperclassExpanded => Self::SuperclassContracted,
            Self::SuperclassContracted => Self::SuperclassExpanded,
            Self::SuperinterfacesExpanded => Self::SuperinterfacesContracted,
            Self::SuperinterfacesContracted => Self::SuperinterfacesExpanded,
            Self::NonFinalToFinal => Self::FinalToNonFinal,
            Self::FinalToNonFinal => Self::NonFinalToFinal,
            Self::NonAbstractToAbstract => Self::AbstractToNonAbstract,
            Self::AbstractToNonAbstract => Self::NonAbstractToAbstract,
            Self::NonStaticToStatic => Self::StaticToNonStatic,
            Self::StaticToNonStatic => Self::NonStaticToStatic,
            Self::DecreaseAccess => Self::IncreaseAccess,
            Self::IncreaseAccess => Self::DecreaseAccess,
            Self::RestrictionsAdded => Self::RestrictionsRemoved,
            Self::RestrictionsRemoved => Self::RestrictionsAdded,
            other => other,
        }
    }

    #[must_use]
    pub fn name(self) -> String {
        serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("{self:?}"))
    }
}

impl fmt::Display for ChangeFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// One node of a delta tree.
///
/// Leaves carry exactly one flag; inner nodes (baseline, component and
/// changed types) carry none and aggregate their children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    pub element_kind: ElementKind,
    pub change_kind: ChangeKind,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub flags: BTreeSet<ChangeFlag>,
    /// Name of the element: component, type, member or enum constant
    pub key: String,
    /// Enclosing (or own) type of the element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<MemberKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub restrictions: RestrictionTags,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Delta>,
}

impl Delta {
    /// Create a node without flags.
    pub fn node(element_kind: ElementKind, change_kind: ChangeKind, key: impl Into<String>) -> Self {
        Self {
            element_kind,
            change_kind,
            flags: BTreeSet::new(),
            key: key.into(),
            type_name: None,
            member: None,
            old_component: None,
            new_component: None,
            old_value: None,
            new_value: None,
            visibility: Visibility::Api,
            restrictions: RestrictionTags::NONE,
            children: Vec::new(),
        }
    }

    /// Create a leaf with a single flag.
    pub fn leaf(
        element_kind: ElementKind,
        change_kind: ChangeKind,
        flag: ChangeFlag,
        key: impl Into<String>,
    ) -> Self {
        let mut delta = Self::node(element_kind, change_kind, key);
        delta.flags.insert(flag);
        delta
    }

    #[must_use]
    pub fn in_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    #[must_use]
    pub fn with_member(mut self, member: MemberKey) -> Self {
        self.member = Some(member);
        self
    }

    #[must_use]
    pub fn between(mut self, old_component: Option<String>, new_component: Option<String>) -> Self {
        self.old_component = old_component;
        self.new_component = new_component;
        self
    }

    #[must_use]
    pub fn with_values(mut self, old_value: Option<String>, new_value: Option<String>) -> Self {
        self.old_value = old_value;
        self.new_value = new_value;
        self
    }

    #[must_use]
    pub const fn with_visibility(mut self, entry: VisibilityEntry) -> Self {
        self.visibility = entry.visibility;
        self.restrictions = entry.restrictions;
        self
    }

    #[must_use]
    pub fn with_children(mut self, mut children: Vec<Self>) -> Self {
        children.sort_by(compare_deltas);
        self.children = children;
        self
    }

    /// The single flag of a leaf.
    #[must_use]
    pub fn flag(&self) -> Option<ChangeFlag> {
        self.flags.iter().next().copied()
    }

    #[must_use]
    pub fn has_flag(&self, flag: ChangeFlag) -> bool {
        self.flags.contains(&flag)
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether the node has nothing to report.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.flags.is_empty()
    }

    /// All leaves in depth-first order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Self> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Self>) {
        if self.children.is_empty() {
            if !self.flags.is_empty() {
                out.push(self);
            }
        } else {
            for child in &self.children {
                child.collect_leaves(out);
            }
        }
    }

    /// The same change seen from the other side: additions become removals,
    /// flags map to their duals and old/new values swap.
    #[must_use]
    pub fn inverted(&self) -> Self {
        let children = self.children.iter().map(Self::inverted).collect();
        Self {
            element_kind: self.element_kind,
            change_kind: self.change_kind.inverted(),
            flags: self.flags.iter().map(|f| f.dual()).collect(),
            key: self.key.clone(),
            type_name: self.type_name.clone(),
            member: self.member.clone(),
            old_component: self.new_component.clone(),
            new_component: self.old_component.clone(),
            old_value: self.new_value.clone(),
            new_value: self.old_value.clone(),
            visibility: self.visibility,
            restrictions: self.restrictions,
            children: Vec::new(),
        }
        .with_children(children)
    }
}

/// Deterministic sibling order.
pub(crate) fn compare_deltas(a: &Delta, b: &Delta) -> std::cmp::Ordering {
    a.element_kind
        .cmp(&b.element_kind)
        .then_with(|| a.key.cmp(&b.key))
        .then_with(|| a.member.cmp(&b.member))
        .then_with(|| a.flags.cmp(&b.flags))
        .then_with(|| a.change_kind.cmp(&b.change_kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_ordinals_roundtrip() {
        for (idx, flag) in ChangeFlag::ALL.iter().enumerate() {
            assert_eq!(flag.ordinal() as usize, idx);
            assert_eq!(ChangeFlag::from_ordinal(flag.ordinal()), Some(*flag));
        }
        assert_eq!(ChangeFlag::from_ordinal(999), None);
    }

    #[test]
    fn test_dual_is_involution() {
        for flag in ChangeFlag::ALL {
            assert_eq!(flag.dual().dual(), flag);
        }
    }

    #[test]
    fn test_flag_names() {
        assert_eq!(ChangeFlag::EnumConstant.name(), "ENUM_CONSTANT");
        assert_eq!(
            ChangeFlag::MethodWithDefaultValue.to_string(),
            "METHOD_WITH_DEFAULT_VALUE"
        );
    }

    #[test]
    fn test_inverted_swaps_sides() {
        let delta = Delta::node(ElementKind::Type, ChangeKind::Changed, "a.A").with_children(vec![
            Delta::leaf(ElementKind::Field, ChangeKind::Removed, ChangeFlag::Field, "f")
                .between(Some("p (1)".into()), Some("p (2)".into())),
            Delta::leaf(
                ElementKind::Method,
                ChangeKind::Changed,
                ChangeFlag::NonFinalToFinal,
                "m()V",
            ),
        ]);
        let inverted = delta.inverted();
        let kinds: Vec<(ChangeKind, Option<ChangeFlag>)> = inverted
            .leaves()
            .iter()
            .map(|d| (d.change_kind, d.flag()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (ChangeKind::Added, Some(ChangeFlag::Field)),
                (ChangeKind::Changed, Some(ChangeFlag::FinalToNonFinal)),
            ]
        );
        assert_eq!(inverted.inverted(), delta);
    }
}
