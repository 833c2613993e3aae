//! Use-site records produced by the bytecode reader.

use super::MemberKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of dependency a use-site expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceKind {
    /// checkcast, instanceof, class literals, array allocation, catch clauses
    TypeReference,
    Extends,
    Implements,
    Instantiate,
    FieldRead,
    FieldWrite,
    VirtualMethod,
    StaticMethod,
    SpecialMethod,
    InterfaceMethod,
    /// Entry that only exists in the constant pool
    ConstantPool,
    FieldDeclaration,
    Parameter,
    ReturnType,
    Throws,
    Override,
}

/// Which report group a reference belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceGroup {
    Type,
    Method,
    Field,
}

impl ReferenceGroup {
    /// Leaf file stem used by the directory reporter.
    #[must_use]
    pub const fn file_stem(self) -> &'static str {
        match self {
            Self::Type => "type_references",
            Self::Method => "method_references",
            Self::Field => "field_references",
        }
    }
}

impl ReferenceKind {
    /// All kinds, in bit order.
    pub const ALL: [Self; 16] = [
        Self::TypeReference,
        Self::Extends,
        Self::Implements,
        Self::Instantiate,
        Self::FieldRead,
        Self::FieldWrite,
        Self::VirtualMethod,
        Self::StaticMethod,
        Self::SpecialMethod,
        Self::InterfaceMethod,
        Self::ConstantPool,
        Self::FieldDeclaration,
        Self::Parameter,
        Self::ReturnType,
        Self::Throws,
        Self::Override,
    ];

    /// Bit used in a reference kind mask.
    #[must_use]
    pub const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    #[must_use]
    pub const fn group(self) -> ReferenceGroup {
        match self {
            Self::FieldRead | Self::FieldWrite => ReferenceGroup::Field,
            Self::VirtualMethod
            | Self::StaticMethod
            | Self::SpecialMethod
            | Self::InterfaceMethod
            | Self::Instantiate
            | Self::Override => ReferenceGroup::Method,
            Self::TypeReference
            | Self::Extends
            | Self::Implements
            | Self::ConstantPool
            | Self::FieldDeclaration
            | Self::Parameter
            | Self::ReturnType
            | Self::Throws => ReferenceGroup::Type,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TypeReference => "type-reference",
            Self::Extends => "extends",
            Self::Implements => "implements",
            Self::Instantiate => "instantiate",
            Self::FieldRead => "field-read",
            Self::FieldWrite => "field-write",
            Self::VirtualMethod => "virtual-method",
            Self::StaticMethod => "static-method",
            Self::SpecialMethod => "special-method",
            Self::InterfaceMethod => "interface-method",
            Self::ConstantPool => "constant-pool",
            Self::FieldDeclaration => "field-declaration",
            Self::Parameter => "parameter",
            Self::ReturnType => "return-type",
            Self::Throws => "throws",
            Self::Override => "override",
        }
    }

    /// Parse a kind from its kebab-case name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Whether the kind targets a member rather than a type.
    #[must_use]
    pub const fn targets_member(self) -> bool {
        matches!(self.group(), ReferenceGroup::Method | ReferenceGroup::Field)
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One use-site inside a member body, as decoded by the bytecode reader.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UseSite {
    pub kind: ReferenceKind,
    /// Qualified name of the referenced type
    pub target_type: String,
    /// Referenced member, for field and method kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_member: Option<MemberKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl UseSite {
    pub fn type_use(kind: ReferenceKind, target_type: impl Into<String>) -> Self {
        Self {
            kind,
            target_type: target_type.into(),
            target_member: None,
            line: None,
        }
    }

    pub fn member_use(kind: ReferenceKind, target_type: impl Into<String>, member: MemberKey) -> Self {
        Self {
            kind,
            target_type: target_type.into(),
            target_member: Some(member),
            line: None,
        }
    }

    #[must_use]
    pub const fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}
