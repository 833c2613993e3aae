//! Problem identifiers.
//!
//! A [`ProblemId`] packs four independent axes into one integer:
//!
//! | bits  | axis                                   |
//! |-------|----------------------------------------|
//! | 28-31 | category                               |
//! | 22-27 | element kind                           |
//! | 16-21 | change or violation kind               |
//! | 0-15  | flag (0 = none, `0x100` marks a reference kind) |

use crate::diff::{ChangeFlag, ChangeKind};
use crate::error::{ApiToolsError, Result};
use crate::model::{ElementKind, ReferenceKind};
use serde::{Deserialize, Serialize};
use std::fmt;

const CATEGORY_SHIFT: u32 = 28;
const ELEMENT_SHIFT: u32 = 22;
const KIND_SHIFT: u32 = 16;
const ELEMENT_MASK: u32 = 0x3F;
const KIND_MASK: u32 = 0x3F;
const FLAG_MASK: u32 = 0xFFFF;
const REFERENCE_FLAG_BASE: u32 = 0x100;

/// Problem category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemCategory {
    Compatibility,
    Usage,
    Version,
}

impl ProblemCategory {
    pub const ALL: [Self; 3] = [Self::Compatibility, Self::Usage, Self::Version];

    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Compatibility => 1,
            Self::Usage => 2,
            Self::Version => 3,
        }
    }

    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

impl fmt::Display for ProblemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compatibility => write!(f, "compatibility"),
            Self::Usage => write!(f, "usage"),
            Self::Version => write!(f, "version"),
        }
    }
}

/// Kind of API usage violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UsageKind {
    IllegalReference,
    IllegalExtend,
    IllegalImplement,
    IllegalInstantiate,
    IllegalOverride,
    InternalReference,
    /// An API type extends a non-API type
    LeakExtends,
    LeakImplements,
    /// An API field is declared with a non-API type
    LeakField,
    LeakMethodParameter,
    LeakReturnType,
}

impl UsageKind {
    pub const ALL: [Self; 11] = [
        Self::IllegalReference,
        Self::IllegalExtend,
        Self::IllegalImplement,
        Self::IllegalInstantiate,
        Self::IllegalOverride,
        Self::InternalReference,
        Self::LeakExtends,
        Self::LeakImplements,
        Self::LeakField,
        Self::LeakMethodParameter,
        Self::LeakReturnType,
    ];

    /// Leak kind for a structural reference from an API element, if the
    /// reference kind exposes its target in the API.
    #[must_use]
    pub const fn leak(reference: ReferenceKind) -> Option<Self> {
        match reference {
            ReferenceKind::Extends => Some(Self::LeakExtends),
            ReferenceKind::Implements => Some(Self::LeakImplements),
            ReferenceKind::FieldDeclaration => Some(Self::LeakField),
            ReferenceKind::Parameter => Some(Self::LeakMethodParameter),
            ReferenceKind::ReturnType => Some(Self::LeakReturnType),
            _ => None,
        }
    }

    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32 + 1
    }
}

/// Kind of version numbering problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionKind {
    MajorVersionRequired,
    MinorVersionRequired,
}

impl VersionKind {
    pub const ALL: [Self; 2] = [Self::MajorVersionRequired, Self::MinorVersionRequired];

    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32 + 1
    }
}

/// Change or violation kind, interpreted per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ProblemKind {
    Change(ChangeKind),
    Usage(UsageKind),
    Version(VersionKind),
}

impl ProblemKind {
    #[must_use]
    pub const fn category(self) -> ProblemCategory {
        match self {
            Self::Change(_) => ProblemCategory::Compatibility,
            Self::Usage(_) => ProblemCategory::Usage,
            Self::Version(_) => ProblemCategory::Version,
        }
    }

    const fn code(self) -> u32 {
        match self {
            Self::Change(kind) => kind.code(),
            Self::Usage(kind) => kind.code(),
            Self::Version(kind) => kind.code(),
        }
    }

    fn decode(category: ProblemCategory, code: u32) -> Option<Self> {
        match category {
            ProblemCategory::Compatibility => ChangeKind::ALL
                .into_iter()
                .find(|k| k.code() == code)
                .map(Self::Change),
            ProblemCategory::Usage => UsageKind::ALL
                .into_iter()
                .find(|k| k.code() == code)
                .map(Self::Usage),
            ProblemCategory::Version => VersionKind::ALL
                .into_iter()
                .find(|k| k.code() == code)
                .map(Self::Version),
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Change(kind) => write!(f, "{kind}"),
            Self::Usage(kind) => write!(f, "{kind:?}"),
            Self::Version(kind) => write!(f, "{kind:?}"),
        }
    }
}

/// Fine-grained detail of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ProblemFlag {
    #[default]
    None,
    Change(ChangeFlag),
    Reference(ReferenceKind),
}

impl ProblemFlag {
    const fn code(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Change(flag) => flag.ordinal() + 1,
            Self::Reference(kind) => REFERENCE_FLAG_BASE + kind as u32,
        }
    }

    fn decode(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            c if c >= REFERENCE_FLAG_BASE => ReferenceKind::ALL
                .get((c - REFERENCE_FLAG_BASE) as usize)
                .copied()
                .map(Self::Reference),
            c => ChangeFlag::from_ordinal(c - 1).map(Self::Change),
        }
    }
}

impl fmt::Display for ProblemFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Change(flag) => write!(f, "{flag}"),
            Self::Reference(kind) => write!(f, "{kind}"),
        }
    }
}

/// The four classification axes of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProblemKey {
    pub category: ProblemCategory,
    pub element: ElementKind,
    pub kind: ProblemKind,
    pub flag: ProblemFlag,
}

impl ProblemKey {
    #[must_use]
    pub const fn change(element: ElementKind, kind: ChangeKind, flag: ChangeFlag) -> Self {
        Self {
            category: ProblemCategory::Compatibility,
            element,
            kind: ProblemKind::Change(kind),
            flag: ProblemFlag::Change(flag),
        }
    }

    #[must_use]
    pub const fn usage(element: ElementKind, kind: UsageKind, flag: ProblemFlag) -> Self {
        Self {
            category: ProblemCategory::Usage,
            element,
            kind: ProblemKind::Usage(kind),
            flag,
        }
    }

    #[must_use]
    pub const fn version(kind: VersionKind) -> Self {
        Self {
            category: ProblemCategory::Version,
            element: ElementKind::Component,
            kind: ProblemKind::Version(kind),
            flag: ProblemFlag::None,
        }
    }

    /// Whether the axes are mutually consistent.
    ///
    /// The kind must belong to the category; compatibility problems carry
    /// change flags and version problems carry none.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        let kind_matches = matches!(
            (self.category, self.kind),
            (ProblemCategory::Compatibility, ProblemKind::Change(_))
                | (ProblemCategory::Usage, ProblemKind::Usage(_))
                | (ProblemCategory::Version, ProblemKind::Version(_))
        );
        let flag_matches = match self.category {
            ProblemCategory::Compatibility => {
                matches!(self.flag, ProblemFlag::None | ProblemFlag::Change(_))
            }
            ProblemCategory::Usage => true,
            ProblemCategory::Version => matches!(self.flag, ProblemFlag::None),
        };
        kind_matches && flag_matches
    }
}

impl fmt::Display for ProblemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.category, self.element, self.kind, self.flag
        )
    }
}

/// Opaque wire value of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProblemId(pub u32);

impl ProblemId {
    /// Encode a key; fails for inconsistent keys.
    pub fn encode(key: &ProblemKey) -> Result<Self> {
        if !key.is_consistent() {
            return Err(ApiToolsError::validation(format!(
                "inconsistent problem key {key}"
            )));
        }
        Ok(Self(
            (key.category.code() << CATEGORY_SHIFT)
                | (key.element.code() << ELEMENT_SHIFT)
                | (key.kind.code() << KIND_SHIFT)
                | key.flag.code(),
        ))
    }

    /// Recover the four axes, or `None` when the value was not produced by
    /// [`ProblemId::encode`].
    #[must_use]
    pub fn decode(self) -> Option<ProblemKey> {
        let category = ProblemCategory::from_code(self.0 >> CATEGORY_SHIFT)?;
        let element = ElementKind::from_code((self.0 >> ELEMENT_SHIFT) & ELEMENT_MASK)?;
        let kind = ProblemKind::decode(category, (self.0 >> KIND_SHIFT) & KIND_MASK)?;
        let flag = ProblemFlag::decode(self.0 & FLAG_MASK)?;
        let key = ProblemKey {
            category,
            element,
            kind,
            flag,
        };
        key.is_consistent().then_some(key)
    }

    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProblemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}
