//! Change computer implementations.
//!
//! This module provides concrete implementations of the `ChangeComputer` trait
//! for each concern of a type comparison: hierarchy and type modifiers,
//! fields (including enum constants), methods, and the declared API
//! contract.

mod fields;
mod hierarchy;
mod methods;
mod visibility;

pub use fields::FieldChangeComputer;
pub use hierarchy::HierarchyChangeComputer;
pub use methods::MethodChangeComputer;
pub use visibility::VisibilityChangeComputer;

use super::{ChangeFlag, ChangeKind, Delta};
use crate::model::{ElementKind, Modifiers};

/// Modifier deltas that apply to an element of the given kind.
pub(crate) fn modifier_deltas(
    element_kind: ElementKind,
    key: &str,
    old: Modifiers,
    new: Modifiers,
) -> Vec<Delta> {
    let mut flags = Vec::new();

    let checks_final = matches!(
        element_kind,
        ElementKind::Type | ElementKind::Field | ElementKind::Method
    );
    let checks_abstract = matches!(element_kind, ElementKind::Type | ElementKind::Method);
    let checks_static = matches!(
        element_kind,
        ElementKind::Type | ElementKind::Field | ElementKind::Method
    );

    if checks_final && old.is_final() != new.is_final() {
        flags.push(if new.is_final() {
            ChangeFlag::NonFinalToFinal
        } else {
            ChangeFlag::FinalToNonFinal
        });
    }
    if checks_abstract && old.is_abstract() != new.is_abstract() {
        flags.push(if new.is_abstract() {
            ChangeFlag::NonAbstractToAbstract
        } else {
            ChangeFlag::AbstractToNonAbstract
        });
    }
    if checks_static && old.is_static() != new.is_static() {
        flags.push(if new.is_static() {
            ChangeFlag::NonStaticToStatic
        } else {
            ChangeFlag::StaticToNonStatic
        });
    }
    match old.access_rank().cmp(&new.access_rank()) {
        std::cmp::Ordering::Greater => flags.push(ChangeFlag::DecreaseAccess),
        std::cmp::Ordering::Less => flags.push(ChangeFlag::IncreaseAccess),
        std::cmp::Ordering::Equal => {}
    }

    flags
        .into_iter()
        .map(|flag| Delta::leaf(element_kind, ChangeKind::Changed, flag, key))
        .collect()
}
