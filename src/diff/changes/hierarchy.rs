//! Type-level change computer: kind, modifiers, supertypes, type
//! parameters and member types.

use super::modifier_deltas;
use crate::diff::traits::{ChangeComputer, DeltaSet, Side, TypeContext};
use crate::diff::{ChangeFlag, ChangeKind, Delta};
use crate::model::{ElementKind, Type, TypeKind};
use std::collections::BTreeSet;

const OBJECT: &str = "java.lang.Object";

/// Computes changes to the declaration of a type itself.
#[derive(Debug, Default)]
pub struct HierarchyChangeComputer;

impl HierarchyChangeComputer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn superclass_delta(old: &Type, new: &Type, ctx: &TypeContext<'_>) -> Option<Delta> {
        if old.superclass == new.superclass {
            return None;
        }
        let chain = |side, ty: &Type| -> BTreeSet<String> {
            ctx.superclass_chain(side, ty)
                .into_iter()
                .filter(|name| name != OBJECT)
                .collect()
        };
        let old_chain = chain(Side::Old, old);
        let new_chain = chain(Side::New, new);
        if old_chain == new_chain {
            return None;
        }
        let flag = set_change(&old_chain, &new_chain, Supertype::Class);
        Some(
            Delta::leaf(ElementKind::Type, ChangeKind::Changed, flag, &new.qualified_name)
                .with_values(old.superclass.clone(), new.superclass.clone()),
        )
    }

    fn superinterfaces_delta(old: &Type, new: &Type, ctx: &TypeContext<'_>) -> Option<Delta> {
        let old_set = ctx.superinterfaces(Side::Old, old);
        let new_set = ctx.superinterfaces(Side::New, new);
        if old_set == new_set {
            return None;
        }
        let flag = set_change(&old_set, &new_set, Supertype::Interface);
        let join = |set: &BTreeSet<String>| set.iter().cloned().collect::<Vec<_>>().join(", ");
        Some(
            Delta::leaf(ElementKind::Type, ChangeKind::Changed, flag, &new.qualified_name)
                .with_values(Some(join(&old_set)), Some(join(&new_set))),
        )
    }

    fn member_type_deltas(old: &Type, new: &Type) -> Vec<Delta> {
        let old_set: BTreeSet<&String> = old.member_types.iter().collect();
        let new_set: BTreeSet<&String> = new.member_types.iter().collect();
        let removed = old_set.difference(&new_set).map(|n| (ChangeKind::Removed, *n));
        let added = new_set.difference(&old_set).map(|n| (ChangeKind::Added, *n));
        removed
            .chain(added)
            .map(|(kind, name)| {
                Delta::leaf(ElementKind::Type, kind, ChangeFlag::TypeMember, name)
                    .in_type(&new.qualified_name)
            })
            .collect()
    }
}

#[derive(Clone, Copy)]
enum Supertype {
    Class,
    Interface,
}

fn set_change(old: &BTreeSet<String>, new: &BTreeSet<String>, which: Supertype) -> ChangeFlag {
    let (expanded, contracted, changed) = match which {
        Supertype::Class => (
            ChangeFlag::SuperclassExpanded,
            ChangeFlag::SuperclassContracted,
            ChangeFlag::SuperclassChanged,
        ),
        Supertype::Interface => (
            ChangeFlag::SuperinterfacesExpanded,
            ChangeFlag::SuperinterfacesContracted,
            ChangeFlag::SuperinterfacesChanged,
        ),
    };
    if new.is_superset(old) {
        expanded
    } else if old.is_superset(new) {
        contracted
    } else {
        changed
    }
}

impl ChangeComputer for HierarchyChangeComputer {
    type ChangeSet = DeltaSet;

    fn compute(&self, old: &Type, new: &Type, ctx: &TypeContext<'_>) -> DeltaSet {
        let mut deltas = Vec::new();
        let name = &new.qualified_name;

        if old.kind != new.kind {
            deltas.push(
                Delta::leaf(ElementKind::Type, ChangeKind::Changed, ChangeFlag::TypeConversion, name)
                    .with_values(Some(old.kind.to_string()), Some(new.kind.to_string())),
            );
        }

        // Interfaces and annotations are implicitly abstract; enums implicitly final.
        let implicit = |ty: &Type| match ty.kind {
            TypeKind::Interface | TypeKind::Annotation => {
                ty.modifiers.with(crate::model::Modifiers::ABSTRACT)
            }
            TypeKind::Class | TypeKind::Enum => ty.modifiers,
        };
        deltas.extend(modifier_deltas(
            ElementKind::Type,
            name,
            implicit(old),
            implicit(new),
        ));

        if old.kind != TypeKind::Interface && new.kind != TypeKind::Interface {
            deltas.extend(Self::superclass_delta(old, new, ctx));
        }
        deltas.extend(Self::superinterfaces_delta(old, new, ctx));

        if old.generic_signature != new.generic_signature {
            deltas.push(
                Delta::leaf(ElementKind::Type, ChangeKind::Changed, ChangeFlag::TypeParameters, name)
                    .with_values(old.generic_signature.clone(), new.generic_signature.clone()),
            );
        }

        deltas.extend(Self::member_type_deltas(old, new));
        deltas
    }

    fn name(&self) -> &'static str {
        "hierarchy"
    }
}
