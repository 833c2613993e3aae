//! Field and enum constant change computer.

use super::modifier_deltas;
use crate::diff::traits::{ChangeComputer, DeltaSet, Side, TypeContext};
use crate::diff::{ChangeFlag, ChangeKind, Delta};
use crate::model::{ElementKind, Field, Type};
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Computes field-level changes between two versions of a type.
///
/// Fields are matched by name; a changed descriptor is a `FIELD_TYPE`
/// change rather than a removal plus an addition. Enum constants are
/// compared as a set and never reported as field removals.
#[derive(Debug, Default)]
pub struct FieldChangeComputer;

impl FieldChangeComputer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn enum_constant_deltas(old: &Type, new: &Type, ctx: &TypeContext<'_>) -> Vec<Delta> {
        let old_set: BTreeSet<&str> = old.enum_constants().collect();
        let new_set: BTreeSet<&str> = new.enum_constants().collect();
        let mut deltas = Vec::new();

        for name in old_set.difference(&new_set) {
            if let Some(field) = old.find_field(name) {
                let entry = ctx.member_visibility(Side::Old, old, &field.key(), field.modifiers.is_visible());
                deltas.push(
                    Delta::leaf(ElementKind::Type, ChangeKind::Removed, ChangeFlag::EnumConstant, *name)
                        .with_member(field.key())
                        .with_visibility(entry),
                );
            }
        }
        for name in new_set.difference(&old_set) {
            if let Some(field) = new.find_field(name) {
                let entry = ctx.member_visibility(Side::New, new, &field.key(), field.modifiers.is_visible());
                deltas.push(
                    Delta::leaf(ElementKind::Type, ChangeKind::Added, ChangeFlag::EnumConstant, *name)
                        .with_member(field.key())
                        .with_visibility(entry),
                );
            }
        }
        deltas
    }

    fn changed_field_deltas(
        old_type: &Type,
        old: &Field,
        new: &Field,
        ctx: &TypeContext<'_>,
    ) -> Vec<Delta> {
        let mut deltas = modifier_deltas(ElementKind::Field, &old.name, old.modifiers, new.modifiers);

        if old.signature != new.signature {
            deltas.push(
                Delta::leaf(ElementKind::Field, ChangeKind::Changed, ChangeFlag::FieldType, &old.name)
                    .with_values(Some(old.signature.clone()), Some(new.signature.clone())),
            );
        }
        if old.constant_value != new.constant_value {
            deltas.push(
                Delta::leaf(ElementKind::Field, ChangeKind::Changed, ChangeFlag::Value, &old.name)
                    .with_values(old.constant_value.clone(), new.constant_value.clone()),
            );
        }
        if old.generic_signature != new.generic_signature {
            deltas.push(
                Delta::leaf(ElementKind::Field, ChangeKind::Changed, ChangeFlag::TypeParameters, &old.name)
                    .with_values(old.generic_signature.clone(), new.generic_signature.clone()),
            );
        }

        let entry = ctx.member_visibility(Side::Old, old_type, &old.key(), old.modifiers.is_visible());
        deltas
            .into_iter()
            .map(|d| d.with_member(old.key()).with_visibility(entry))
            .collect()
    }
}

fn plain_fields(ty: &Type) -> IndexMap<&str, &Field> {
    ty.fields
        .iter()
        .filter(|f| !f.enum_constant && !f.modifiers.is_synthetic())
        .map(|f| (f.name.as_str(), f))
        .collect()
}

impl ChangeComputer for FieldChangeComputer {
    type ChangeSet = DeltaSet;

    fn compute(&self, old: &Type, new: &Type, ctx: &TypeContext<'_>) -> DeltaSet {
        let mut deltas = Self::enum_constant_deltas(old, new, ctx);
        let old_fields = plain_fields(old);
        let new_fields = plain_fields(new);

        for (name, old_field) in &old_fields {
            match new_fields.get(name) {
                Some(new_field) => {
                    deltas.extend(Self::changed_field_deltas(old, old_field, new_field, ctx));
                }
                None => {
                    let entry = ctx.member_visibility(
                        Side::Old,
                        old,
                        &old_field.key(),
                        old_field.modifiers.is_visible(),
                    );
                    deltas.push(
                        Delta::leaf(ElementKind::Field, ChangeKind::Removed, ChangeFlag::Field, *name)
                            .with_member(old_field.key())
                            .with_visibility(entry),
                    );
                }
            }
        }
        for (name, new_field) in &new_fields {
            if !old_fields.contains_key(name) {
                let entry = ctx.member_visibility(
                    Side::New,
                    new,
                    &new_field.key(),
                    new_field.modifiers.is_visible(),
                );
                deltas.push(
                    Delta::leaf(ElementKind::Field, ChangeKind::Added, ChangeFlag::Field, *name)
                        .with_member(new_field.key())
                        .with_visibility(entry),
                );
            }
        }
        deltas
    }

    fn name(&self) -> &'static str {
        "fields"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Modifiers, TypeKind};

    #[test]
    fn test_enum_constant_removed_once() {
        let old = Type::new("org.example.Color", TypeKind::Enum)
            .with_enum_constant("RED")
            .with_enum_constant("GREEN")
            .with_enum_constant("BLUE");
        let new = Type::new("org.example.Color", TypeKind::Enum)
            .with_enum_constant("RED")
            .with_enum_constant("GREEN");
        let deltas = FieldChangeComputer::new().compute(&old, &new, &TypeContext::detached());
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].change_kind, ChangeKind::Removed);
        assert!(deltas[0].has_flag(ChangeFlag::EnumConstant));
        assert_eq!(deltas[0].key, "BLUE");
    }

    #[test]
    fn test_enum_constant_order_is_ignored() {
        let old = Type::new("a.E", TypeKind::Enum)
            .with_enum_constant("A")
            .with_enum_constant("B");
        let new = Type::new("a.E", TypeKind::Enum)
            .with_enum_constant("B")
            .with_enum_constant("A");
        assert!(FieldChangeComputer::new()
            .compute(&old, &new, &TypeContext::detached())
            .is_empty());
    }

    #[test]
    fn test_field_type_change_is_not_removal() {
        let old = Type::new("a.A", TypeKind::Class).with_field(Field::new("a.A", "count", "I"));
        let new = Type::new("a.A", TypeKind::Class).with_field(Field::new("a.A", "count", "J"));
        let deltas = FieldChangeComputer::new().compute(&old, &new, &TypeContext::detached());
        assert_eq!(deltas.len(), 1);
        assert!(deltas[0].has_flag(ChangeFlag::FieldType));
        assert_eq!(deltas[0].new_value.as_deref(), Some("J"));
    }

    #[test]
    fn test_private_field_removal_is_private() {
        let old = Type::new("a.A", TypeKind::Class).with_field(
            Field::new("a.A", "cache", "I").with_modifiers(Modifiers::new(Modifiers::PRIVATE)),
        );
        let new = Type::new("a.A", TypeKind::Class);
        let deltas = FieldChangeComputer::new().compute(&old, &new, &TypeContext::detached());
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].visibility, crate::model::Visibility::Private);
    }

    #[test]
    fn test_constant_value_change() {
        let old = Type::new("a.A", TypeKind::Class)
            .with_field(Field::new("a.A", "MAX", "I").with_constant("10"));
        let new = Type::new("a.A", TypeKind::Class)
            .with_field(Field::new("a.A", "MAX", "I").with_constant("20"));
        let deltas = FieldChangeComputer::new().compute(&old, &new, &TypeContext::detached());
        assert_eq!(deltas.iter().filter_map(Delta::flag).collect::<Vec<_>>(), vec![ChangeFlag::Value]);
    }
}
