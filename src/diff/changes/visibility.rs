//! API visibility and restriction change computer.

use super::methods::method_element_kind;
use crate::diff::traits::{ChangeComputer, DeltaSet, Side, TypeContext};
use crate::diff::{ChangeFlag, ChangeKind, Delta};
use crate::model::signatures::display_method;
use crate::model::{ElementKind, MemberKey, RestrictionTags, Type, Visibility, VisibilityEntry};

/// Computes changes to the declared API contract of a type and its members.
///
/// Only elements present on both sides are compared; additions and
/// removals belong to the other computers. Language access changes are
/// reported as modifier changes, so an element only counts as demoted
/// when it stays accessible on both sides.
#[derive(Debug, Default)]
pub struct VisibilityChangeComputer;

impl VisibilityChangeComputer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Deltas for one element whose entries went from `old` to `new`.
    fn entry_deltas(element_kind: ElementKind, key: &str, old: VisibilityEntry, new: VisibilityEntry) -> Vec<Delta> {
        match (old.visibility, new.visibility) {
            (Visibility::Api, Visibility::Private) => {
                return vec![
                    Delta::leaf(element_kind, ChangeKind::Removed, ChangeFlag::ApiVisibility, key)
                        .with_values(Some(old.visibility.to_string()), Some(new.visibility.to_string()))
                        .with_visibility(old),
                ];
            }
            (Visibility::Private, Visibility::Api) => {
                return vec![
                    Delta::leaf(element_kind, ChangeKind::Added, ChangeFlag::ApiVisibility, key)
                        .with_values(Some(old.visibility.to_string()), Some(new.visibility.to_string()))
                        .with_visibility(new),
                ];
            }
            _ => {}
        }

        let added = RestrictionTags(new.restrictions.0 & !old.restrictions.0);
        let removed = RestrictionTags(old.restrictions.0 & !new.restrictions.0);
        let mut deltas = Vec::new();
        if !added.is_empty() {
            deltas.push(
                Delta::leaf(element_kind, ChangeKind::Changed, ChangeFlag::RestrictionsAdded, key)
                    .with_values(Some(old.restrictions.to_string()), Some(added.to_string()))
                    .with_visibility(old),
            );
        }
        if !removed.is_empty() {
            deltas.push(
                Delta::leaf(element_kind, ChangeKind::Changed, ChangeFlag::RestrictionsRemoved, key)
                    .with_values(Some(removed.to_string()), Some(new.restrictions.to_string()))
                    .with_visibility(old),
            );
        }
        deltas
    }

    fn member_deltas(
        old_type: &Type,
        new_type: &Type,
        element_kind: ElementKind,
        label: &str,
        key: &MemberKey,
        accessible: bool,
        ctx: &TypeContext<'_>,
    ) -> Vec<Delta> {
        if !accessible {
            return Vec::new();
        }
        let old = ctx.member_visibility(Side::Old, old_type, key, true);
        let new = ctx.member_visibility(Side::New, new_type, key, true);
        Self::entry_deltas(element_kind, label, old, new)
            .into_iter()
            .map(|d| d.with_member(key.clone()))
            .collect()
    }
}

impl ChangeComputer for VisibilityChangeComputer {
    type ChangeSet = DeltaSet;

    fn compute(&self, old: &Type, new: &Type, ctx: &TypeContext<'_>) -> DeltaSet {
        let old_entry = ctx.type_visibility(Side::Old, old);
        let new_entry = ctx.type_visibility(Side::New, new);
        let type_accessible = old.modifiers.is_visible() && new.modifiers.is_visible();

        let mut deltas = Vec::new();
        if type_accessible {
            deltas.extend(Self::entry_deltas(ElementKind::Type, &new.qualified_name, old_entry, new_entry));
        }
        // A demoted or promoted type takes its members with it.
        if old_entry.visibility != new_entry.visibility {
            return deltas;
        }

        for old_field in old.fields.iter().filter(|f| !f.modifiers.is_synthetic()) {
            let Some(new_field) = new.find_field(&old_field.name) else {
                continue;
            };
            let accessible = old_field.modifiers.is_visible() && new_field.modifiers.is_visible();
            deltas.extend(Self::member_deltas(
                old,
                new,
                ElementKind::Field,
                &old_field.name,
                &old_field.key(),
                accessible,
                ctx,
            ));
        }

        for old_method in old
            .methods
            .iter()
            .filter(|m| !m.is_initializer() && !m.modifiers.is_synthetic())
        {
            let Some(new_method) = new.find_method(&old_method.name, &old_method.signature) else {
                continue;
            };
            let accessible = old_method.modifiers.is_visible() && new_method.modifiers.is_visible();
            deltas.extend(Self::member_deltas(
                old,
                new,
                method_element_kind(old, old_method),
                &display_method(&old_method.name, &old_method.signature),
                &old_method.key(),
                accessible,
                ctx,
            ));
        }
        deltas
    }

    fn name(&self) -> &'static str {
        "visibility"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Component, Field, Method, Modifiers, TypeKind, VisibilityMap};

    fn api_type() -> Type {
        Type::new("a.A", TypeKind::Class)
            .with_field(Field::new("a.A", "count", "I"))
            .with_method(Method::new("a.A", "run", "()V"))
    }

    fn flags(deltas: &[Delta]) -> Vec<(ElementKind, ChangeKind, Option<ChangeFlag>)> {
        deltas.iter().map(|d| (d.element_kind, d.change_kind, d.flag())).collect()
    }

    #[test]
    fn test_type_demoted() {
        let old = Component::new("p", "1.0.0");
        let new = Component::new("p", "1.0.1")
            .with_visibility(VisibilityMap::new().with_package("a", VisibilityEntry::private()));
        let ctx = TypeContext {
            old_component: Some(&old),
            new_component: Some(&new),
            ..TypeContext::default()
        };
        let deltas = VisibilityChangeComputer::new().compute(&api_type(), &api_type(), &ctx);
        assert_eq!(
            flags(&deltas),
            vec![(ElementKind::Type, ChangeKind::Removed, Some(ChangeFlag::ApiVisibility))]
        );
        assert_eq!(deltas[0].visibility, Visibility::Api);
    }

    #[test]
    fn test_member_demoted_and_restricted() {
        let run = MemberKey::new("run", "()V");
        let old = Component::new("p", "1.0.0");
        let new = Component::new("p", "1.0.1").with_visibility(
            VisibilityMap::new()
                .with_type("a.A", VisibilityEntry::new(Visibility::Api, RestrictionTags::NO_EXTEND))
                .with_member("a.A", &MemberKey::new("count", "I"), VisibilityEntry::private())
                .with_member("a.A", &run, VisibilityEntry::new(Visibility::Api, RestrictionTags::NO_OVERRIDE)),
        );
        let ctx = TypeContext {
            old_component: Some(&old),
            new_component: Some(&new),
            ..TypeContext::default()
        };
        let deltas = VisibilityChangeComputer::new().compute(&api_type(), &api_type(), &ctx);
        assert_eq!(
            flags(&deltas),
            vec![
                (ElementKind::Type, ChangeKind::Changed, Some(ChangeFlag::RestrictionsAdded)),
                (ElementKind::Field, ChangeKind::Removed, Some(ChangeFlag::ApiVisibility)),
                (ElementKind::Method, ChangeKind::Changed, Some(ChangeFlag::RestrictionsAdded)),
            ]
        );
        assert_eq!(deltas[0].new_value.as_deref(), Some("@noextend"));
        assert!(deltas[2].restrictions.is_empty());
        assert_eq!(deltas[2].member.as_ref(), Some(&run));
    }

    #[test]
    fn test_access_change_is_not_a_demotion() {
        let hidden = api_type().with_modifiers(Modifiers::new(0));
        let deltas = VisibilityChangeComputer::new().compute(&api_type(), &hidden, &TypeContext::detached());
        assert!(deltas.is_empty());
    }
}
