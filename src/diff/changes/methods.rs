//! Method, constructor and annotation element change computer.

use super::modifier_deltas;
use crate::diff::traits::{ChangeComputer, DeltaSet, Side, TypeContext};
use crate::diff::{ChangeFlag, ChangeKind, Delta};
use crate::model::signatures::{MethodDescriptor, display_method};
use crate::model::{ElementKind, Method, Type, TypeKind};
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Computes method-level changes between two versions of a type.
///
/// Methods are matched by `(name, descriptor)`. Leftover methods with the
/// same name and parameter list on both sides are paired as a return type
/// change.
#[derive(Debug, Default)]
pub struct MethodChangeComputer;

/// Element kind of a method declared in `ty`.
#[must_use]
pub fn method_element_kind(ty: &Type, method: &Method) -> ElementKind {
    if method.is_constructor() {
        ElementKind::Constructor
    } else if ty.kind == TypeKind::Annotation {
        ElementKind::AnnotationElement
    } else {
        ElementKind::Method
    }
}

const fn presence_flag(kind: ElementKind) -> ChangeFlag {
    match kind {
        ElementKind::Constructor => ChangeFlag::Constructor,
        _ => ChangeFlag::Method,
    }
}

type MethodKey<'a> = (&'a str, &'a str);

fn comparable_methods(ty: &Type) -> IndexMap<MethodKey<'_>, &Method> {
    ty.methods
        .iter()
        .filter(|m| !m.is_initializer() && !m.modifiers.is_synthetic())
        .map(|m| ((m.name.as_str(), m.signature.as_str()), m))
        .collect()
}

impl MethodChangeComputer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn label(method: &Method) -> String {
        display_method(&method.name, &method.signature)
    }

    fn changed_method_deltas(
        old_type: &Type,
        old: &Method,
        new_type: &Type,
        new: &Method,
        ctx: &TypeContext<'_>,
    ) -> Vec<Delta> {
        let kind = method_element_kind(old_type, old);
        let label = Self::label(old);
        let mut deltas = modifier_deltas(kind, &label, old.modifiers, new.modifiers);

        if old.signature != new.signature {
            deltas.push(
                Delta::leaf(kind, ChangeKind::Changed, ChangeFlag::ReturnType, &label)
                    .with_values(Some(old.signature.clone()), Some(new.signature.clone())),
            );
        }

        if kind == ElementKind::AnnotationElement
            && method_element_kind(new_type, new) == ElementKind::AnnotationElement
        {
            match (&old.default_value, &new.default_value) {
                (Some(_), None) => deltas.push(
                    Delta::leaf(kind, ChangeKind::Removed, ChangeFlag::MethodWithDefaultValue, &label)
                        .with_values(old.default_value.clone(), None),
                ),
                (None, Some(_)) => deltas.push(
                    Delta::leaf(kind, ChangeKind::Added, ChangeFlag::MethodWithDefaultValue, &label)
                        .with_values(None, new.default_value.clone()),
                ),
                (Some(a), Some(b)) if a != b => deltas.push(
                    Delta::leaf(kind, ChangeKind::Changed, ChangeFlag::AnnotationDefaultValue, &label)
                        .with_values(Some(a.clone()), Some(b.clone())),
                ),
                _ => {}
            }
        }

        if matches!(kind, ElementKind::Method | ElementKind::Constructor) {
            let old_throws: BTreeSet<&String> = old.thrown_exceptions.iter().collect();
            let new_throws: BTreeSet<&String> = new.thrown_exceptions.iter().collect();
            if old_throws != new_throws {
                let join = |set: &BTreeSet<&String>| {
                    set.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
                };
                deltas.push(
                    Delta::leaf(kind, ChangeKind::Changed, ChangeFlag::ThrownExceptions, &label)
                        .with_values(Some(join(&old_throws)), Some(join(&new_throws))),
                );
            }
            if old.generic_signature != new.generic_signature {
                deltas.push(
                    Delta::leaf(kind, ChangeKind::Changed, ChangeFlag::TypeParameters, &label)
                        .with_values(old.generic_signature.clone(), new.generic_signature.clone()),
                );
            }
        }

        let entry = ctx.member_visibility(Side::Old, old_type, &old.key(), old.modifiers.is_visible());
        deltas
            .into_iter()
            .map(|d| d.with_member(old.key()).with_visibility(entry))
            .collect()
    }

    fn presence_delta(ty: &Type, method: &Method, change: ChangeKind, side: Side, ctx: &TypeContext<'_>) -> Delta {
        let kind = method_element_kind(ty, method);
        let entry = ctx.member_visibility(side, ty, &method.key(), method.modifiers.is_visible());
        let flag = if kind == ElementKind::AnnotationElement && method.default_value.is_some() {
            ChangeFlag::MethodWithDefaultValue
        } else {
            presence_flag(kind)
        };
        Delta::leaf(kind, change, flag, Self::label(method))
            .with_member(method.key())
            .with_visibility(entry)
    }
}

impl ChangeComputer for MethodChangeComputer {
    type ChangeSet = DeltaSet;

    fn compute(&self, old: &Type, new: &Type, ctx: &TypeContext<'_>) -> DeltaSet {
        let old_methods = comparable_methods(old);
        let new_methods = comparable_methods(new);
        let mut deltas = Vec::new();
        let mut removed: Vec<&Method> = Vec::new();
        let mut added: Vec<&Method> = Vec::new();

        for (key, old_method) in &old_methods {
            match new_methods.get(key) {
                Some(new_method) => deltas.extend(Self::changed_method_deltas(
                    old, old_method, new, new_method, ctx,
                )),
                None => removed.push(old_method),
            }
        }
        for (key, new_method) in &new_methods {
            if !old_methods.contains_key(key) {
                added.push(new_method);
            }
        }

        // Pair same name and parameters: the return type changed.
        let mut unmatched_added: Vec<Option<&Method>> = added.into_iter().map(Some).collect();
        for old_method in removed {
            let params = MethodDescriptor::parameter_descriptor(&old_method.signature);
            let partner = unmatched_added.iter_mut().find(|slot| {
                matches!(slot, Some(m) if !m.is_constructor()
                    && m.name == old_method.name
                    && MethodDescriptor::parameter_descriptor(&m.signature) == params)
            });
            match partner.and_then(Option::take) {
                Some(new_method) => deltas.extend(Self::changed_method_deltas(
                    old, old_method, new, new_method, ctx,
                )),
                None => deltas.push(Self::presence_delta(old, old_method, ChangeKind::Removed, Side::Old, ctx)),
            }
        }
        for new_method in unmatched_added.into_iter().flatten() {
            deltas.push(Self::presence_delta(new, new_method, ChangeKind::Added, Side::New, ctx));
        }

        deltas
    }

    fn name(&self) -> &'static str {
        "methods"
    }
}
