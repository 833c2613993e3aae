//! Reference extraction.
//!
//! Walks a type's declarations and member bodies and emits one
//! [`Reference`] per use-site. Extraction knows nothing about baselines or
//! visibility: resolution happens later, in the search engine.

mod reference;

pub use reference::{Reference, ReferenceKindMask, Resolution};

use crate::error::Result;
use crate::model::signatures::{parse_field_descriptor, parse_method_descriptor, referenced_type};
use crate::model::{MemberHandle, MemberKey, ReferenceKind, Type};

/// Extracts references from parsed types.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceExtractor;

impl ReferenceExtractor {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Extract every reference made by `ty` whose kind is in `mask`.
    ///
    /// Fails only when the type is malformed.
    pub fn extract(&self, ty: &Type, mask: ReferenceKindMask) -> Result<Vec<Reference>> {
        ty.validate()?;
        let mut refs = Vec::new();
        let type_handle = MemberHandle::of_type(&ty.qualified_name);
        let mut push = |reference: Reference| {
            if mask.contains(reference.kind) {
                refs.push(reference);
            }
        };

        if let Some(superclass) = &ty.superclass {
            push(Reference::to_type(type_handle.clone(), superclass, ReferenceKind::Extends));
        }
        for interface in &ty.interfaces {
            push(Reference::to_type(type_handle.clone(), interface, ReferenceKind::Implements));
        }

        for field in &ty.fields {
            let source = MemberHandle::of_member(&ty.qualified_name, field.key());
            let field_type = parse_field_descriptor(&field.signature)?;
            if let Some(target) = referenced_type(&field_type) {
                push(Reference::to_type(source, target, ReferenceKind::FieldDeclaration));
            }
        }

        for method in &ty.methods {
            let source = MemberHandle::of_member(&ty.qualified_name, method.key());
            let descriptor = parse_method_descriptor(&method.signature)?;

            for parameter in &descriptor.parameters {
                if let Some(target) = referenced_type(parameter) {
                    push(Reference::to_type(source.clone(), target, ReferenceKind::Parameter));
                }
            }
            if let Some(target) = referenced_type(&descriptor.return_type) {
                push(Reference::to_type(source.clone(), target, ReferenceKind::ReturnType));
            }
            for exception in &method.thrown_exceptions {
                push(Reference::to_type(source.clone(), exception, ReferenceKind::Throws));
            }

            if method.is_overridable()
                && let Some(superclass) = &ty.superclass
            {
                push(Reference::to_member(
                    source.clone(),
                    superclass,
                    MemberKey::new(&method.name, &method.signature),
                    ReferenceKind::Override,
                ));
            }

            for site in &method.body {
                let target_type = site.target_type.trim_end_matches("[]");
                let mut reference = match &site.target_member {
                    Some(member) => {
                        Reference::to_member(source.clone(), target_type, member.clone(), site.kind)
                    }
                    None => Reference::to_type(source.clone(), target_type, site.kind),
                };
                reference.line = site.line;
                push(reference);
            }
        }

        tracing::trace!(type_name = %ty.qualified_name, count = refs.len(), "extracted references");
        Ok(refs)
    }
}
