//! Search policy.

use super::{ExclusionList, Scope};
use crate::extract::{Reference, ReferenceKindMask};
use crate::model::{Component, Type, TypeContainer, Visibility};

/// Caller-supplied policy deciding what a search visits and which
/// references it keeps.
pub trait Requestor: Send + Sync {
    /// Whether to search the outgoing references of `component`.
    fn accept_component(&self, component: &Component) -> bool;

    fn accept_container(&self, _container: &TypeContainer) -> bool {
        true
    }

    fn accept_member(&self, _ty: &Type) -> bool {
        true
    }

    /// Whether to keep a resolved reference.
    fn accept_reference(&self, reference: &Reference) -> bool;

    /// Reference kinds to extract.
    fn reference_kinds(&self) -> ReferenceKindMask;

    fn includes_api(&self) -> bool;

    fn includes_internal(&self) -> bool;

    fn includes_illegal_use(&self) -> bool;

    /// Components whose elements may be reported as referenced.
    fn scope(&self) -> &Scope;

    /// Components that are never searched.
    fn exclusions(&self) -> Option<&ExclusionList> {
        None
    }

    /// Keep references whose target lives in the referencing component.
    fn include_local_references(&self) -> bool {
        false
    }
}

/// Standard use-scan policy.
///
/// Searches the components of a source scope and keeps references into a
/// target scope, filtered by the visibility of the referenced element.
#[derive(Debug, Clone)]
pub struct UseScanRequestor {
    sources: Scope,
    targets: Scope,
    kinds: ReferenceKindMask,
    include_api: bool,
    include_internal: bool,
    include_illegal: bool,
    include_local: bool,
    exclusions: Option<ExclusionList>,
}

impl UseScanRequestor {
    /// Search every component, keeping API and internal references.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sources: Scope::All,
            targets: Scope::All,
            kinds: ReferenceKindMask::DEFAULT,
            include_api: true,
            include_internal: true,
            include_illegal: false,
            include_local: false,
            exclusions: None,
        }
    }

    /// Only search these components.
    #[must_use]
    pub fn with_sources(mut self, scope: Scope) -> Self {
        self.sources = scope;
        self
    }

    /// Only keep references into these components.
    #[must_use]
    pub fn with_targets(mut self, scope: Scope) -> Self {
        self.targets = scope;
        self
    }

    #[must_use]
    pub const fn with_kinds(mut self, kinds: ReferenceKindMask) -> Self {
        self.kinds = kinds;
        self
    }

    /// Set which visibilities to keep.
    #[must_use]
    pub const fn with_visibility(mut self, api: bool, internal: bool) -> Self {
        self.include_api = api;
        self.include_internal = internal;
        self
    }

    /// Also keep references that violate restriction tags.
    #[must_use]
    pub const fn with_illegal_use(mut self, include: bool) -> Self {
        self.include_illegal = include;
        self
    }

    #[must_use]
    pub const fn with_local_references(mut self, include: bool) -> Self {
        self.include_local = include;
        self
    }

    #[must_use]
    pub fn with_exclusions(mut self, exclusions: ExclusionList) -> Self {
        self.exclusions = Some(exclusions);
        self
    }

    #[must_use]
    pub const fn sources(&self) -> &Scope {
        &self.sources
    }
}

impl Default for UseScanRequestor {
    fn default() -> Self {
        Self::new()
    }
}

impl Requestor for UseScanRequestor {
    fn accept_component(&self, component: &Component) -> bool {
        self.sources.includes(component)
    }

    fn accept_reference(&self, reference: &Reference) -> bool {
        let Some(resolution) = &reference.resolution else {
            return false;
        };
        if !self.targets.encloses(&reference.target_handle()) {
            return false;
        }
        if self.include_illegal && resolution.illegal {
            return true;
        }
        if self.include_api && self.include_internal {
            return true;
        }
        match resolution.visibility {
            Visibility::Api => self.include_api,
            Visibility::Private => self.include_internal,
        }
    }

    fn reference_kinds(&self) -> ReferenceKindMask {
        self.kinds
    }

    fn includes_api(&self) -> bool {
        self.include_api
    }

    fn includes_internal(&self) -> bool {
        self.include_internal
    }

    fn includes_illegal_use(&self) -> bool {
        self.include_illegal
    }

    fn scope(&self) -> &Scope {
        &self.targets
    }

    fn exclusions(&self) -> Option<&ExclusionList> {
        self.exclusions.as_ref()
    }

    fn include_local_references(&self) -> bool {
        self.include_local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Resolution;
    use crate::model::{MemberHandle, ReferenceKind, RestrictionTags};

    fn reference(visibility: Visibility, illegal: bool) -> Reference {
        let mut reference = Reference::to_type(
            MemberHandle::of_type("a.A").in_component("p1"),
            "b.B",
            ReferenceKind::TypeReference,
        );
        reference.resolution = Some(Resolution {
            component: "p2 (1.0.0)".into(),
            component_name: "p2".into(),
            declaring_type: "b.B".into(),
            visibility,
            restrictions: RestrictionTags::NONE,
            type_restrictions: RestrictionTags::NONE,
            illegal,
            source_component: "p1 (1.0.0)".into(),
            source_visibility: Visibility::Api,
        });
        reference
    }

    #[test]
    fn test_visibility_filter() {
        let api_only = UseScanRequestor::new().with_visibility(true, false);
        assert!(api_only.accept_reference(&reference(Visibility::Api, false)));
        assert!(!api_only.accept_reference(&reference(Visibility::Private, false)));

        let internal_only = UseScanRequestor::new().with_visibility(false, true);
        assert!(internal_only.accept_reference(&reference(Visibility::Private, false)));
        assert!(!internal_only.accept_reference(&reference(Visibility::Api, false)));
    }

    #[test]
    fn test_illegal_use_overrides_visibility() {
        let requestor = UseScanRequestor::new()
            .with_visibility(false, false)
            .with_illegal_use(true);
        assert!(requestor.accept_reference(&reference(Visibility::Api, true)));
        assert!(!requestor.accept_reference(&reference(Visibility::Api, false)));
    }

    #[test]
    fn test_target_scope() {
        let requestor = UseScanRequestor::new().with_targets(Scope::of(["p3"]));
        assert!(!requestor.accept_reference(&reference(Visibility::Api, false)));
    }

    #[test]
    fn test_unresolved_rejected() {
        let mut unresolved = reference(Visibility::Api, false);
        unresolved.resolution = None;
        assert!(!UseScanRequestor::new().accept_reference(&unresolved));
    }
}
