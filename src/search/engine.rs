//! Search engine implementation.

use super::{CancelToken, Reporter, Requestor, SearchCounts, SearchMetadata};
use crate::error::Result;
use crate::extract::{Reference, ReferenceExtractor, Resolution};
use crate::model::{
    Baseline, Component, MemberHandle, MemberKey, ReferenceKind, RestrictionTags, SkippedComponent, Type,
    TypeRoot, Visibility,
};
use indexmap::IndexMap;
use rayon::prelude::*;
use std::collections::{HashSet, VecDeque};

/// How a search ended. Cancellation is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Completed,
    Cancelled,
}

/// References found in one component, grouped by referencing element.
struct ComponentResults {
    groups: IndexMap<MemberHandle, Vec<Reference>>,
    types: usize,
}

/// Walks a baseline and reports the references its components make.
pub struct SearchEngine<'a> {
    scope_baseline: Option<&'a Baseline>,
    parallel: bool,
    extractor: ReferenceExtractor,
}

impl<'a> SearchEngine<'a> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            scope_baseline: None,
            parallel: false,
            extractor: ReferenceExtractor::new(),
        }
    }

    /// Resolve references against `baseline` instead of the searched one.
    #[must_use]
    pub const fn with_scope_baseline(mut self, baseline: &'a Baseline) -> Self {
        self.scope_baseline = Some(baseline);
        self
    }

    /// Search components on the rayon thread pool. Results are still
    /// reported in baseline order.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Search `baseline`, asking `requestor` what to visit and keep and
    /// sending results to `reporter`.
    ///
    /// Missing wiring makes the call a no-op. Cancellation is checked
    /// before each component is searched and again before its results are
    /// reported; a cancelled search keeps what was reported for completed
    /// components and never reports counts.
    pub fn search(
        &self,
        baseline: Option<&Baseline>,
        requestor: Option<&dyn Requestor>,
        reporter: Option<&mut dyn Reporter>,
        cancel: &CancelToken,
    ) -> Result<SearchOutcome> {
        let (Some(baseline), Some(requestor), Some(reporter)) = (baseline, requestor, reporter) else {
            tracing::debug!("search called without baseline, requestor or reporter, nothing to do");
            return Ok(SearchOutcome::Completed);
        };
        let resolver = self.scope_baseline.unwrap_or(baseline);
        let components = baseline.components()?;
        resolver.components()?;

        reporter.report_metadata(&self.metadata(baseline, requestor))?;

        let mut skipped = Vec::new();
        let mut searchable = Vec::new();
        for component in components {
            if requestor
                .exclusions()
                .is_some_and(|list| list.is_excluded(&component.symbolic_name))
            {
                tracing::debug!(component = %component.symbolic_name, "excluded");
                skipped.push(SkippedComponent::excluded(component));
            } else if component.has_resolution_errors() {
                tracing::warn!(component = %component.symbolic_name, "not searched: resolution errors");
                skipped.push(SkippedComponent::unresolved(component));
            } else if requestor.accept_component(component) {
                searchable.push(component);
            } else {
                tracing::trace!(component = %component.symbolic_name, "outside source scope");
            }
        }
        if !skipped.is_empty() {
            reporter.report_not_searched(&skipped)?;
        }

        let mut counts = SearchCounts {
            components_skipped: skipped.len(),
            ..SearchCounts::default()
        };

        if self.parallel {
            let results: Vec<Result<Option<ComponentResults>>> = searchable
                .par_iter()
                .map(|component| {
                    if cancel.is_cancelled() {
                        return Ok(None);
                    }
                    self.search_component(component, requestor, resolver).map(Some)
                })
                .collect();
            for result in results {
                let found = match result? {
                    Some(found) if !cancel.is_cancelled() => found,
                    _ => {
                        tracing::info!(searched = counts.components_searched, "search cancelled");
                        return Ok(SearchOutcome::Cancelled);
                    }
                };
                Self::flush(found, reporter, &mut counts)?;
            }
        } else {
            for component in searchable {
                if cancel.is_cancelled() {
                    tracing::info!(next = %component.symbolic_name, "search cancelled");
                    return Ok(SearchOutcome::Cancelled);
                }
                let found = self.search_component(component, requestor, resolver)?;
                Self::flush(found, reporter, &mut counts)?;
            }
        }

        tracing::info!(
            baseline = %baseline.name(),
            searched = counts.components_searched,
            skipped = counts.components_skipped,
            references = counts.references,
            "search complete"
        );
        reporter.report_counts(&counts)?;
        Ok(SearchOutcome::Completed)
    }

    fn flush(found: ComponentResults, reporter: &mut dyn Reporter, counts: &mut SearchCounts) -> Result<()> {
        counts.components_searched += 1;
        counts.types_searched += found.types;
        for (element, references) in &found.groups {
            counts.record(references);
            reporter.report_results(element, references)?;
        }
        Ok(())
    }

    fn metadata(&self, baseline: &Baseline, requestor: &dyn Requestor) -> SearchMetadata {
        SearchMetadata {
            baseline: baseline.name().to_string(),
            scope_baseline: self.scope_baseline.map(|b| b.name().to_string()),
            started: chrono::Utc::now(),
            include_api: requestor.includes_api(),
            include_internal: requestor.includes_internal(),
            include_illegal_use: requestor.includes_illegal_use(),
            include_local_references: requestor.include_local_references(),
            reference_kinds: requestor
                .reference_kinds()
                .kinds()
                .into_iter()
                .map(|k| k.name().to_string())
                .collect(),
            exclusion_entries: requestor.exclusions().map_or(0, |list| list.len()),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Walk one component: containers, packages, then types.
    fn search_component(
        &self,
        component: &Component,
        requestor: &dyn Requestor,
        resolver: &Baseline,
    ) -> Result<ComponentResults> {
        let mask = requestor.reference_kinds();
        let mut results = ComponentResults {
            groups: IndexMap::new(),
            types: 0,
        };

        for container in &component.type_containers {
            if !requestor.accept_container(container) {
                continue;
            }
            for package in container.packages() {
                for root in container.roots_in(package) {
                    let ty = match root {
                        TypeRoot::Parsed(ty) => ty,
                        TypeRoot::Unreadable { name, reason } => {
                            tracing::warn!(type_name = %name, reason = %reason, "unreadable type not searched");
                            continue;
                        }
                    };
                    if !requestor.accept_member(ty) {
                        continue;
                    }
                    let references = match self.extractor.extract(ty, mask) {
                        Ok(references) => references,
                        Err(err) => {
                            tracing::warn!(type_name = %ty.qualified_name, error = %err, "malformed type not searched");
                            continue;
                        }
                    };
                    results.types += 1;
                    for mut reference in references {
                        reference.source = reference.source.in_component(&component.symbolic_name);
                        let Some(resolution) = resolve(&reference, component, ty, resolver)? else {
                            tracing::trace!(
                                source = %reference.source,
                                target = %reference.target_type,
                                kind = %reference.kind,
                                "unresolved reference dropped"
                            );
                            continue;
                        };
                        if resolution.component_name == component.symbolic_name
                            && !requestor.include_local_references()
                        {
                            continue;
                        }
                        reference.resolution = Some(resolution);
                        let illegal = reference.violation().is_some();
                        if let Some(resolution) = reference.resolution.as_mut() {
                            resolution.illegal = illegal;
                        }
                        if requestor.accept_reference(&reference) {
                            results
                                .groups
                                .entry(reference.source.clone())
                                .or_default()
                                .push(reference);
                        }
                    }
                }
            }
        }

        tracing::debug!(
            component = %component.symbolic_name,
            types = results.types,
            elements = results.groups.len(),
            "component searched"
        );
        Ok(results)
    }
}

impl Default for SearchEngine<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve the target of `reference`, made from `source` in `from`,
/// through `baseline`.
///
/// Member references resolve to the declaring type: the superclass chain is
/// searched first, then superinterfaces.
fn resolve(reference: &Reference, from: &Component, source: &Type, baseline: &Baseline) -> Result<Option<Resolution>> {
    let (component, declaring) = match &reference.target_member {
        None => match baseline.find_type(from, &reference.target_type)? {
            Some(found) => found,
            None => return Ok(None),
        },
        Some(member) => match find_declaring(
            baseline,
            from,
            &reference.target_type,
            member,
            reference.kind == ReferenceKind::Override,
        )? {
            Some(found) => found,
            None => return Ok(None),
        },
    };

    let (visibility, restrictions) = element_visibility(component, declaring, reference.target_member.as_ref());
    let (source_visibility, _) = element_visibility(from, source, reference.source.member.as_ref());

    Ok(Some(Resolution {
        component: component.id().to_string(),
        component_name: component.symbolic_name.clone(),
        declaring_type: declaring.qualified_name.clone(),
        visibility,
        restrictions,
        type_restrictions: component.visibility.resolve(&declaring.qualified_name, None).restrictions,
        illegal: false,
        source_component: from.id().to_string(),
        source_visibility,
    }))
}

/// API status and restrictions of `ty`, or of one of its members, in
/// `component`. Language access and the visibility map must both allow it.
fn element_visibility(component: &Component, ty: &Type, member: Option<&MemberKey>) -> (Visibility, RestrictionTags) {
    let type_entry = component.visibility.resolve(&ty.qualified_name, None);
    let type_visible = ty.modifiers.is_visible() && type_entry.visibility == Visibility::Api;
    let (visible, restrictions) = match member {
        None => (type_visible, type_entry.restrictions),
        Some(member) => {
            let entry = component.visibility.resolve(&ty.qualified_name, Some(member));
            (
                type_visible && member_modifiers_visible(ty, member) && entry.visibility == Visibility::Api,
                entry.restrictions,
            )
        }
    };
    let visibility = if visible { Visibility::Api } else { Visibility::Private };
    (visibility, restrictions)
}

fn member_modifiers_visible(ty: &Type, member: &MemberKey) -> bool {
    if member.is_method() {
        ty.find_method(&member.name, &member.signature)
            .is_some_and(|m| m.modifiers.is_visible())
    } else {
        ty.find_field(&member.name)
            .is_some_and(|f| f.modifiers.is_visible())
    }
}

/// Whether `ty` declares a member `member` can bind to. An override never
/// binds to a private method.
fn binds_to(ty: &Type, member: &MemberKey, overriding: bool) -> bool {
    if overriding {
        ty.find_method(&member.name, &member.signature)
            .is_some_and(|m| !m.modifiers.is_private())
    } else {
        ty.declares(member)
    }
}

fn find_declaring<'b>(
    baseline: &'b Baseline,
    from: &Component,
    type_name: &str,
    member: &MemberKey,
    overriding: bool,
) -> Result<Option<(&'b Component, &'b Type)>> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut interfaces: VecDeque<String> = VecDeque::new();

    let mut current = Some(type_name.to_string());
    while let Some(name) = current.take() {
        if !visited.insert(name.clone()) {
            break;
        }
        let Some((component, ty)) = baseline.find_type(from, &name)? else {
            break;
        };
        if binds_to(ty, member, overriding) {
            return Ok(Some((component, ty)));
        }
        interfaces.extend(ty.interfaces.iter().cloned());
        current.clone_from(&ty.superclass);
    }

    while let Some(name) = interfaces.pop_front() {
        if !visited.insert(name.clone()) {
            continue;
        }
        let Some((component, ty)) = baseline.find_type(from, &name)? else {
            continue;
        };
        if binds_to(ty, member, overriding) {
            return Ok(Some((component, ty)));
        }
        interfaces.extend(ty.interfaces.iter().cloned());
    }
    Ok(None)
}
