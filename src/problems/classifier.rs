//! Table-driven problem classification.

use super::id::{ProblemCategory, ProblemFlag, ProblemId, ProblemKey, UsageKind};
use super::table::{Severity, format_message, lookup};
use crate::diff::{ChangeFlag, ChangeKind, Delta, DeltaForest};
use crate::error::{ApiToolsError, Result};
use crate::extract::Reference;
use crate::model::{Baseline, ElementKind, MemberKey, RestrictionTags, Visibility};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A classified compatibility, usage or version problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: ProblemId,
    pub key: ProblemKey,
    pub severity: Severity,
    pub message: String,
    /// Positional message arguments
    pub arguments: Vec<String>,
    /// Component id the problem is reported against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<MemberKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Problem {
    #[must_use]
    pub fn is_breaking(&self) -> bool {
        self.severity == Severity::Error
            && self.key.category == ProblemCategory::Compatibility
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.severity, self.message, self.id)
    }
}

/// Internal elements that other components are known to depend on.
///
/// Built from use-scan results; lets the classifier report changes to
/// private elements that would otherwise be ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageIndex {
    used: HashSet<String>,
}

impl UsageIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the resolved targets of `references`.
    pub fn from_references<'a>(references: impl IntoIterator<Item = &'a Reference>) -> Self {
        let mut index = Self::new();
        for reference in references {
            index.record(reference);
        }
        index
    }

    /// Mark the target of one reference, and its declaring type, as used.
    pub fn record(&mut self, reference: &Reference) {
        let target = reference.target_handle();
        let Some(type_name) = target.type_name else {
            return;
        };
        if let Some(member) = &target.member {
            self.used.insert(Self::member_key(&type_name, member));
        }
        self.used.insert(type_name);
    }

    #[must_use]
    pub fn contains(&self, type_name: &str, member: Option<&MemberKey>) -> bool {
        match member {
            Some(member) => self.used.contains(&Self::member_key(type_name, member)),
            None => self.used.contains(type_name),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.used.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    fn member_key(type_name: &str, member: &MemberKey) -> String {
        format!("{type_name}#{member}")
    }
}

/// Maps deltas and resolved references to [`Problem`]s.
#[derive(Debug, Clone)]
pub struct ProblemClassifier {
    usage: Option<UsageIndex>,
    min_severity: Severity,
    check_versions: bool,
}

impl ProblemClassifier {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            usage: None,
            min_severity: Severity::Warning,
            check_versions: true,
        }
    }

    /// Report changes to private elements that appear in `index`.
    #[must_use]
    pub fn with_usage_index(mut self, index: UsageIndex) -> Self {
        self.usage = Some(index);
        self
    }

    /// Drop problems below `severity`. `Ignore` problems are never reported.
    #[must_use]
    pub const fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    #[must_use]
    pub const fn with_version_check(mut self, enabled: bool) -> Self {
        self.check_versions = enabled;
        self
    }

    fn reportable(&self, severity: Severity) -> bool {
        severity != Severity::Ignore && severity >= self.min_severity
    }

    /// Build a problem for `key`, or `None` when its severity is filtered.
    ///
    /// Fails with [`ApiToolsError::UnclassifiedChange`] when the table has
    /// no entry for `key`.
    pub fn problem(&self, key: ProblemKey, arguments: Vec<String>) -> Result<Option<Problem>> {
        let Some(rule) = lookup(&key) else {
            return Err(unclassified(&key));
        };
        if !self.reportable(rule.severity) {
            return Ok(None);
        }
        Ok(Some(Problem {
            id: ProblemId::encode(&key)?,
            key,
            severity: rule.severity,
            message: format_message(rule.message, &arguments),
            arguments,
            component: None,
            type_name: None,
            member: None,
            line: None,
        }))
    }

    /// Classify one leaf delta.
    ///
    /// Returns `Ok(None)` for flagless nodes and for changes the table
    /// rates as harmless.
    pub fn classify(&self, delta: &Delta) -> Result<Option<Problem>> {
        let Some(flag) = delta.flag() else {
            return Ok(None);
        };
        let key = ProblemKey::change(delta.element_kind, delta.change_kind, flag);
        let container = match (delta.element_kind, flag) {
            (ElementKind::Type, ChangeFlag::Type | ChangeFlag::Unresolvable | ChangeFlag::ApiVisibility) => {
                delta.new_component.clone().or_else(|| delta.old_component.clone())
            }
            _ => delta.type_name.clone(),
        };
        let arguments = vec![
            delta.key.clone(),
            container.unwrap_or_default(),
            delta.old_value.clone().unwrap_or_default(),
            delta.new_value.clone().unwrap_or_default(),
        ];
        let problem = self.problem(key, arguments)?.map(|mut p| {
            p.component = delta.new_component.clone().or_else(|| delta.old_component.clone());
            p.type_name.clone_from(&delta.type_name);
            p.member.clone_from(&delta.member);
            p
        });
        Ok(problem)
    }

    /// Classify every leaf of a component or type delta.
    ///
    /// Private elements are skipped unless the usage index says another
    /// component depends on them. Elements tagged `@noreference` are not
    /// reachable by clients and are skipped too, as is a type or method
    /// becoming final when clients could not extend or override it.
    pub fn classify_delta(&self, delta: &Delta) -> Result<Vec<Problem>> {
        let mut problems = Vec::new();
        self.walk(delta, RestrictionTags::NONE, &mut problems)?;
        Ok(problems)
    }

    fn walk(&self, delta: &Delta, type_restrictions: RestrictionTags, out: &mut Vec<Problem>) -> Result<()> {
        if !delta.children.is_empty() {
            let restrictions = if delta.element_kind == ElementKind::Type {
                delta.restrictions
            } else {
                type_restrictions
            };
            for child in &delta.children {
                self.walk(child, restrictions, out)?;
            }
            return Ok(());
        }
        if delta.flags.is_empty() || self.hidden(delta, type_restrictions) {
            return Ok(());
        }
        if let Some(problem) = self.classify(delta)? {
            out.push(problem);
        }
        Ok(())
    }

    fn hidden(&self, delta: &Delta, type_restrictions: RestrictionTags) -> bool {
        if delta.visibility == Visibility::Private {
            let used = self.usage.as_ref().is_some_and(|index| {
                let type_name = delta.type_name.as_deref().unwrap_or(&delta.key);
                index.contains(type_name, delta.member.as_ref())
            });
            if !used {
                tracing::trace!(element = %delta.key, "private change not reported");
                return true;
            }
        }
        if delta.restrictions.contains(RestrictionTags::NO_REFERENCE) {
            return true;
        }
        if delta.has_flag(ChangeFlag::NonFinalToFinal) {
            let closed = match delta.element_kind {
                ElementKind::Type => delta.restrictions.contains(RestrictionTags::NO_EXTEND),
                ElementKind::Method => {
                    delta.restrictions.contains(RestrictionTags::NO_OVERRIDE)
                        || type_restrictions.contains(RestrictionTags::NO_EXTEND)
                }
                _ => false,
            };
            return closed;
        }
        false
    }

    /// Classify a whole comparison, including version numbering checks.
    pub fn classify_comparison(
        &self,
        old: &Baseline,
        new: &Baseline,
        forest: &DeltaForest,
    ) -> Result<Vec<Problem>> {
        let mut problems = Vec::new();
        for component_delta in forest.components() {
            let mut component_problems = self.classify_delta(component_delta)?;
            if self.check_versions
                && component_delta.change_kind == ChangeKind::Changed
                && let (Some(old_component), Some(new_component)) = (
                    old.get_component(&component_delta.key)?,
                    new.get_component(&component_delta.key)?,
                )
                && let Some(version) =
                    self.check_version(old_component, new_component, Some(component_delta), &component_problems)?
            {
                component_problems.push(version);
            }
            problems.extend(component_problems);
        }
        tracing::info!(
            old = %old.name(),
            new = %new.name(),
            problems = problems.len(),
            breaking = problems.iter().filter(|p| p.is_breaking()).count(),
            "classification complete"
        );
        Ok(problems)
    }

    /// Classify a resolved reference as a usage problem.
    ///
    /// Restriction violations take precedence over internal references.
    /// Unresolved references and legal uses yield `Ok(None)`.
    pub fn classify_reference(&self, reference: &Reference) -> Result<Option<Problem>> {
        let Some(resolution) = &reference.resolution else {
            return Ok(None);
        };
        let kind = match reference.violation() {
            Some(tag) if tag == RestrictionTags::NO_EXTEND => UsageKind::IllegalExtend,
            Some(tag) if tag == RestrictionTags::NO_IMPLEMENT => UsageKind::IllegalImplement,
            Some(tag) if tag == RestrictionTags::NO_INSTANTIATE => UsageKind::IllegalInstantiate,
            Some(tag) if tag == RestrictionTags::NO_OVERRIDE => UsageKind::IllegalOverride,
            Some(_) => UsageKind::IllegalReference,
            None => {
                let foreign = reference.source.component.as_deref() != Some(resolution.component_name.as_str());
                if resolution.visibility != Visibility::Private || !foreign {
                    return Ok(None);
                }
                match UsageKind::leak(reference.kind) {
                    Some(leak) if resolution.source_visibility == Visibility::Api => leak,
                    _ => UsageKind::InternalReference,
                }
            }
        };

        let element = target_element_kind(reference.target_member.as_ref());
        let key = ProblemKey::usage(element, kind, ProblemFlag::Reference(reference.kind));
        let target = reference.target_handle();
        let arguments = vec![
            reference.source.stable_id(),
            target.stable_id(),
            resolution.component.clone(),
        ];
        let problem = self.problem(key, arguments)?.map(|mut p| {
            p.component = reference.source.component.clone();
            p.type_name.clone_from(&reference.source.type_name);
            p.member.clone_from(&reference.source.member);
            p.line = reference.line;
            p
        });
        Ok(problem)
    }
}

impl Default for ProblemClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Element kind of a reference target.
fn target_element_kind(member: Option<&MemberKey>) -> ElementKind {
    match member {
        None => ElementKind::Type,
        Some(m) if m.name == "<init>" => ElementKind::Constructor,
        Some(m) if m.is_method() => ElementKind::Method,
        Some(_) => ElementKind::Field,
    }
}

fn unclassified(key: &ProblemKey) -> ApiToolsError {
    ApiToolsError::UnclassifiedChange {
        category: key.category.to_string(),
        element: key.element.to_string(),
        kind: key.kind.to_string(),
        flag: key.flag.to_string(),
    }
}
