//! Classification table.
//!
//! Every `(category, element, kind, flag)` combination the engines can
//! produce maps to a severity and a message template. Templates use
//! positional placeholders:
//!
//! - compatibility: `{0}` element, `{1}` enclosing type or component,
//!   `{2}` old value, `{3}` new value
//! - usage: `{0}` referencing element, `{1}` referenced element, `{2}`
//!   component of the referenced element
//! - version: `{0}` component, `{1}` new version

use super::id::{ProblemFlag, ProblemKey, UsageKind, VersionKind};
use crate::diff::{ChangeFlag, ChangeKind};
use crate::model::{ElementKind, ReferenceKind};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Severity of a classified problem.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Known combination that is not a problem
    Ignore,
    #[default]
    Warning,
    Error,
}

impl Severity {
    /// Parse severity from string. Returns None for unrecognized values.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ignore" => Some(Self::Ignore),
            "warning" | "warn" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignore => write!(f, "ignore"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One row of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub severity: Severity,
    pub message: &'static str,
}

static RULES: LazyLock<HashMap<ProblemKey, Rule>> = LazyLock::new(build_table);

/// Look up the rule for a key.
#[must_use]
pub fn lookup(key: &ProblemKey) -> Option<&'static Rule> {
    RULES.get(key)
}

/// Every key the table knows, in no particular order.
pub fn known_keys() -> impl Iterator<Item = &'static ProblemKey> {
    RULES.keys()
}

/// Substitute `{0}`, `{1}`, ... in `template`.
#[must_use]
pub fn format_message(template: &str, args: &[String]) -> String {
    args.iter()
        .enumerate()
        .fold(template.to_string(), |message, (i, arg)| {
            message.replace(&format!("{{{i}}}"), arg)
        })
}

const REFERENCE_TARGETS: [ElementKind; 4] = [
    ElementKind::Type,
    ElementKind::Field,
    ElementKind::Method,
    ElementKind::Constructor,
];

#[derive(Default)]
struct TableBuilder {
    rules: HashMap<ProblemKey, Rule>,
}

impl TableBuilder {
    fn insert(&mut self, key: ProblemKey, severity: Severity, message: &'static str) {
        debug_assert!(key.is_consistent(), "inconsistent table key {key}");
        self.rules.insert(key, Rule { severity, message });
    }

    fn change(
        &mut self,
        elements: &[ElementKind],
        kind: ChangeKind,
        flag: ChangeFlag,
        severity: Severity,
        message: &'static str,
    ) {
        for element in elements {
            self.insert(ProblemKey::change(*element, kind, flag), severity, message);
        }
    }

    fn usage(
        &mut self,
        elements: &[ElementKind],
        kind: UsageKind,
        references: &[ReferenceKind],
        severity: Severity,
        message: &'static str,
    ) {
        for element in elements {
            for reference in references {
                self.insert(
                    ProblemKey::usage(*element, kind, ProblemFlag::Reference(*reference)),
                    severity,
                    message,
                );
            }
        }
    }
}

fn build_table() -> HashMap<ProblemKey, Rule> {
    use ChangeFlag as F;
    use ChangeKind::{Added, Changed, Removed};
    use ElementKind as E;
    use Severity::{Error, Ignore, Warning};

    let mut t = TableBuilder::default();

    // Presence
    t.change(&[E::Component], Removed, F::Component, Error, "The component {0} has been removed");
    t.change(&[E::Component], Added, F::Component, Ignore, "The component {0} has been added");
    t.change(&[E::Type], Removed, F::Type, Error, "The type {0} has been removed from {1}");
    t.change(&[E::Type], Added, F::Type, Ignore, "The type {0} has been added to {1}");
    t.change(&[E::Type], Removed, F::TypeMember, Error, "The member type {0} has been removed from {1}");
    t.change(&[E::Type], Added, F::TypeMember, Ignore, "The member type {0} has been added to {1}");
    t.change(&[E::Type], Removed, F::EnumConstant, Error, "The enum constant {0} has been removed from {1}");
    t.change(&[E::Type], Added, F::EnumConstant, Ignore, "The enum constant {0} has been added to {1}");
    t.change(&[E::Field], Removed, F::Field, Error, "The field {0} has been removed from {1}");
    t.change(&[E::Field], Added, F::Field, Ignore, "The field {0} has been added to {1}");
    t.change(&[E::Method], Removed, F::Method, Error, "The method {0} has been removed from {1}");
    t.change(&[E::Method], Added, F::Method, Ignore, "The method {0} has been added to {1}");
    t.change(&[E::Constructor], Removed, F::Constructor, Error, "The constructor {0} has been removed from {1}");
    t.change(&[E::Constructor], Added, F::Constructor, Ignore, "The constructor {0} has been added to {1}");
    t.change(&[E::AnnotationElement], Removed, F::Method, Error, "The annotation element {0} has been removed from {1}");
    t.change(
        &[E::AnnotationElement],
        Added,
        F::Method,
        Error,
        "The annotation element {0} has been added to {1} without a default value",
    );
    t.change(
        &[E::AnnotationElement],
        Removed,
        F::MethodWithDefaultValue,
        Error,
        "The default value of {0} has been removed from {1}",
    );
    t.change(
        &[E::AnnotationElement],
        Added,
        F::MethodWithDefaultValue,
        Ignore,
        "The annotation element {0} with a default value has been added to {1}",
    );

    // Hierarchy
    t.change(&[E::Type], Changed, F::SuperclassExpanded, Ignore, "The superclass set of {0} has been expanded");
    t.change(&[E::Type], Changed, F::SuperclassContracted, Error, "The superclass set of {0} has been contracted");
    t.change(&[E::Type], Changed, F::SuperclassChanged, Error, "The superclass of {0} has changed from {2} to {3}");
    t.change(
        &[E::Type],
        Changed,
        F::SuperinterfacesExpanded,
        Ignore,
        "The superinterfaces set of {0} has been expanded",
    );
    t.change(
        &[E::Type],
        Changed,
        F::SuperinterfacesContracted,
        Error,
        "The superinterfaces set of {0} has been contracted",
    );
    t.change(
        &[E::Type],
        Changed,
        F::SuperinterfacesChanged,
        Error,
        "The superinterfaces set of {0} has changed from {2} to {3}",
    );
    t.change(&[E::Type], Changed, F::TypeConversion, Error, "The type {0} has been converted from {2} to {3}");

    // Modifiers
    let final_kinds = [E::Type, E::Field, E::Method];
    t.change(&final_kinds, Changed, F::NonFinalToFinal, Error, "{0} has been changed to final");
    t.change(&final_kinds, Changed, F::FinalToNonFinal, Ignore, "{0} is no longer final");
    t.change(&[E::Type, E::Method], Changed, F::NonAbstractToAbstract, Error, "{0} has been changed to abstract");
    t.change(&[E::Type, E::Method], Changed, F::AbstractToNonAbstract, Ignore, "{0} is no longer abstract");
    t.change(&final_kinds, Changed, F::NonStaticToStatic, Error, "{0} has been changed to static");
    t.change(&final_kinds, Changed, F::StaticToNonStatic, Error, "{0} is no longer static");
    let access_kinds = [E::Type, E::Field, E::Method, E::Constructor, E::AnnotationElement];
    t.change(&access_kinds, Changed, F::DecreaseAccess, Error, "The visibility of {0} has been reduced");
    t.change(&access_kinds, Changed, F::IncreaseAccess, Ignore, "The visibility of {0} has been increased");

    // Signatures and values
    t.change(
        &[E::Type, E::Field, E::Method, E::Constructor],
        Changed,
        F::TypeParameters,
        Warning,
        "The type parameters of {0} have changed from {2} to {3}",
    );
    t.change(&[E::Field], Changed, F::FieldType, Error, "The type of field {0} has changed from {2} to {3}");
    t.change(&[E::Field], Changed, F::Value, Warning, "The value of field {0} has changed from {2} to {3}");
    t.change(
        &[E::Method, E::AnnotationElement],
        Changed,
        F::ReturnType,
        Error,
        "The return type of {0} has changed from {2} to {3}",
    );
    t.change(
        &[E::Method, E::Constructor],
        Changed,
        F::ThrownExceptions,
        Warning,
        "The thrown exceptions of {0} have changed from {2} to {3}",
    );
    t.change(
        &[E::AnnotationElement],
        Changed,
        F::AnnotationDefaultValue,
        Warning,
        "The default value of {0} has changed from {2} to {3}",
    );
    t.change(&[E::Type], Changed, F::Unresolvable, Warning, "The type {0} could not be compared: {3}");

    // API contract
    let member_kinds = [E::Field, E::Method, E::Constructor, E::AnnotationElement];
    t.change(&[E::Type], Removed, F::ApiVisibility, Error, "The type {0} is no longer API in {1}");
    t.change(&[E::Type], Added, F::ApiVisibility, Ignore, "The type {0} has become API in {1}");
    t.change(&member_kinds, Removed, F::ApiVisibility, Error, "{0} in {1} is no longer API");
    t.change(&member_kinds, Added, F::ApiVisibility, Ignore, "{0} in {1} has become API");
    t.change(&access_kinds, Changed, F::RestrictionsAdded, Error, "The restrictions {3} have been added to {0}");
    t.change(&access_kinds, Changed, F::RestrictionsRemoved, Ignore, "The restrictions {2} have been removed from {0}");

    // Usage
    let any_reference = ReferenceKind::ALL;
    t.usage(
        &REFERENCE_TARGETS,
        UsageKind::IllegalReference,
        &any_reference,
        Error,
        "{0} illegally references {1}, which is tagged @noreference",
    );
    t.usage(
        &[E::Type],
        UsageKind::IllegalExtend,
        &[ReferenceKind::Extends],
        Error,
        "{0} illegally extends {1}, which is tagged @noextend",
    );
    t.usage(
        &[E::Type],
        UsageKind::IllegalImplement,
        &[ReferenceKind::Implements],
        Error,
        "{0} illegally implements {1}, which is tagged @noimplement",
    );
    t.usage(
        &[E::Type, E::Constructor],
        UsageKind::IllegalInstantiate,
        &[ReferenceKind::Instantiate],
        Error,
        "{0} illegally instantiates {1}, which is tagged @noinstantiate",
    );
    t.usage(
        &[E::Method],
        UsageKind::IllegalOverride,
        &[ReferenceKind::Override],
        Error,
        "{0} illegally overrides {1}, which is tagged @nooverride",
    );
    t.usage(
        &REFERENCE_TARGETS,
        UsageKind::InternalReference,
        &any_reference,
        Warning,
        "{0} references {1}, which is internal to {2}",
    );
    // API leaks
    t.usage(
        &[E::Type],
        UsageKind::LeakExtends,
        &[ReferenceKind::Extends],
        Warning,
        "{0} extends non-API type {1} from {2}",
    );
    t.usage(
        &[E::Type],
        UsageKind::LeakImplements,
        &[ReferenceKind::Implements],
        Warning,
        "{0} implements non-API interface {1} from {2}",
    );
    t.usage(
        &[E::Type],
        UsageKind::LeakField,
        &[ReferenceKind::FieldDeclaration],
        Warning,
        "{0} has non-API type {1} from {2}",
    );
    t.usage(
        &[E::Type],
        UsageKind::LeakMethodParameter,
        &[ReferenceKind::Parameter],
        Warning,
        "{0} has a parameter of non-API type {1} from {2}",
    );
    t.usage(
        &[E::Type],
        UsageKind::LeakReturnType,
        &[ReferenceKind::ReturnType],
        Warning,
        "{0} returns non-API type {1} from {2}",
    );

    // Version numbering
    t.insert(
        ProblemKey::version(VersionKind::MajorVersionRequired),
        Error,
        "The major version of {0} should be incremented in {1}, since breaking changes have been made",
    );
    t.insert(
        ProblemKey::version(VersionKind::MinorVersionRequired),
        Warning,
        "The minor version of {0} should be incremented in {1}, since new APIs have been added",
    );

    tracing::debug!(rules = t.rules.len(), "problem table built");
    t.rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_keys_are_errors() {
        let enum_constant =
            ProblemKey::change(ElementKind::Type, ChangeKind::Removed, ChangeFlag::EnumConstant);
        assert_eq!(lookup(&enum_constant).map(|r| r.severity), Some(Severity::Error));
        let default_value = ProblemKey::change(
            ElementKind::AnnotationElement,
            ChangeKind::Removed,
            ChangeFlag::MethodWithDefaultValue,
        );
        assert_eq!(lookup(&default_value).map(|r| r.severity), Some(Severity::Error));
    }

    #[test]
    fn test_leak_rows_follow_reference_kind() {
        let leak = ProblemKey::usage(
            ElementKind::Type,
            UsageKind::LeakReturnType,
            ProblemFlag::Reference(ReferenceKind::ReturnType),
        );
        assert_eq!(lookup(&leak).map(|r| r.severity), Some(Severity::Warning));
        let mismatched = ProblemKey::usage(
            ElementKind::Type,
            UsageKind::LeakReturnType,
            ProblemFlag::Reference(ReferenceKind::Parameter),
        );
        assert!(lookup(&mismatched).is_none());
    }

    #[test]
    fn test_unknown_key_absent() {
        let key = ProblemKey::change(ElementKind::Constructor, ChangeKind::Changed, ChangeFlag::FieldType);
        assert!(lookup(&key).is_none());
    }

    #[test]
    fn test_every_key_is_consistent() {
        assert!(known_keys().all(ProblemKey::is_consistent));
    }

    #[test]
    fn test_format_message() {
        let message = format_message("{0} moved from {1} to {2}", &["x".into(), "a".into(), "b".into()]);
        assert_eq!(message, "x moved from a to b");
        assert_eq!(format_message("{0} and {1}", &["only".into()]), "only and {1}");
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Ignore);
        assert_eq!(Severity::parse("WARN"), Some(Severity::Warning));
    }
}
