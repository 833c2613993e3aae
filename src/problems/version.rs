//! Version numbering check.

use super::classifier::{Problem, ProblemClassifier};
use super::id::{ProblemKey, VersionKind};
use crate::diff::{ChangeKind, Delta};
use crate::error::Result;
use crate::model::{Component, Visibility};
use crate::utils::parse_version;

impl ProblemClassifier {
    /// Check that `new`'s version reflects the changes found against `old`.
    ///
    /// A breaking problem needs a major increment; visible additions
    /// without breakage need at least a minor increment. Versions that do
    /// not parse are not checked.
    pub fn check_version(
        &self,
        old: &Component,
        new: &Component,
        component_delta: Option<&Delta>,
        problems: &[Problem],
    ) -> Result<Option<Problem>> {
        let (Some(old_version), Some(new_version)) =
            (parse_version(&old.version), parse_version(&new.version))
        else {
            tracing::warn!(
                component = %new.symbolic_name,
                old = %old.version,
                new = %new.version,
                "unparseable version, numbering not checked"
            );
            return Ok(None);
        };

        let breaking = problems.iter().any(Problem::is_breaking);
        let additions = component_delta.is_some_and(|delta| {
            delta
                .leaves()
                .iter()
                .any(|leaf| leaf.change_kind == ChangeKind::Added && leaf.visibility == Visibility::Api)
        });

        let kind = if breaking && new_version.major <= old_version.major {
            VersionKind::MajorVersionRequired
        } else if !breaking
            && additions
            && new_version.major == old_version.major
            && new_version.minor <= old_version.minor
        {
            VersionKind::MinorVersionRequired
        } else {
            return Ok(None);
        };

        tracing::debug!(component = %new.symbolic_name, ?kind, "version increment required");
        let problem = self
            .problem(
                ProblemKey::version(kind),
                vec![new.symbolic_name.clone(), new.version.clone()],
            )?
            .map(|mut p| {
                p.component = Some(new.id().to_string());
                p
            });
        Ok(problem)
    }
}
