//! Directory-per-used-element search report.
//!
//! Layout under the report root:
//!
//! ```text
//! meta.json
//! not_searched.json
//! counts.json
//! <used component id>/<using component id>/type_references.json
//!                                         /method_references.json
//!                                         /field_references.json
//! ```
//!
//! Component ids have the form `name (version)`. Leaf files hold JSON
//! arrays of reference records and are merged when a later call targets
//! the same file. Nothing is created for an element without references.

use crate::error::{ApiToolsError, ReportErrorKind, Result};
use crate::extract::Reference;
use crate::model::{MemberHandle, SkippedComponent};
use crate::search::{Reporter, SearchCounts, SearchMetadata};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const META_FILE: &str = "meta.json";
pub const NOT_SEARCHED_FILE: &str = "not_searched.json";
pub const COUNTS_FILE: &str = "counts.json";

/// Writes search results as a `used/using/` directory index.
#[derive(Debug, Clone)]
pub struct DirectoryReporter {
    root: PathBuf,
    not_searched: Vec<SkippedComponent>,
}

impl DirectoryReporter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            not_searched: Vec::new(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Leaf file for references from `using` into `used`.
    #[must_use]
    pub fn leaf_path(&self, used: &str, using: &str, file_stem: &str) -> PathBuf {
        self.root
            .join(dir_name(used))
            .join(dir_name(using))
            .join(format!("{file_stem}.json"))
    }

    fn ensure_dir(path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| ApiToolsError::io(path, e))
    }

    fn write_root_file<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        Self::ensure_dir(&self.root)?;
        write_json(&self.root.join(name), value)
    }
}

impl Reporter for DirectoryReporter {
    fn report_results(&mut self, element: &MemberHandle, references: &[Reference]) -> Result<()> {
        let mut leaves: BTreeMap<PathBuf, Vec<&Reference>> = BTreeMap::new();
        for reference in references {
            let Some(resolution) = &reference.resolution else {
                tracing::warn!(source = %reference.source, "unresolved reference not written");
                continue;
            };
            let using = Some(resolution.source_component.as_str())
                .filter(|id| !id.is_empty())
                .or(element.component.as_deref())
                .or(reference.source.component.as_deref())
                .unwrap_or_default();
            let path = self.leaf_path(&resolution.component, using, reference.kind.group().file_stem());
            leaves.entry(path).or_default().push(reference);
        }

        for (path, new_references) in leaves {
            if let Some(dir) = path.parent() {
                Self::ensure_dir(dir)?;
            }
            let mut merged: Vec<Reference> = read_json(&path)?.unwrap_or_default();
            for reference in new_references {
                if !merged.contains(reference) {
                    merged.push(reference.clone());
                }
            }
            write_json(&path, &merged)?;
            tracing::trace!(path = %path.display(), references = merged.len(), "wrote reference file");
        }
        Ok(())
    }

    fn report_not_searched(&mut self, skipped: &[SkippedComponent]) -> Result<()> {
        self.not_searched.extend_from_slice(skipped);
        self.write_root_file(NOT_SEARCHED_FILE, &self.not_searched)
    }

    fn report_metadata(&mut self, metadata: &SearchMetadata) -> Result<()> {
        self.write_root_file(META_FILE, metadata)
    }

    fn report_counts(&mut self, counts: &SearchCounts) -> Result<()> {
        self.write_root_file(COUNTS_FILE, counts)?;
        tracing::debug!(root = %self.root.display(), "search report written");
        Ok(())
    }
}

/// Directory name for an element id. Path separators and characters that
/// are invalid on common filesystems become `_`.
fn dir_name(id: &str) -> String {
    id.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect()
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value).map_err(|e| {
        ApiToolsError::report(
            format!("serializing {}", path.display()),
            ReportErrorKind::JsonSerializationError(e.to_string()),
        )
    })?;
    fs::write(path, content).map_err(|e| ApiToolsError::io(path, e))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|e| ApiToolsError::io(path, e))?;
    Ok(Some(serde_json::from_str(&content)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Resolution;
    use crate::model::{MemberKey, ReferenceKind, RestrictionTags, Visibility};

    fn resolved(source: MemberHandle, target: &str, member: Option<MemberKey>, kind: ReferenceKind) -> Reference {
        let mut reference = match member {
            Some(member) => Reference::to_member(source, target, member, kind),
            None => Reference::to_type(source, target, kind),
        };
        reference.resolution = Some(Resolution {
            component: "p2 (1.0.0)".into(),
            component_name: "p2".into(),
            declaring_type: target.into(),
            visibility: Visibility::Api,
            restrictions: RestrictionTags::NONE,
            type_restrictions: RestrictionTags::NONE,
            illegal: false,
            source_component: "p1 (1.0.0)".into(),
            source_visibility: Visibility::Api,
        });
        reference
    }

    #[test]
    fn test_layout_and_merge() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut reporter = DirectoryReporter::new(dir.path().join("report"));
        let main = MemberHandle::of_member("a.Main", MemberKey::new("run", "()V")).in_component("p1");

        reporter
            .report_results(
                &main,
                &[
                    resolved(main.clone(), "b.Api", None, ReferenceKind::TypeReference),
                    resolved(main.clone(), "b.Api", Some(MemberKey::new("call", "()V")), ReferenceKind::VirtualMethod),
                ],
            )
            .expect("write");
        let other = MemberHandle::of_type("a.Other").in_component("p1");
        reporter
            .report_results(&other, &[resolved(other.clone(), "b.Api", None, ReferenceKind::TypeReference)])
            .expect("write");

        let type_file = reporter.leaf_path("p2 (1.0.0)", "p1 (1.0.0)", "type_references");
        let method_file = reporter.leaf_path("p2 (1.0.0)", "p1 (1.0.0)", "method_references");
        assert!(type_file.ends_with("report/p2 (1.0.0)/p1 (1.0.0)/type_references.json"));
        assert!(type_file.exists());
        let types: Vec<Reference> = read_json(&type_file).expect("read").expect("exists");
        assert_eq!(types.len(), 2, "second element merged into the same file");
        let methods: Vec<Reference> = read_json(&method_file).expect("read").expect("exists");
        assert_eq!(methods.len(), 1);
    }

    #[test]
    fn test_no_directory_without_references() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut reporter = DirectoryReporter::new(dir.path());
        reporter
            .report_results(&MemberHandle::of_type("a.A").in_component("p1"), &[])
            .expect("write");
        assert_eq!(fs::read_dir(dir.path()).expect("list").count(), 0);
    }

    #[test]
    fn test_root_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut reporter = DirectoryReporter::new(dir.path());
        reporter.report_counts(&SearchCounts::default()).expect("counts");
        let counts: SearchCounts = read_json(&dir.path().join(COUNTS_FILE)).expect("read").expect("exists");
        assert_eq!(counts, SearchCounts::default());
    }

    #[test]
    fn test_dir_name_sanitized() {
        assert_eq!(dir_name("a/b:c"), "a_b_c");
        assert_eq!(dir_name("org.example (1.0.0)"), "org.example (1.0.0)");
    }
}
