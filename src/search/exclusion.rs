//! Exclusion lists.
//!
//! Entries are matched against component symbolic names:
//!
//! - plain text: exact match
//! - `R:<regex>`: regular expression, anchored at both ends
//! - text containing `*` or `?`: glob, anchored
//!
//! Entries that do not compile are skipped with a warning; the rest of the
//! list still applies.

use crate::error::{ApiToolsError, Result};
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

const REGEX_PREFIX: &str = "R:";

/// A parsed exclusion list.
#[derive(Debug, Clone, Default)]
pub struct ExclusionList {
    exact: HashSet<String>,
    patterns: Vec<Regex>,
    skipped: Vec<String>,
}

impl ExclusionList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from entries, skipping malformed ones.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for entry in entries {
            list.add(entry.as_ref());
        }
        list
    }

    /// Parse exclusion file content. `#` comments and blank lines are ignored.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        Self::from_entries(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ApiToolsError::io(path, e))?;
        let list = Self::parse(&content);
        tracing::debug!(
            path = %path.display(),
            entries = list.len(),
            skipped = list.skipped.len(),
            "loaded exclusion list"
        );
        Ok(list)
    }

    /// Add one entry. Returns false when the entry was malformed and skipped.
    pub fn add(&mut self, entry: &str) -> bool {
        let entry = entry.trim();
        if entry.is_empty() {
            return false;
        }
        let pattern = if let Some(regex) = entry.strip_prefix(REGEX_PREFIX) {
            format!("^(?:{regex})$")
        } else if entry.contains(['*', '?']) {
            glob_to_regex(entry)
        } else {
            self.exact.insert(entry.to_string());
            return true;
        };
        match Regex::new(&pattern) {
            Ok(regex) => {
                self.patterns.push(regex);
                true
            }
            Err(err) => {
                tracing::warn!(entry, error = %err, "skipping malformed exclusion entry");
                self.skipped.push(entry.to_string());
                false
            }
        }
    }

    #[must_use]
    pub fn is_excluded(&self, id: &str) -> bool {
        self.exact.contains(id) || self.patterns.iter().any(|p| p.is_match(id))
    }

    /// Number of usable entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.exact.len() + self.patterns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries that were skipped as malformed.
    #[must_use]
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }
}

fn glob_to_regex(glob: &str) -> String {
    let mut pattern = String::with_capacity(glob.len() + 8);
    pattern.push('^');
    for ch in glob.chars() {
        match ch {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            other => pattern.push_str(&regex::escape(&other.to_string())),
        }
    }
    pattern.push('$');
    pattern
}
