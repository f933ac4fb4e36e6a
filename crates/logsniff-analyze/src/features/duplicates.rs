//! Near-duplicate line detection using line fingerprints.
//!
//! A line is normalized by removing every `ignore` pattern (timestamps,
//! request ids and the like) and fingerprinted with BLAKE3. The first raw line
//! seen for a fingerprint is remembered. A later line with the same
//! fingerprint that passes the `match` predicate and differs textually from
//! that first line is reported: the result list for its key is seeded with the
//! first line and the new line is appended.
//!
//! A later line that is byte-for-byte identical to the remembered first line
//! is *not* reported. Only textually different lines that normalize to the
//! same fingerprint show up in the output.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use regex::Regex;

use logsniff_core::{Fingerprint, MetricDefinition, SniffError, pattern};

use super::{MetricScope, clean_key};
use crate::store::ResultStore;

/// First raw line observed for each fingerprint.
///
/// Owned by one analysis run; a new run starts with an empty table.
#[derive(Debug, Default)]
pub struct FingerprintTable {
    first_seen: HashMap<Fingerprint, String>,
}

impl FingerprintTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The first line recorded for a fingerprint.
    pub fn first_line(&self, fingerprint: &Fingerprint) -> Option<&str> {
        self.first_seen.get(fingerprint).map(String::as_str)
    }

    /// Remember `line` as the first occurrence of `fingerprint`.
    ///
    /// Returns `false` (and keeps the existing line) if one was already recorded.
    pub fn record(&mut self, fingerprint: Fingerprint, line: &str) -> bool {
        if self.first_seen.contains_key(&fingerprint) {
            return false;
        }
        self.first_seen.insert(fingerprint, line.to_string());
        true
    }
}

/// Reports lines that repeat after normalization.
#[derive(Debug)]
pub struct DuplicateFeature {
    scope: MetricScope,
    ignore: Vec<Regex>,
    match_patterns: Option<Vec<Regex>>,
    clean_up: Vec<String>,
}

impl DuplicateFeature {
    /// Compile a duplicate metric.
    pub fn from_definition(metric: &MetricDefinition) -> Result<Self, SniffError> {
        let ignore = match &metric.ignore {
            Some(patterns) => pattern::compile_all(&metric.name, patterns)?,
            None => Vec::new(),
        };
        let match_patterns = metric
            .match_patterns
            .as_ref()
            .map(|patterns| pattern::compile_all(&metric.name, patterns))
            .transpose()?;

        Ok(Self {
            scope: MetricScope::of(metric),
            ignore,
            match_patterns,
            clean_up: metric
                .clean_up
                .as_ref()
                .map(|c| c.as_slice().to_vec())
                .unwrap_or_default(),
        })
    }

    /// Scope of this metric.
    pub fn scope(&self) -> &MetricScope {
        &self.scope
    }

    /// Remove every `ignore` pattern from a line, in order.
    pub fn normalize<'a>(&self, line: &'a str) -> Cow<'a, str> {
        let mut cleaned = Cow::Borrowed(line);
        for re in &self.ignore {
            let replaced = match re.replace_all(&cleaned, "") {
                Cow::Borrowed(_) => None,
                Cow::Owned(text) => Some(text),
            };
            if let Some(text) = replaced {
                cleaned = Cow::Owned(text);
            }
        }
        cleaned
    }

    /// Check the `match` predicate: passes when absent or when any pattern matches.
    pub fn matches(&self, line: &str) -> bool {
        self.match_patterns
            .as_ref()
            .is_none_or(|patterns| patterns.iter().any(|re| re.is_match(line)))
    }

    /// Output key for a normalized line.
    pub fn key_for(&self, normalized: &str) -> String {
        Fingerprint::of(&clean_key(normalized, &self.clean_up)).to_hex()
    }

    /// Record or report this line.
    pub fn apply(
        &self,
        line: &str,
        path: &Path,
        store: &mut ResultStore,
        fingerprints: &mut FingerprintTable,
    ) {
        if !self.scope.includes(path) {
            return;
        }

        let normalized = self.normalize(line);
        let fingerprint = Fingerprint::of(&normalized);

        let Some(first_line) = fingerprints.first_line(&fingerprint) else {
            fingerprints.record(fingerprint, line);
            return;
        };

        if !self.matches(line) || first_line == line {
            return;
        }

        let key = self.key_for(&normalized);
        let Some(lines) = store.lines_mut(self.scope.group(), &self.scope.name, &key) else {
            return;
        };
        if lines.is_empty() {
            lines.push(first_line.to_string());
        }
        lines.push(line.to_string());
    }
}
