//! Grouped result accumulator.
//!
//! Results are addressed by `(group, metric, key)`. All three identifiers are
//! sanitized (backslashes and double quotes removed) before use, and a missing
//! or empty group falls back to [`DEFAULT_GROUP`]. Every level keeps insertion
//! order, which is also the output order for metrics without a sort directive.

use std::borrow::Cow;
use std::cmp::Ordering;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use logsniff_core::{Collation, MetricDefinition, SortBy, SortOrder, SortSpec};

use crate::sort::compare_text;

/// Group used for metrics without `group_under`.
pub const DEFAULT_GROUP: &str = "Default Metric Group";

/// Value stored under one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Occurrence count (count metrics).
    Count(u64),
    /// Raw lines sharing a fingerprint, first occurrence first (duplicate metrics).
    Lines(Vec<String>),
}

impl MetricValue {
    /// Get the count, if this is a count value.
    pub fn as_count(&self) -> Option<u64> {
        match self {
            Self::Count(n) => Some(*n),
            Self::Lines(_) => None,
        }
    }

    /// Get the lines, if this is a line list.
    pub fn as_lines(&self) -> Option<&[String]> {
        match self {
            Self::Lines(lines) => Some(lines),
            Self::Count(_) => None,
        }
    }

    /// Compare two values under a collation.
    ///
    /// Counts compare as numbers or as their decimal text; line lists compare
    /// by length (numeric) or by their first line.
    pub fn compare(&self, other: &Self, collation: Collation) -> Ordering {
        match collation {
            Collation::Numeric => self.sort_number().total_cmp(&other.sort_number()),
            _ => compare_text(&self.sort_text(), &other.sort_text(), collation),
        }
    }

    fn sort_number(&self) -> f64 {
        match self {
            Self::Count(n) => *n as f64,
            Self::Lines(lines) => lines.len() as f64,
        }
    }

    fn sort_text(&self) -> Cow<'_, str> {
        match self {
            Self::Count(n) => Cow::Owned(n.to_string()),
            Self::Lines(lines) => Cow::Borrowed(lines.first().map_or("", String::as_str)),
        }
    }
}

/// Entries of one metric, keyed by aggregation key.
pub type MetricEntries = IndexMap<String, MetricValue>;

type Groups = IndexMap<String, IndexMap<String, MetricEntries>>;

/// Remove characters that would need escaping in the output document.
pub fn sanitize(text: &str) -> Cow<'_, str> {
    if text.contains(['\\', '"']) {
        Cow::Owned(text.chars().filter(|c| !matches!(c, '\\' | '"')).collect())
    } else {
        Cow::Borrowed(text)
    }
}

fn group_name(group: Option<&str>) -> Cow<'_, str> {
    match group.map(sanitize) {
        Some(name) if !name.is_empty() => name,
        _ => Cow::Borrowed(DEFAULT_GROUP),
    }
}

/// Accumulator for `group -> metric -> key -> value`.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    groups: Groups,
}

impl ResultStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value.
    pub fn get(&self, group: Option<&str>, metric: &str, key: &str) -> Option<&MetricValue> {
        self.metric(group, metric)?.get(&*sanitize(key))
    }

    /// Current count for a key; 0 when missing or not a count.
    pub fn count(&self, group: Option<&str>, metric: &str, key: &str) -> u64 {
        self.get(group, metric, key)
            .and_then(MetricValue::as_count)
            .unwrap_or(0)
    }

    /// Current line list for a key; empty when missing or not a list.
    pub fn lines(&self, group: Option<&str>, metric: &str, key: &str) -> &[String] {
        self.get(group, metric, key)
            .and_then(MetricValue::as_lines)
            .unwrap_or(&[])
    }

    /// Store a value, replacing any previous value in place.
    pub fn set(&mut self, group: Option<&str>, metric: &str, key: &str, value: MetricValue) {
        self.entries_mut(group, metric)
            .insert(sanitize(key).into_owned(), value);
    }

    /// Mutable line list for a key, created empty when missing.
    ///
    /// Returns `None` when the key already holds a count.
    pub fn lines_mut(
        &mut self,
        group: Option<&str>,
        metric: &str,
        key: &str,
    ) -> Option<&mut Vec<String>> {
        let slot = self
            .entries_mut(group, metric)
            .entry(sanitize(key).into_owned())
            .or_insert_with(|| MetricValue::Lines(Vec::new()));
        match slot {
            MetricValue::Lines(lines) => Some(lines),
            MetricValue::Count(_) => None,
        }
    }

    /// All entries of one metric.
    pub fn metric(&self, group: Option<&str>, metric: &str) -> Option<&MetricEntries> {
        self.groups
            .get(&*group_name(group))?
            .get(&*sanitize(metric))
    }

    /// Names of the groups holding results, in insertion order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Check if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of keys across all groups and metrics.
    pub fn entry_count(&self) -> usize {
        self.groups
            .values()
            .flat_map(IndexMap::values)
            .map(IndexMap::len)
            .sum()
    }

    /// Apply each metric's sort directive and produce the output mapping.
    ///
    /// Directives are looked up by metric name in `metrics`; metrics without
    /// one keep insertion order. Ties keep insertion order in both directions.
    pub fn finalize(self, metrics: &[MetricDefinition]) -> ResultSet {
        let groups = self
            .groups
            .into_iter()
            .map(|(group, group_metrics)| {
                let group_metrics = group_metrics
                    .into_iter()
                    .map(|(name, entries)| {
                        let entries = match sort_directive(metrics, &name) {
                            Some(spec) => sort_entries(entries, spec),
                            None => entries,
                        };
                        (name, entries)
                    })
                    .collect();
                (group, group_metrics)
            })
            .collect();

        ResultSet { groups }
    }

    fn entries_mut(&mut self, group: Option<&str>, metric: &str) -> &mut MetricEntries {
        self.groups
            .entry(group_name(group).into_owned())
            .or_default()
            .entry(sanitize(metric).into_owned())
            .or_default()
    }
}

fn sort_directive(metrics: &[MetricDefinition], name: &str) -> Option<SortSpec> {
    metrics
        .iter()
        .find(|m| sanitize(&m.name) == name)
        .and_then(|m| m.sort)
}

fn sort_entries(entries: MetricEntries, spec: SortSpec) -> MetricEntries {
    entries
        .into_iter()
        .sorted_by(|(key_a, value_a), (key_b, value_b)| {
            let ordering = match spec.by {
                SortBy::Name => compare_text(key_a, key_b, spec.collation),
                SortBy::Value => value_a.compare(value_b, spec.collation),
            };
            match spec.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        })
        .collect()
}

/// Finalized, ordered results ready for serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    groups: Groups,
}

impl ResultSet {
    /// Check if there is nothing to output.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Entries of one metric in output order.
    pub fn metric(&self, group: &str, metric: &str) -> Option<&MetricEntries> {
        self.groups.get(group)?.get(metric)
    }
}
