//! Pattern occurrence counting.

use std::path::Path;

use regex::Regex;

use logsniff_core::{MetricDefinition, SniffError, pattern};

use super::{MetricScope, clean_key};
use crate::store::{MetricValue, ResultStore};

/// Counts how often a pattern occurs, keyed by the matched text.
///
/// The key comes from the first match in the line: its first capture group
/// when the pattern has one, otherwise the whole match, with `clean_up`
/// substrings removed. With `match_all` the increment is the number of
/// matches in the line, all folded into that first match's key.
#[derive(Debug)]
pub struct CountFeature {
    scope: MetricScope,
    patterns: Vec<Regex>,
    match_all: bool,
    clean_up: Vec<String>,
}

impl CountFeature {
    /// Compile a count metric.
    pub fn from_definition(metric: &MetricDefinition) -> Result<Self, SniffError> {
        let patterns = match &metric.regex {
            Some(regex) if !regex.is_empty() => pattern::compile_all(&metric.name, regex)?,
            _ => {
                return Err(SniffError::MissingRegex {
                    metric: metric.name.clone(),
                });
            }
        };

        Ok(Self {
            scope: MetricScope::of(metric),
            patterns,
            match_all: metric.match_all,
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

    /// Match count and key for a line, or `None` when nothing matches.
    ///
    /// Patterns are tried in order; the first one that matches decides.
    pub fn evaluate(&self, line: &str) -> Option<(u64, String)> {
        self.patterns.iter().find_map(|re| {
            let captures = re.captures(line)?;
            let matched = captures
                .get(1)
                .or_else(|| captures.get(0))
                .map_or("", |m| m.as_str());
            let occurrences = if self.match_all {
                re.find_iter(line).count() as u64
            } else {
                1
            };
            Some((occurrences, clean_key(matched, &self.clean_up)))
        })
    }

    /// Add this line's occurrences to the store.
    pub fn apply(&self, line: &str, path: &Path, store: &mut ResultStore) {
        if !self.scope.includes(path) {
            return;
        }
        let Some((occurrences, key)) = self.evaluate(line) else {
            return;
        };

        let group = self.scope.group();
        let current = store.count(group, &self.scope.name, &key);
        store.set(group, &self.scope.name, &key, MetricValue::Count(current + occurrences));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logsniff_core::InFiles;

    use crate::store::DEFAULT_GROUP;

    fn feature(json: &str) -> CountFeature {
        let metric: MetricDefinition = serde_json::from_str(json).unwrap();
        CountFeature::from_definition(&metric).unwrap()
    }

    #[test]
    fn test_single_match_per_line() {
        let feature = feature(r#"{"name": "errors", "type": "count", "regex": "ERROR \\w+"}"#);
        let mut store = ResultStore::new();
        let path = Path::new("app.log");

        feature.apply("ERROR disk ERROR disk", path, &mut store);
        feature.apply("ERROR disk", path, &mut store);
        feature.apply("INFO ok", path, &mut store);

        assert_eq!(store.count(None, "errors", "ERROR disk"), 2);
        assert_eq!(store.entry_count(), 1);
    }

    #[test]
    fn test_match_all_counts_every_occurrence() {
        let feature = feature(r#"{"name": "x", "type": "count", "regex": "X", "match_all": true}"#);
        let mut store = ResultStore::new();

        feature.apply("X and X and X", Path::new("a.log"), &mut store);

        assert_eq!(store.count(None, "x", "X"), 3);
    }

    #[test]
    fn test_match_all_folds_into_first_match_key() {
        let feature = feature(r#"{"name": "codes", "type": "count", "regex": "E\\d+", "match_all": true}"#);

        assert_eq!(feature.evaluate("E1 then E2"), Some((2, "E1".to_string())));
    }

    #[test]
    fn test_capture_group_and_clean_up() {
        let feature = feature(
            r#"{"name": "users", "type": "count", "regex": "/user=(\\S+)/", "clean_up": ["@example.com"]}"#,
        );

        assert_eq!(
            feature.evaluate("login user=bob@example.com ok"),
            Some((1, "bob".to_string()))
        );
    }

    #[test]
    fn test_pattern_list_first_match_wins() {
        let feature = feature(r#"{"name": "level", "type": "count", "regex": ["WARN", "ERROR|WARN"]}"#);

        assert_eq!(feature.evaluate("ERROR then WARN"), Some((1, "WARN".to_string())));
        assert_eq!(feature.evaluate("ERROR only"), Some((1, "ERROR".to_string())));
        assert_eq!(feature.evaluate("INFO"), None);
    }

    #[test]
    fn test_in_files_and_group() {
        let metric = MetricDefinition::builder()
            .name("errors")
            .kind("count")
            .regex("ERROR")
            .group_under("web")
            .in_files(InFiles::paths(["web.log"]))
            .build()
            .unwrap();
        let feature = CountFeature::from_definition(&metric).unwrap();
        let mut store = ResultStore::new();

        feature.apply("ERROR", Path::new("db.log"), &mut store);
        assert!(store.is_empty());

        feature.apply("ERROR", Path::new("web.log"), &mut store);
        assert_eq!(store.count(Some("web"), "errors", "ERROR"), 1);
        assert!(store.metric(Some(DEFAULT_GROUP), "errors").is_none());
    }

    #[test]
    fn test_missing_regex_is_rejected() {
        let metric = MetricDefinition::builder().name("errors").kind("count").build().unwrap();
        assert!(matches!(
            CountFeature::from_definition(&metric),
            Err(SniffError::MissingRegex { .. })
        ));
    }
}
