//! Line-analysis strategies.
//!
//! Each configured metric is resolved once, when the analyzer is built, into a
//! [`Feature`]: a closed set of strategies keyed by [`FeatureKind`]. Resolving
//! up front means unknown types are reported as load warnings instead of being
//! looked up again for every line.

mod count;
mod duplicates;

use std::path::Path;

use compact_str::CompactString;
use strum::{Display, EnumString};
use tracing::warn;

use logsniff_core::{InFiles, MetricDefinition, SnifferConfig, SniffError, SniffWarning, WarningKind};

use crate::store::ResultStore;

pub use count::CountFeature;
pub use duplicates::{DuplicateFeature, FingerprintTable};

/// Identifiers a metric `type` can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum FeatureKind {
    /// Count pattern occurrences.
    #[strum(to_string = "GetCount", serialize = "count")]
    Count,
    /// Report lines that repeat after normalization.
    #[strum(
        to_string = "FindDuplicates",
        serialize = "duplicate",
        serialize = "duplicates"
    )]
    Duplicate,
}

impl FeatureKind {
    /// Resolve a metric type through the feature map.
    ///
    /// A type missing from the map is parsed as an identifier itself.
    pub fn resolve(config: &SnifferConfig, metric_type: &str) -> Option<Self> {
        let identifier = config
            .feature_map
            .get(metric_type)
            .map_or(metric_type, String::as_str);
        identifier.trim().parse().ok()
    }
}

/// Where a metric's results go and which files it reads.
#[derive(Debug, Clone)]
pub struct MetricScope {
    /// Metric name (second output level).
    pub name: CompactString,
    /// Output group; `None` means the default group.
    pub group: Option<CompactString>,
    /// File filter.
    pub in_files: InFiles,
}

impl MetricScope {
    /// Scope of a metric definition.
    pub fn of(metric: &MetricDefinition) -> Self {
        Self {
            name: metric.name.clone(),
            group: metric.group_under.clone().filter(|g| !g.is_empty()),
            in_files: metric.in_files.clone(),
        }
    }

    /// Check whether lines of this file are analyzed.
    pub fn includes(&self, path: &Path) -> bool {
        self.in_files.includes(path)
    }

    pub(crate) fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }
}

/// A resolved metric strategy.
#[derive(Debug)]
pub enum Feature {
    Count(CountFeature),
    Duplicate(DuplicateFeature),
}

impl Feature {
    /// Build the strategy for a metric.
    pub fn build(kind: FeatureKind, metric: &MetricDefinition) -> Result<Self, SniffError> {
        match kind {
            FeatureKind::Count => CountFeature::from_definition(metric).map(Self::Count),
            FeatureKind::Duplicate => DuplicateFeature::from_definition(metric).map(Self::Duplicate),
        }
    }

    /// Scope of the underlying metric.
    pub fn scope(&self) -> &MetricScope {
        match self {
            Self::Count(feature) => feature.scope(),
            Self::Duplicate(feature) => feature.scope(),
        }
    }

    /// Analyze one line.
    ///
    /// `fingerprints` is this metric's table slot for the current run. Only
    /// duplicate metrics fill it, on their first line.
    pub fn apply(
        &self,
        line: &str,
        path: &Path,
        store: &mut ResultStore,
        fingerprints: &mut Option<FingerprintTable>,
    ) {
        match self {
            Self::Count(feature) => feature.apply(line, path, store),
            Self::Duplicate(feature) => {
                let table = fingerprints.get_or_insert_with(FingerprintTable::new);
                feature.apply(line, path, store, table);
            }
        }
    }
}

/// Resolve every configured metric, in configuration order.
///
/// Metrics that cannot be resolved are skipped and reported as warnings.
pub fn resolve_features(config: &SnifferConfig) -> (Vec<Feature>, Vec<SniffWarning>) {
    let mut features = Vec::with_capacity(config.metrics.len());
    let mut warnings = Vec::new();

    for metric in &config.metrics {
        let Some(kind) = FeatureKind::resolve(config, &metric.kind) else {
            warn!(metric = %metric.name, "Unknown metric type '{}', skipping", metric.kind);
            warnings.push(SniffWarning::for_metric(
                metric.name.clone(),
                format!("Unknown metric type '{}'", metric.kind),
                WarningKind::UnknownFeature,
            ));
            continue;
        };

        if let Some(group) = metric.group_under.as_deref().filter(|g| !g.is_empty())
            && config.metric(group).is_none()
        {
            warn!(metric = %metric.name, "group_under '{group}' does not name a configured metric");
            warnings.push(SniffWarning::for_metric(
                metric.name.clone(),
                format!("group_under '{group}' does not name a configured metric"),
                WarningKind::UnknownGroup,
            ));
        }

        match Feature::build(kind, metric) {
            Ok(feature) => features.push(feature),
            Err(err) => {
                warn!(metric = %metric.name, "{err}, skipping");
                let kind = match err {
                    SniffError::MissingRegex { .. } => WarningKind::MissingRegex,
                    _ => WarningKind::InvalidPattern,
                };
                warnings.push(SniffWarning::for_metric(metric.name.clone(), err.to_string(), kind));
            }
        }
    }

    (features, warnings)
}

/// Remove every `clean_up` substring from a key, in order.
pub(crate) fn clean_key(key: &str, clean_up: &[String]) -> String {
    clean_up
        .iter()
        .filter(|needle| !needle.is_empty())
        .fold(key.to_string(), |key, needle| key.replace(needle.as_str(), ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(json: &str) -> SnifferConfig {
        SnifferConfig::from_json_str(json).unwrap()
    }

    #[test]
    fn test_feature_kind_resolution() {
        let config = config(r#"{"feature_map": {"count": "GetCount", "dup": "FindDuplicates", "odd": "Nope"}}"#);

        assert_eq!(FeatureKind::resolve(&config, "count"), Some(FeatureKind::Count));
        assert_eq!(FeatureKind::resolve(&config, "dup"), Some(FeatureKind::Duplicate));
        assert_eq!(FeatureKind::resolve(&config, "odd"), None);
        // Not in the map: the type itself is the identifier.
        assert_eq!(FeatureKind::resolve(&config, "duplicate"), Some(FeatureKind::Duplicate));
        assert_eq!(FeatureKind::resolve(&config, "histogram"), None);
    }

    #[test]
    fn test_resolve_skips_unusable_metrics() {
        let config = config(
            r#"{"metrics": [
                {"name": "ok", "type": "count", "regex": "x"},
                {"name": "unknown", "type": "histogram"},
                {"name": "no_regex", "type": "count"},
                {"name": "bad_regex", "type": "count", "regex": "(x"},
                {"name": "dups", "type": "duplicate", "group_under": "missing"}
            ]}"#,
        );

        let (features, warnings) = resolve_features(&config);

        let names: Vec<&str> = features.iter().map(|f| f.scope().name.as_str()).collect();
        assert_eq!(names, vec!["ok", "dups"]);

        let kinds: Vec<WarningKind> = warnings.iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![
                WarningKind::UnknownFeature,
                WarningKind::MissingRegex,
                WarningKind::InvalidPattern,
                WarningKind::UnknownGroup,
            ]
        );
    }

    #[test]
    fn test_only_duplicate_metrics_hold_a_fingerprint_table() {
        let config = config(
            r#"{"metrics": [
                {"name": "errors", "type": "count", "regex": "ERROR"},
                {"name": "dups", "type": "duplicate"}
            ]}"#,
        );
        let (features, _) = resolve_features(&config);
        let mut store = ResultStore::new();
        let mut tables: Vec<Option<FingerprintTable>> = vec![None, None];

        for (feature, table) in features.iter().zip(tables.iter_mut()) {
            feature.apply("ERROR disk", Path::new("a.log"), &mut store, table);
        }

        assert!(tables[0].is_none());
        let dups = tables[1].as_ref().unwrap();
        assert_eq!(dups.first_line(&logsniff_core::Fingerprint::of("ERROR disk")), Some("ERROR disk"));
        assert_eq!(store.count(None, "errors", "ERROR"), 1);
    }

    #[test]
    fn test_clean_key() {
        let clean_up = vec!["ERROR ".to_string(), ":".to_string(), String::new()];
        assert_eq!(clean_key("ERROR disk: full", &clean_up), "disk full");
    }
}
