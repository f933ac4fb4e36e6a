//! Analysis configuration types.
//!
//! The configuration is a JSON document. It names the input files, the
//! end-of-line marker used to split them, and the list of metrics to compute.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::SniffError;

/// Platform line terminator, used when `input_log_eol_character` is absent.
#[cfg(windows)]
pub const DEFAULT_EOL: &str = "\r\n";
#[cfg(not(windows))]
pub const DEFAULT_EOL: &str = "\n";

/// A configuration value that may be given as a single item or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// View the value(s) as a slice.
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }

    /// Iterate over the value(s) in configuration order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl From<&str> for OneOrMany<String> {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<String> for OneOrMany<String> {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<&str>> for OneOrMany<String> {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for OneOrMany<String> {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

/// Which input files a metric applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawInFiles", into = "RawInFiles")]
pub enum InFiles {
    /// Every input file (`"*"`).
    #[default]
    All,
    /// Only the listed paths.
    Paths(Vec<PathBuf>),
}

impl InFiles {
    /// Restrict a metric to the given paths.
    pub fn paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::Paths(paths.into_iter().map(Into::into).collect())
    }

    /// Check whether a file is covered by this filter.
    pub fn includes(&self, path: &Path) -> bool {
        match self {
            Self::All => true,
            Self::Paths(paths) => paths.iter().any(|p| p == path),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawInFiles {
    One(String),
    Many(Vec<PathBuf>),
}

impl From<RawInFiles> for InFiles {
    fn from(raw: RawInFiles) -> Self {
        match raw {
            RawInFiles::One(value) if value == "*" => InFiles::All,
            RawInFiles::One(value) => InFiles::Paths(vec![PathBuf::from(value)]),
            RawInFiles::Many(paths) => InFiles::Paths(paths),
        }
    }
}

impl From<InFiles> for RawInFiles {
    fn from(in_files: InFiles) -> Self {
        match in_files {
            InFiles::All => RawInFiles::One("*".to_string()),
            InFiles::Paths(paths) => RawInFiles::Many(paths),
        }
    }
}

/// What a sort directive orders by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortBy {
    /// Order by key.
    Name,
    /// Order by value.
    #[default]
    Value,
}

/// How compared texts are collated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum Collation {
    /// Digit runs compare as numbers ("file2" < "file10").
    #[strum(serialize = "natural")]
    Natural,
    /// Leading numeric prefix compares as a number.
    #[strum(to_string = "number", serialize = "numeric")]
    Numeric,
    /// Plain byte-wise string order.
    #[default]
    #[strum(to_string = "string", serialize = "lexicographic")]
    Lexicographic,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Sort directive for one metric's entries.
///
/// Unrecognised values fall back to the defaults instead of failing:
/// `by` → value, `as` → lexicographic, `order` → ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSortSpec", into = "RawSortSpec")]
pub struct SortSpec {
    pub by: SortBy,
    pub collation: Collation,
    pub order: SortOrder,
}

impl SortSpec {
    /// Create a new sort directive.
    pub fn new(by: SortBy, collation: Collation, order: SortOrder) -> Self {
        Self {
            by,
            collation,
            order,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawSortSpec {
    #[serde(default)]
    by: Option<String>,
    #[serde(default, rename = "as")]
    collation: Option<String>,
    #[serde(default)]
    order: Option<String>,
}

impl From<RawSortSpec> for SortSpec {
    fn from(raw: RawSortSpec) -> Self {
        fn parse<T: std::str::FromStr + Default>(value: Option<String>) -> T {
            value.and_then(|v| v.trim().parse().ok()).unwrap_or_default()
        }

        Self {
            by: parse(raw.by),
            collation: parse(raw.collation),
            order: parse(raw.order),
        }
    }
}

impl From<SortSpec> for RawSortSpec {
    fn from(spec: SortSpec) -> Self {
        Self {
            by: Some(spec.by.to_string()),
            collation: Some(spec.collation.to_string()),
            order: Some(spec.order.to_string()),
        }
    }
}

/// One configured metric rule.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct MetricDefinition {
    /// Unique metric name; the second level of the output document.
    pub name: CompactString,

    /// Metric type, resolved to a feature through `feature_map`.
    #[serde(rename = "type")]
    pub kind: CompactString,

    /// Pattern(s) whose matches are counted.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub regex: Option<OneOrMany<String>>,

    /// Count every match in a line instead of at most one.
    #[builder(default)]
    #[serde(default, alias = "matchAll")]
    pub match_all: bool,

    /// Pattern(s) stripped from a line before duplicate comparison.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub ignore: Option<OneOrMany<String>>,

    /// Pattern(s) a repeated line must match to be reported as a duplicate.
    #[builder(default, setter(into, strip_option))]
    #[serde(default, rename = "match")]
    pub match_patterns: Option<OneOrMany<String>>,

    /// Literal substring(s) removed from the derived key.
    #[builder(default, setter(into, strip_option))]
    #[serde(default, alias = "cleanUp")]
    pub clean_up: Option<OneOrMany<String>>,

    /// Output group to nest this metric under.
    #[builder(default, setter(into, strip_option))]
    #[serde(default, alias = "groupUnder")]
    pub group_under: Option<CompactString>,

    /// Input files this metric applies to.
    #[builder(default)]
    #[serde(default, alias = "inFiles")]
    pub in_files: InFiles,

    /// Ordering applied to this metric's entries before output.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub sort: Option<SortSpec>,
}

impl MetricDefinitionBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.name {
            Some(ref name) if !name.is_empty() => {}
            _ => return Err("Metric name is required".to_string()),
        }
        match self.kind {
            Some(ref kind) if !kind.is_empty() => Ok(()),
            _ => Err("Metric type is required".to_string()),
        }
    }
}

impl MetricDefinition {
    /// Create a new metric definition builder.
    pub fn builder() -> MetricDefinitionBuilder {
        MetricDefinitionBuilder::default()
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Builder, Serialize, Deserialize)]
#[builder(setter(into), default)]
pub struct SnifferConfig {
    /// Explicit file paths and/or directories to analyze.
    #[builder(setter(into, strip_option))]
    #[serde(default)]
    pub files: Option<OneOrMany<PathBuf>>,

    /// Extension filter applied to directory contents.
    #[builder(setter(into, strip_option))]
    #[serde(default)]
    pub file_extension: Option<String>,

    /// Line separator for input logs.
    #[builder(setter(into, strip_option))]
    #[serde(default)]
    pub input_log_eol_character: Option<String>,

    /// Metric rules, evaluated in this order for every line.
    #[serde(default)]
    pub metrics: Vec<MetricDefinition>,

    /// Maps a metric `type` to a feature identifier.
    #[serde(default)]
    pub feature_map: HashMap<String, String>,

    /// Where to write the result document (stdout when absent).
    #[builder(setter(into, strip_option))]
    #[serde(default)]
    pub output_file: Option<PathBuf>,

    /// Enable log output.
    #[serde(default)]
    pub logging: bool,

    /// Also append log output to this file.
    #[builder(setter(into, strip_option))]
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Memory ceiling hint for the host (e.g. "1G").
    #[builder(setter(into, strip_option))]
    #[serde(default)]
    pub memory: Option<String>,

    /// Wall-clock ceiling in seconds for the host.
    #[builder(setter(into, strip_option))]
    #[serde(default)]
    pub max_execution_time: Option<u64>,
}

impl SnifferConfig {
    /// Create a new config builder.
    pub fn builder() -> SnifferConfigBuilder {
        SnifferConfigBuilder::default()
    }

    /// Load configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SniffError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SniffError::invalid_config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    /// Parse configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, SniffError> {
        serde_json::from_str(text).map_err(|e| SniffError::invalid_config(e.to_string()))
    }

    /// Return the `files` directive, which a run cannot start without.
    pub fn validate_files_directive(&self) -> Result<&OneOrMany<PathBuf>, SniffError> {
        self.files.as_ref().ok_or(SniffError::MissingFilesDirective)
    }

    /// Line separator to split input logs with.
    pub fn eol(&self) -> &str {
        match self.input_log_eol_character.as_deref() {
            Some(eol) if !eol.is_empty() => eol,
            _ => DEFAULT_EOL,
        }
    }

    /// Find a metric definition by name.
    pub fn metric(&self, name: &str) -> Option<&MetricDefinition> {
        self.metrics.iter().find(|m| m.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_builder() {
        let metric = MetricDefinition::builder()
            .name("errors")
            .kind("count")
            .regex("ERROR \\w+")
            .match_all(true)
            .clean_up(vec!["ERROR ", ":"])
            .build()
            .unwrap();

        assert_eq!(metric.name, "errors");
        assert!(metric.match_all);
        assert_eq!(metric.clean_up.unwrap().len(), 2);
        assert_eq!(metric.in_files, InFiles::All);
        assert!(metric.sort.is_none());
    }

    #[test]
    fn test_metric_builder_requires_name_and_type() {
        assert!(MetricDefinition::builder().kind("count").build().is_err());
        assert!(MetricDefinition::builder().name("errors").build().is_err());
        assert!(MetricDefinition::builder().name("").kind("count").build().is_err());
    }

    #[test]
    fn test_in_files_parsing() {
        let all: InFiles = serde_json::from_str("\"*\"").unwrap();
        assert_eq!(all, InFiles::All);

        let listed: InFiles = serde_json::from_str(r#"["a.log", "b.log"]"#).unwrap();
        assert!(listed.includes(Path::new("a.log")));
        assert!(!listed.includes(Path::new("c.log")));

        let single: InFiles = serde_json::from_str("\"a.log\"").unwrap();
        assert_eq!(single, InFiles::paths(["a.log"]));
    }

    #[test]
    fn test_sort_spec_parsing_with_fallbacks() {
        let spec: SortSpec =
            serde_json::from_str(r#"{"by": "value", "as": "number", "order": "desc"}"#).unwrap();
        assert_eq!(spec, SortSpec::new(SortBy::Value, Collation::Numeric, SortOrder::Desc));

        let spec: SortSpec = serde_json::from_str(r#"{"by": "name", "as": "natural"}"#).unwrap();
        assert_eq!(spec.by, SortBy::Name);
        assert_eq!(spec.collation, Collation::Natural);
        assert_eq!(spec.order, SortOrder::Asc);

        let spec: SortSpec =
            serde_json::from_str(r#"{"by": "size", "as": "weird", "order": "sideways"}"#).unwrap();
        assert_eq!(spec, SortSpec::default());
    }

    #[test]
    fn test_config_from_json() {
        let config = SnifferConfig::from_json_str(
            r#"{
                "files": ["/var/log/app"],
                "file_extension": "log",
                "feature_map": {"count": "GetCount"},
                "logging": true,
                "metrics": [
                    {"name": "errors", "type": "count", "regex": "ERROR", "in_files": "*"},
                    {"name": "dups", "type": "duplicate", "ignore": ["/^\\d+/"], "groupUnder": "errors"}
                ],
                "unknown_key": 42
            }"#,
        )
        .unwrap();

        assert_eq!(config.metrics.len(), 2);
        assert_eq!(config.validate_files_directive().unwrap().len(), 1);
        assert_eq!(config.feature_map["count"], "GetCount");
        assert_eq!(config.metric("dups").unwrap().group_under.as_deref(), Some("errors"));
        assert_eq!(config.eol(), DEFAULT_EOL);
    }

    #[test]
    fn test_missing_files_directive() {
        let config = SnifferConfig::from_json_str(r#"{"metrics": []}"#).unwrap();
        assert!(matches!(
            config.validate_files_directive(),
            Err(SniffError::MissingFilesDirective)
        ));
    }

    #[test]
    fn test_malformed_config() {
        assert!(matches!(
            SnifferConfig::from_json_str("{not json"),
            Err(SniffError::InvalidConfig { .. })
        ));
        assert!(matches!(
            SnifferConfig::from_path("/nonexistent/config.json"),
            Err(SniffError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_custom_eol() {
        let config = SnifferConfig::builder()
            .input_log_eol_character("||")
            .build()
            .unwrap();
        assert_eq!(config.eol(), "||");

        let config = SnifferConfig::builder()
            .input_log_eol_character("")
            .build()
            .unwrap();
        assert_eq!(config.eol(), DEFAULT_EOL);
    }
}
