//! Error and warning types for configuration loading and analysis.

use std::path::PathBuf;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading configuration or reading input.
#[derive(Debug, Error)]
pub enum SniffError {
    /// Configuration is unreadable or malformed.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Configuration has no `files` entry.
    #[error("Configuration has no `files` directive")]
    MissingFilesDirective,

    /// A log file could not be read.
    #[error("Invalid file: {path}: {source}")]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A log file exists but has no content.
    #[error("Invalid file: {path} is empty")]
    EmptyFile { path: PathBuf },

    /// No input files were resolved.
    #[error("No valid input files have been found!")]
    NoInputFiles,

    /// A metric pattern failed to compile.
    #[error("Invalid pattern {pattern:?} in metric '{metric}': {source}")]
    InvalidPattern {
        metric: CompactString,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A count metric was configured without any regex.
    #[error("Metric '{metric}' has no regex")]
    MissingRegex { metric: CompactString },

    /// The result document could not be serialized.
    #[error("Could not render results: {0}")]
    Render(#[from] serde_json::Error),

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SniffError {
    /// Create an error for a log file that failed to load.
    pub fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::UnreadableFile {
            path: path.into(),
            source,
        }
    }

    /// Create an error for an unreadable or malformed configuration.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Kind of analysis warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Log file could not be read.
    UnreadableFile,
    /// Log file had no content.
    EmptyFile,
    /// Metric type does not resolve to a feature.
    UnknownFeature,
    /// Metric pattern failed to compile.
    InvalidPattern,
    /// Count metric without a regex.
    MissingRegex,
    /// `group_under` does not name a configured metric.
    UnknownGroup,
    /// Nothing to analyze.
    NoInputFiles,
}

/// Non-fatal condition encountered while loading metrics or analyzing files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SniffWarning {
    /// File the warning relates to, if any.
    pub path: Option<PathBuf>,
    /// Metric the warning relates to, if any.
    pub metric: Option<CompactString>,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl SniffWarning {
    /// Create a warning attached to a metric.
    pub fn for_metric(
        metric: impl Into<CompactString>,
        message: impl Into<String>,
        kind: WarningKind,
    ) -> Self {
        Self {
            path: None,
            metric: Some(metric.into()),
            message: message.into(),
            kind,
        }
    }

    /// Create a warning attached to a file.
    pub fn for_file(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: Some(path.into()),
            metric: None,
            message: message.into(),
            kind,
        }
    }

    /// Create a warning from a failed file load.
    pub fn from_load_error(path: impl Into<PathBuf>, error: &SniffError) -> Self {
        let kind = match error {
            SniffError::EmptyFile { .. } => WarningKind::EmptyFile,
            _ => WarningKind::UnreadableFile,
        };
        Self::for_file(path, error.to_string(), kind)
    }

    /// Create the warning recorded when there is nothing to analyze.
    pub fn no_input_files() -> Self {
        Self {
            path: None,
            metric: None,
            message: SniffError::NoInputFiles.to_string(),
            kind: WarningKind::NoInputFiles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_maps_to_warning_kind() {
        let empty = SniffError::EmptyFile {
            path: "/var/log/empty.log".into(),
        };
        let warning = SniffWarning::from_load_error("/var/log/empty.log", &empty);
        assert_eq!(warning.kind, WarningKind::EmptyFile);

        let missing = SniffError::unreadable(
            "/var/log/missing.log",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let warning = SniffWarning::from_load_error("/var/log/missing.log", &missing);
        assert_eq!(warning.kind, WarningKind::UnreadableFile);
        assert!(warning.message.starts_with("Invalid file"));
    }

    #[test]
    fn test_metric_warning_creation() {
        let warning = SniffWarning::for_metric("errors", "no regex", WarningKind::MissingRegex);
        assert_eq!(warning.metric.as_deref(), Some("errors"));
        assert!(warning.path.is_none());
    }
}
