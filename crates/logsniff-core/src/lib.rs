//! Core types and configuration for logsniff.
//!
//! This crate provides the data model shared by the scanning and analysis
//! crates: the configuration document, metric definitions, log file handles,
//! line fingerprints and error types.

mod config;
mod error;
mod file;
mod fingerprint;
pub mod pattern;

pub use config::{
    Collation, DEFAULT_EOL, InFiles, MetricDefinition, MetricDefinitionBuilder, OneOrMany,
    SnifferConfig, SnifferConfigBuilder, SortBy, SortOrder, SortSpec,
};
pub use error::{SniffError, SniffWarning, WarningKind};
pub use file::LogFile;
pub use fingerprint::Fingerprint;
