//! Log analysis for logsniff.
//!
//! This crate runs configured metrics over log lines and collects grouped
//! results:
//!
//! - **Counting** - Count pattern occurrences, keyed by the matched text
//! - **Duplicate detection** - Report lines that repeat once volatile parts
//!   (timestamps, ids) are stripped, using BLAKE3 line fingerprints
//!
//! Results are accumulated as `group -> metric -> key -> value`, sorted per
//! metric on [`ResultStore::finalize`], and rendered as JSON.
//!
//! ```rust,ignore
//! use logsniff_analyze::{Analyzer, emit};
//! use logsniff_core::SnifferConfig;
//! use logsniff_scan::FileCollector;
//!
//! let config = SnifferConfig::from_path("config.json")?;
//! let files = config.validate_files_directive()?;
//! let mut collected = FileCollector::from_config(&config).collect(files.as_slice());
//!
//! let analyzer = Analyzer::new(&config);
//! let report = analyzer.run(&mut collected.files);
//! let results = report.finalize(analyzer.metrics());
//!
//! emit(&results, config.output_file.as_deref())?;
//! ```

mod analyzer;
pub mod features;
mod output;
mod progress;
pub mod sort;
mod store;

pub use analyzer::{AnalysisReport, Analyzer};
pub use features::{CountFeature, DuplicateFeature, Feature, FeatureKind, FingerprintTable};
pub use output::{Emitted, emit, render};
pub use progress::AnalysisProgress;
pub use store::{DEFAULT_GROUP, MetricEntries, MetricValue, ResultSet, ResultStore, sanitize};

// Re-export core types
pub use logsniff_core::{Fingerprint, LogFile, MetricDefinition, SnifferConfig};
