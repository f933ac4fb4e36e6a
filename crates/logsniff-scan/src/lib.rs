//! Input file resolution for logsniff.
//!
//! Turns the configuration's `files` directive (explicit paths and/or
//! directories) into an ordered list of [`LogFile`] handles. Directories are
//! walked with jwalk and filtered by `file_extension`.
//!
//! # Example
//!
//! ```rust,no_run
//! use logsniff_scan::FileCollector;
//!
//! let collector = FileCollector::new().with_extension("log");
//! let collected = collector.collect(&["/var/log/app"]);
//!
//! println!("{} files to analyze", collected.files.len());
//! ```

mod collector;

pub use collector::{CollectedFiles, FileCollector};

// Re-export core types for convenience
pub use logsniff_core::{LogFile, SniffWarning, WarningKind};
