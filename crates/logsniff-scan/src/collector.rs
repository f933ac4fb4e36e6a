//! JWalk-based input file collection.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use jwalk::WalkDir;
use tracing::{debug, warn};

use logsniff_core::{LogFile, SnifferConfig, SniffWarning, WarningKind};

/// Files resolved from a `files` directive.
#[derive(Debug, Default)]
pub struct CollectedFiles {
    /// Files to analyze, in resolution order.
    pub files: Vec<LogFile>,
    /// Entries that could not be resolved.
    pub warnings: Vec<SniffWarning>,
}

impl CollectedFiles {
    /// Check if nothing was resolved.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Resolves configured paths and directories into log files.
#[derive(Debug, Clone, Default)]
pub struct FileCollector {
    extension: Option<String>,
}

impl FileCollector {
    /// Create a collector that accepts every file found in directories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept directory entries with this extension (leading dot optional).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        let extension = extension.trim_start_matches('.');
        self.extension = (!extension.is_empty()).then(|| extension.to_string());
        self
    }

    /// Build a collector from the configuration's `file_extension`.
    pub fn from_config(config: &SnifferConfig) -> Self {
        match config.file_extension.as_deref() {
            Some(extension) => Self::new().with_extension(extension),
            None => Self::new(),
        }
    }

    /// Resolve entries in order.
    ///
    /// Directories are walked recursively in sorted order and filtered by
    /// extension; empty files inside them are skipped. Any other entry is kept
    /// as a file, even when it does not exist, so the analyzer reports it when
    /// loading fails. Each path appears once.
    pub fn collect<P: AsRef<Path>>(&self, entries: &[P]) -> CollectedFiles {
        let mut paths: IndexSet<PathBuf> = IndexSet::new();
        let mut warnings = Vec::new();

        for entry in entries {
            let entry = entry.as_ref();
            if entry.is_dir() {
                self.collect_directory(entry, &mut paths, &mut warnings);
            } else {
                paths.insert(entry.to_path_buf());
            }
        }

        debug!(count = paths.len(), "resolved input files");

        CollectedFiles {
            files: paths.into_iter().map(LogFile::new).collect(),
            warnings,
        }
    }

    fn collect_directory(
        &self,
        root: &Path,
        paths: &mut IndexSet<PathBuf>,
        warnings: &mut Vec<SniffWarning>,
    ) {
        let walker = WalkDir::new(root)
            .sort(true)
            .skip_hidden(false)
            .follow_links(false);

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(|p| p.to_path_buf()).unwrap_or_else(|| root.to_path_buf());
                    warn!("Invalid file:\t{}", path.display());
                    warnings.push(SniffWarning::for_file(
                        path,
                        err.to_string(),
                        WarningKind::UnreadableFile,
                    ));
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !self.matches_extension(&path) {
                continue;
            }

            match entry.metadata() {
                Ok(metadata) if metadata.len() > 0 => {
                    paths.insert(path);
                }
                Ok(_) => debug!(path = %path.display(), "skipping empty file"),
                Err(err) => {
                    warnings.push(SniffWarning::for_file(
                        &path,
                        err.to_string(),
                        WarningKind::UnreadableFile,
                    ));
                }
            }
        }
    }

    fn matches_extension(&self, path: &Path) -> bool {
        match &self.extension {
            None => true,
            Some(wanted) => path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy() == wanted.as_str()),
        }
    }
}
