//! Sequential analysis driver.

use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use logsniff_core::{LogFile, MetricDefinition, SnifferConfig, SniffWarning};

use crate::features::{Feature, FingerprintTable, resolve_features};
use crate::progress::{AnalysisProgress, ProgressTracker};
use crate::store::{ResultSet, ResultStore};

/// Outcome of one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// Accumulated, not yet sorted results.
    pub results: ResultStore,
    /// Load-time and run-time warnings, in the order they occurred.
    pub warnings: Vec<SniffWarning>,
    /// Files whose lines were analyzed.
    pub files_analyzed: u64,
    /// Files that could not be loaded.
    pub files_skipped: u64,
    /// Lines analyzed across all files.
    pub lines_processed: u64,
    /// Bytes of log content read.
    pub bytes_read: u64,
    /// Wall-clock duration of the run.
    pub duration: Duration,
}

impl AnalysisReport {
    /// Apply sort directives and produce the output mapping.
    pub fn finalize(self, metrics: &[MetricDefinition]) -> ResultSet {
        self.results.finalize(metrics)
    }

    /// Check if any warnings were recorded.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Runs every configured metric over every line of every file.
///
/// Files are processed in the order given, lines in file order, and for each
/// line the metrics in configuration order. Each file's content is released
/// as soon as its last line has been analyzed.
pub struct Analyzer {
    features: Vec<Feature>,
    metrics: Vec<MetricDefinition>,
    load_warnings: Vec<SniffWarning>,
    eol: String,
    progress_tx: broadcast::Sender<AnalysisProgress>,
}

impl Analyzer {
    /// Resolve the configured metrics.
    ///
    /// Metrics that cannot be used are dropped and reported through
    /// [`Analyzer::warnings`].
    pub fn new(config: &SnifferConfig) -> Self {
        let (features, load_warnings) = resolve_features(config);
        let (progress_tx, _) = broadcast::channel(100);

        debug!(
            metrics = config.metrics.len(),
            resolved = features.len(),
            "Resolved metric features"
        );

        Self {
            features,
            metrics: config.metrics.clone(),
            load_warnings,
            eol: config.eol().to_string(),
            progress_tx,
        }
    }

    /// Subscribe to progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<AnalysisProgress> {
        self.progress_tx.subscribe()
    }

    /// Warnings produced while resolving metrics.
    pub fn warnings(&self) -> &[SniffWarning] {
        &self.load_warnings
    }

    /// Metric definitions, used to look up sort directives.
    pub fn metrics(&self) -> &[MetricDefinition] {
        &self.metrics
    }

    /// Number of metrics that will be applied.
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Analyze the files.
    ///
    /// Every call starts from an empty result store and empty fingerprint
    /// tables. Files that cannot be loaded are logged, reported as warnings
    /// and skipped.
    pub fn run(&self, files: &mut [LogFile]) -> AnalysisReport {
        let mut store = ResultStore::new();
        let mut fingerprints: Vec<Option<FingerprintTable>> =
            self.features.iter().map(|_| None).collect();
        let mut warnings = self.load_warnings.clone();
        let mut tracker = ProgressTracker::new(files.len() as u64);
        let mut files_analyzed = 0;
        let mut files_skipped = 0;

        if files.is_empty() {
            error!("No valid input files have been found!");
            warnings.push(SniffWarning::no_input_files());
        }

        for file in files.iter_mut() {
            tracker.set_current_file(file.path().to_path_buf());
            let progress = tracker.snapshot();
            info!(
                "Processing file:\t{}\t({} %)",
                file.path().display(),
                progress.percentage_label()
            );
            let _ = self.progress_tx.send(progress);

            if let Err(err) = file.load() {
                warn!("Invalid file:\t{}", file.path().display());
                debug!("{err}");
                warnings.push(SniffWarning::from_load_error(file.path(), &err));
                files_skipped += 1;
                tracker.record_file();
                continue;
            }
            tracker.record_bytes(file.byte_len() as u64);

            for line in file.lines(&self.eol) {
                tracker.record_line();
                for (feature, table) in self.features.iter().zip(fingerprints.iter_mut()) {
                    feature.apply(line, file.path(), &mut store, table);
                }
            }

            file.release();
            tracker.record_file();
            files_analyzed += 1;
        }

        if !files.is_empty() {
            info!("All files have been processed.");
            let _ = self.progress_tx.send(tracker.snapshot());
        }

        AnalysisReport {
            results: store,
            warnings,
            files_analyzed,
            files_skipped,
            lines_processed: tracker.lines_processed(),
            bytes_read: tracker.bytes_read(),
            duration: tracker.elapsed(),
        }
    }
}
