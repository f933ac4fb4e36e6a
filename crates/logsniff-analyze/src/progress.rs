//! Analysis progress reporting.

use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Progress information during an analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisProgress {
    /// Number of files handled so far, skipped files included.
    pub files_processed: u64,
    /// Number of files in this run.
    pub files_total: u64,
    /// File about to be processed.
    pub current_file: PathBuf,
    /// Lines analyzed so far.
    pub lines_processed: u64,
    /// Bytes of log content read so far.
    pub bytes_read: u64,
    /// Time elapsed since the run started.
    pub elapsed: Duration,
}

impl AnalysisProgress {
    /// Create initial progress state.
    pub fn new(files_total: u64) -> Self {
        Self {
            files_processed: 0,
            files_total,
            current_file: PathBuf::new(),
            lines_processed: 0,
            bytes_read: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Completed share of the run in whole percent, rounded down.
    pub fn percentage(&self) -> u64 {
        if self.files_total == 0 {
            return 0;
        }
        self.files_processed * 100 / self.files_total
    }

    /// Percentage as a zero-padded, at least two-digit label.
    pub fn percentage_label(&self) -> String {
        format!("{:02}", self.percentage())
    }
}

impl Default for AnalysisProgress {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Internal progress tracker with timing.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    files_total: u64,
    files_processed: u64,
    lines_processed: u64,
    bytes_read: u64,
    current_file: PathBuf,
}

impl ProgressTracker {
    pub fn new(files_total: u64) -> Self {
        Self {
            start_time: Instant::now(),
            files_total,
            files_processed: 0,
            lines_processed: 0,
            bytes_read: 0,
            current_file: PathBuf::new(),
        }
    }

    pub fn set_current_file(&mut self, path: PathBuf) {
        self.current_file = path;
    }

    pub fn record_file(&mut self) {
        self.files_processed += 1;
    }

    pub fn record_bytes(&mut self, bytes: u64) {
        self.bytes_read += bytes;
    }

    pub fn record_line(&mut self) {
        self.lines_processed += 1;
    }

    pub fn lines_processed(&self) -> u64 {
        self.lines_processed
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self) -> AnalysisProgress {
        AnalysisProgress {
            files_processed: self.files_processed,
            files_total: self.files_total,
            current_file: self.current_file.clone(),
            lines_processed: self.lines_processed,
            bytes_read: self.bytes_read,
            elapsed: self.start_time.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_rounds_down() {
        let mut progress = AnalysisProgress::new(3);
        assert_eq!(progress.percentage_label(), "00");

        progress.files_processed = 1;
        assert_eq!(progress.percentage(), 33);

        progress.files_processed = 2;
        assert_eq!(progress.percentage_label(), "66");

        progress.files_processed = 3;
        assert_eq!(progress.percentage_label(), "100");
    }

    #[test]
    fn test_single_digit_label_is_padded() {
        let mut progress = AnalysisProgress::new(20);
        progress.files_processed = 1;
        assert_eq!(progress.percentage_label(), "05");
    }

    #[test]
    fn test_empty_run_is_zero_percent() {
        assert_eq!(AnalysisProgress::default().percentage(), 0);
    }

    #[test]
    fn test_tracker_snapshot() {
        let mut tracker = ProgressTracker::new(2);
        tracker.set_current_file(PathBuf::from("a.log"));
        tracker.record_bytes(10);
        tracker.record_line();
        tracker.record_line();
        tracker.record_file();

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.files_processed, 1);
        assert_eq!(snapshot.files_total, 2);
        assert_eq!(snapshot.current_file, PathBuf::from("a.log"));
        assert_eq!(snapshot.lines_processed, 2);
        assert_eq!(snapshot.bytes_read, 10);
    }
}
