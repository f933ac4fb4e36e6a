//! logsniff - Declarative pattern counting and near-duplicate detection over logs.
//!
//! Usage:
//!   logsniff [CONFIG]               Analyze logs as described by CONFIG (./config.json)
//!   logsniff CONFIG -o out.json     Write the result document to out.json
//!   logsniff CONFIG --quiet         Disable log output
//!   logsniff --help                 Show help

mod logging;
mod memory;

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use color_eyre::eyre::{Context, Result};
use tracing::{error, info, warn};

use logsniff_analyze::{AnalysisReport, Analyzer, Emitted, emit};
use logsniff_core::SnifferConfig;
use logsniff_scan::FileCollector;

use crate::logging::LogGuard;
use crate::memory::MemoryMonitor;

/// Default wall-clock ceiling in seconds.
const DEFAULT_MAX_EXECUTION_TIME: u64 = 7200;

/// Exit status used when the execution time ceiling is hit.
const TIMEOUT_EXIT_CODE: i32 = 124;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

#[derive(Parser)]
#[command(
    name = "logsniff",
    version,
    about = "Count patterns and find near-duplicate lines in log files",
    long_about = "logsniff runs the metrics described in a JSON configuration over \
                  a set of log files and prints (or writes) the grouped results \
                  as a JSON document."
)]
struct Cli {
    /// Configuration file
    #[arg(default_value = "./config.json")]
    config: PathBuf,

    /// Output file (overrides `output_file` from the configuration)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Disable log output
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let mut config = SnifferConfig::from_path(&cli.config).context("Invalid configuration file.")?;
    if let Some(output) = cli.output {
        config.output_file = Some(output);
    }
    if cli.quiet {
        config.logging = false;
    }
    let files = config
        .validate_files_directive()
        .context("Invalid configuration file.")?;

    let log_guard = logging::init_logging(&config)?;

    info!("Started at {}", Local::now().format(TIME_FORMAT));
    apply_resource_hints(&config, log_guard.clone());

    let mut collected = FileCollector::from_config(&config).collect(files.as_slice());

    let analyzer = Analyzer::new(&config);
    let monitor = MemoryMonitor::watch(analyzer.subscribe());
    let mut report = analyzer.run(&mut collected.files);
    let mut warnings = collected.warnings;
    warnings.append(&mut report.warnings);
    report.warnings = warnings;
    log_summary(&report);

    let results = report.finalize(analyzer.metrics());
    drop(analyzer);
    if let Some(peak) = monitor.finish() {
        info!("Peak memory usage: {}", format_size(peak));
    }
    match emit(&results, config.output_file.as_deref())? {
        Emitted::Text(text) => println!("{text}"),
        Emitted::Written { path, bytes } => {
            info!("Wrote {} to {}", format_size(bytes as u64), path.display());
        }
        Emitted::Suppressed => {}
    }

    info!("Finished at {}", Local::now().format(TIME_FORMAT));

    Ok(())
}

/// Log the memory hint and arm the execution time watchdog.
fn apply_resource_hints(config: &SnifferConfig, log_guard: LogGuard) {
    if let Some(memory) = config.memory.as_deref() {
        match parse_size(memory) {
            Ok(bytes) => info!("Memory limit hint: {}", format_size(bytes)),
            Err(err) => warn!("Ignoring memory hint {memory:?}: {err}"),
        }
    }

    let seconds = config
        .max_execution_time
        .unwrap_or(DEFAULT_MAX_EXECUTION_TIME);
    if seconds == 0 {
        return;
    }

    thread::spawn(move || {
        thread::sleep(Duration::from_secs(seconds));
        error!("Maximum execution time of {seconds} seconds exceeded, aborting.");
        logging::flush(&log_guard);
        std::process::exit(TIMEOUT_EXIT_CODE);
    });
}

fn log_summary(report: &AnalysisReport) {
    info!(
        "{} file(s) analyzed, {} skipped, {} lines, {} read in {:.2}s",
        report.files_analyzed,
        report.files_skipped,
        report.lines_processed,
        format_size(report.bytes_read),
        report.duration.as_secs_f64()
    );
    if report.has_warnings() {
        info!("{} warning(s) during analysis", report.warnings.len());
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Parse a size string (e.g., "512K", "10MB", "1G").
fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_uppercase();
    let digits = |s: &str| -> Result<f64> {
        Ok(s.trim_end_matches(|c: char| !c.is_ascii_digit() && c != '.').parse()?)
    };

    let (num, multiplier) = if s.ends_with("GB") || s.ends_with('G') {
        (digits(&s)?, 1024 * 1024 * 1024)
    } else if s.ends_with("MB") || s.ends_with('M') {
        (digits(&s)?, 1024 * 1024)
    } else if s.ends_with("KB") || s.ends_with('K') {
        (digits(&s)?, 1024)
    } else if s.ends_with('B') {
        (digits(&s)?, 1)
    } else {
        (s.parse()?, 1)
    };

    Ok((num * multiplier as f64) as u64)
}
