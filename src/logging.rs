//! Log sink setup.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use color_eyre::eyre::{Result, eyre};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

use logsniff_core::SnifferConfig;

/// Shared slot for the log file writer's guard.
///
/// Dropping the guard flushes buffered records to the file. Paths that end the
/// process without unwinding call [`flush`] first.
pub type LogGuard = Arc<Mutex<Option<WorkerGuard>>>;

/// Flush and close the log file writer. Later records are not written to the file.
pub fn flush(guard: &LogGuard) {
    guard.lock().unwrap_or_else(PoisonError::into_inner).take();
}

/// Install the global subscriber.
///
/// Console output goes to stderr and only when `logging` is enabled. With a
/// `log_file` the same records are appended to that file. The returned guard
/// must be held until exit.
pub fn init_logging(config: &SnifferConfig) -> Result<LogGuard> {
    if !config.logging {
        return Ok(LogGuard::default());
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    let console_layer: Box<dyn Layer<_> + Send + Sync> =
        Box::new(fmt::layer().with_writer(std::io::stderr));

    let (file_layer, guard): (Option<Box<dyn Layer<_> + Send + Sync>>, Option<WorkerGuard>) =
        match &config.log_file {
            Some(path) => {
                let (directory, file_name) = split_log_path(path)?;
                let appender = rolling::never(directory, file_name);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer: Box<dyn Layer<_> + Send + Sync> =
                    Box::new(fmt::layer().with_ansi(false).with_writer(writer));
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

    registry
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| eyre!("Could not install logger: {e}"))?;

    Ok(Arc::new(Mutex::new(guard)))
}

fn split_log_path(path: &Path) -> Result<(&Path, &std::ffi::OsStr)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| eyre!("Invalid log file: {}", path.display()))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok((directory, file_name))
}
