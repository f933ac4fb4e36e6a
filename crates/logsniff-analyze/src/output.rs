//! Result document rendering and delivery.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::ser::Error as _;
use serde_json::ser::PrettyFormatter;
use tracing::{info, warn};

use logsniff_core::SniffError;

use crate::store::ResultSet;

/// What [`emit`] did with the result document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emitted {
    /// The document was written to a file.
    Written { path: PathBuf, bytes: usize },
    /// The document is returned for the caller to print.
    Text(String),
    /// Nothing matched; no document was produced.
    Suppressed,
}

/// Render results as JSON indented by four spaces.
pub fn render(results: &ResultSet) -> Result<String, SniffError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    results.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(|e| SniffError::Render(serde_json::Error::custom(e)))
}

/// Deliver the result document.
///
/// Empty results are suppressed. With an output file the document is written
/// there; if that fails the text is returned instead so it is not lost.
pub fn emit(results: &ResultSet, output_file: Option<&Path>) -> Result<Emitted, SniffError> {
    if results.is_empty() {
        info!("Nothing was found in the logs that matches your search patterns. Exiting.");
        return Ok(Emitted::Suppressed);
    }

    let text = render(results)?;

    let Some(path) = output_file else {
        return Ok(Emitted::Text(text));
    };

    info!("Writing output file:\t{}", path.display());
    match std::fs::write(path, &text) {
        Ok(()) => Ok(Emitted::Written {
            path: path.to_path_buf(),
            bytes: text.len(),
        }),
        Err(err) => {
            warn!("Could not write output file {}: {err}", path.display());
            Ok(Emitted::Text(text))
        }
    }
}
