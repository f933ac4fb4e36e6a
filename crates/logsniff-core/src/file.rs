//! Log file handle with lazily loaded content.

use std::path::{Path, PathBuf};

use crate::config::DEFAULT_EOL;
use crate::error::SniffError;

/// A log file to analyze.
///
/// Content is read on [`load`](Self::load) and dropped on
/// [`release`](Self::release), so only the file currently being analyzed
/// needs to be held in memory.
#[derive(Debug, Clone)]
pub struct LogFile {
    path: PathBuf,
    content: Option<String>,
}

impl LogFile {
    /// Create a handle for a file on disk. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            content: None,
        }
    }

    /// Create a handle whose content is already in memory.
    pub fn with_content(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: Some(content.into()),
        }
    }

    /// Path of this file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file content if it is not loaded yet.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    pub fn load(&mut self) -> Result<(), SniffError> {
        if self.content.is_some() {
            return Ok(());
        }

        let bytes = std::fs::read(&self.path).map_err(|e| SniffError::unreadable(&self.path, e))?;
        if bytes.is_empty() {
            return Err(SniffError::EmptyFile {
                path: self.path.clone(),
            });
        }

        let content = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        };
        self.content = Some(content);
        Ok(())
    }

    /// Check whether content is currently held in memory.
    pub fn is_loaded(&self) -> bool {
        self.content.is_some()
    }

    /// Size of the loaded content in bytes (0 when not loaded).
    pub fn byte_len(&self) -> usize {
        self.content.as_ref().map_or(0, String::len)
    }

    /// Split the loaded content into lines.
    ///
    /// A terminating `eol` does not produce a trailing empty line.
    /// Yields nothing when the content is not loaded.
    pub fn lines<'a>(&'a self, eol: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let eol = if eol.is_empty() { DEFAULT_EOL } else { eol };
        let content = self.content.as_deref().unwrap_or("");
        let body = content.strip_suffix(eol).unwrap_or(content);
        let limit = if content.is_empty() { 0 } else { usize::MAX };
        body.split(eol).take(limit)
    }

    /// Drop the loaded content.
    pub fn release(&mut self) {
        self.content = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_lines_split_and_trailing_eol() {
        let file = LogFile::with_content("app.log", "one\ntwo\n\nfour\n");
        let lines: Vec<&str> = file.lines("\n").collect();
        assert_eq!(lines, vec!["one", "two", "", "four"]);
    }

    #[test]
    fn test_custom_eol() {
        let file = LogFile::with_content("app.log", "a||b||c");
        let lines: Vec<&str> = file.lines("||").collect();
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unloaded_file_has_no_lines() {
        let file = LogFile::new("app.log");
        assert_eq!(file.lines("\n").count(), 0);
        assert!(!file.is_loaded());
    }

    #[test]
    fn test_load_and_release() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app.log");
        fs::write(&path, "first\nsecond\n").unwrap();

        let mut file = LogFile::new(&path);
        file.load().unwrap();
        assert!(file.is_loaded());
        assert_eq!(file.byte_len(), 13);
        assert_eq!(file.lines("\n").count(), 2);

        file.release();
        assert!(!file.is_loaded());
        assert_eq!(file.byte_len(), 0);
    }

    #[test]
    fn test_load_errors() {
        let temp = TempDir::new().unwrap();
        let empty = temp.path().join("empty.log");
        fs::write(&empty, "").unwrap();

        assert!(matches!(
            LogFile::new(&empty).load(),
            Err(SniffError::EmptyFile { .. })
        ));
        assert!(matches!(
            LogFile::new(temp.path().join("missing.log")).load(),
            Err(SniffError::UnreadableFile { .. })
        ));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("binary.log");
        fs::write(&path, b"ok \xff line\n").unwrap();

        let mut file = LogFile::new(&path);
        file.load().unwrap();
        let line = file.lines("\n").next().unwrap();
        assert!(line.starts_with("ok "));
        assert!(line.contains('\u{fffd}'));
    }
}
