//! CSV source trait and structured error types.
//!
//! The CsvSource trait abstracts over where the downloads CSV comes from
//! (a raw URL or a file on disk) so the loader can treat both the same way
//! and tests can substitute their own sources.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for data loading.
///
/// Every variant is terminal for the current load; nothing is retried.
/// Messages are written to be shown to a dashboard user as-is.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("local data file not found: {}", .path.display())]
    MissingLocalFile { path: PathBuf },

    #[error("failed to read local data file {}: {source}", .path.display())]
    LocalRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("remote fetch failed for {url}: {reason}")]
    RemoteFetch { url: String, reason: String },

    #[error("{}", parse_message(.line, .message))]
    Parse { line: Option<u64>, message: String },

    #[error("dataframe conversion failed: {0}")]
    Frame(String),
}

fn parse_message(line: &Option<u64>, message: &str) -> String {
    match line {
        Some(line) => format!("malformed CSV at line {line}: {message}"),
        None => format!("malformed CSV: {message}"),
    }
}

impl DataError {
    pub(crate) fn parse(line: Option<u64>, message: impl Into<String>) -> Self {
        DataError::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Where a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    Remote,
    LocalFile,
}

/// Raw bytes fetched from a source, before parsing.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub bytes: Vec<u8>,
    pub source: DataSource,
    /// URL or path the bytes were read from.
    pub location: String,
}

/// A place the downloads CSV can be read from.
///
/// Implementations perform exactly one read per call and never cache.
pub trait CsvSource: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// URL or path this source reads.
    fn location(&self) -> String;

    /// Read the full payload.
    fn fetch(&self) -> Result<FetchResult, DataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_message_includes_line() {
        let err = DataError::parse(Some(3), "bad count");
        assert_eq!(err.to_string(), "malformed CSV at line 3: bad count");

        let err = DataError::parse(None, "empty header");
        assert_eq!(err.to_string(), "malformed CSV: empty header");
    }

    #[test]
    fn missing_file_message_names_path() {
        let err = DataError::MissingLocalFile {
            path: PathBuf::from("data/downloads.csv"),
        };
        assert!(err.to_string().contains("data/downloads.csv"));
    }
}
