//! Local file source: the bundled fallback CSV or an explicit path override.

use super::provider::{CsvSource, DataError, DataSource, FetchResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CsvSource for FileSource {
    fn name(&self) -> &str {
        "local_file"
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<FetchResult, DataError> {
        let bytes = std::fs::read(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DataError::MissingLocalFile {
                path: self.path.clone(),
            },
            _ => DataError::LocalRead {
                path: self.path.clone(),
                source: e,
            },
        })?;

        Ok(FetchResult {
            bytes,
            source: DataSource::LocalFile,
            location: self.location(),
        })
    }
}
