//! Data loader: resolve source → fetch → parse.
//!
//! The loader is stateless. Each [`DataLoader::reload`] performs one fetch
//! and one parse and hands the resulting dataset to the caller; nothing is
//! kept between calls. How often to reload is the hosting layer's decision.

use super::http::HttpSource;
use super::local::FileSource;
use super::parse::parse_csv;
use super::provider::{CsvSource, DataError, DataSource};
use crate::config::{LoaderConfig, SourceLocation};
use crate::domain::Dataset;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A parsed dataset plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub dataset: Dataset,
    pub source: DataSource,
    /// URL or path that was read.
    pub location: String,
    /// Size of the raw payload.
    pub byte_len: usize,
    /// BLAKE3 hex digest of the raw payload.
    pub fingerprint: String,
}

pub struct DataLoader {
    config: LoaderConfig,
}

impl DataLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Build the source the configuration points at.
    ///
    /// A local location never constructs an HTTP client.
    pub fn source(&self) -> Result<Box<dyn CsvSource>, DataError> {
        source_for(&self.config)
    }

    /// Fetch and parse a fresh dataset.
    pub fn reload(&self) -> Result<LoadOutcome, DataError> {
        let source = self.source()?;
        load_from(source.as_ref())
    }
}

pub fn source_for(config: &LoaderConfig) -> Result<Box<dyn CsvSource>, DataError> {
    match &config.source {
        SourceLocation::Remote(url) => Ok(Box::new(HttpSource::new(url.clone(), config.timeout)?)),
        SourceLocation::Local(path) => Ok(Box::new(FileSource::new(path.clone()))),
    }
}

/// Run one fetch + parse cycle against an already-built source.
pub fn load_from(source: &dyn CsvSource) -> Result<LoadOutcome, DataError> {
    let started = Instant::now();
    let location = source.location();
    info!(source = source.name(), %location, "loading downloads CSV");

    let result = source.fetch().and_then(|fetched| {
        debug!(bytes = fetched.bytes.len(), "fetched payload");
        let dataset = parse_csv(&fetched.bytes)?;
        Ok(LoadOutcome {
            fingerprint: blake3::hash(&fetched.bytes).to_hex().to_string(),
            byte_len: fetched.bytes.len(),
            dataset,
            source: fetched.source,
            location: fetched.location,
        })
    });

    match &result {
        Ok(outcome) => info!(
            records = outcome.dataset.len(),
            columns = outcome.dataset.columns.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dataset loaded"
        ),
        Err(e) => warn!(%location, error = %e, "dataset load failed"),
    }

    result
}

/// Convenience entry point: build a loader and reload once.
pub fn load_dataset(config: &LoaderConfig) -> Result<LoadOutcome, DataError> {
    DataLoader::new(config.clone()).reload()
}
