//! DLBoard Core — data loading for the app-download dashboard.
//!
//! This crate contains everything between a configured CSV location and the
//! chart layer:
//! - Configuration resolved once from the environment or a TOML file
//! - CSV sources (raw URL over HTTP, local fallback file)
//! - A versioned schema contract and strict CSV parsing
//! - A stateless loader with an explicit `reload()` entry point
//! - Summary views (snapshot and stat pills, daily totals, trend, platform
//!   split, cumulative growth)

pub mod config;
pub mod data;
pub mod domain;
pub mod summary;

pub use config::{ConfigError, LoaderConfig, SourceLocation};
pub use data::{DataError, DataLoader, DataSource, LoadOutcome};
pub use domain::{Dataset, DownloadRecord, Platform};

// Loader outputs can be handed to another thread, and `reload` only needs
// a shared reference. Checked at compile time.
const _: fn() = || {
    fn require_send_sync<T: Send + Sync>() {}

    require_send_sync::<Dataset>();
    require_send_sync::<LoadOutcome>();
    require_send_sync::<DataError>();
    require_send_sync::<DataLoader>();
    require_send_sync::<Box<dyn data::CsvSource>>();

    let _reload = |loader: &DataLoader| -> Result<LoadOutcome, DataError> { loader.reload() };
};
