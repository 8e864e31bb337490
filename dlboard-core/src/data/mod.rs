//! Data loading: sources, schema contract, parsing

pub mod frame;
pub mod http;
pub mod loader;
pub mod local;
pub mod parse;
pub mod provider;
pub mod schema;

pub use frame::to_dataframe;
pub use http::HttpSource;
pub use loader::{load_dataset, load_from, source_for, DataLoader, LoadOutcome};
pub use local::FileSource;
pub use parse::parse_csv;
pub use provider::{CsvSource, DataError, DataSource, FetchResult};
pub use schema::{DownloadSchema, SchemaError};
