//! Domain types for the download dashboard

pub mod platform;
pub mod record;

pub use platform::Platform;
pub use record::{Dataset, DownloadRecord};
