//! Loader configuration, resolved once at startup.
//!
//! The environment (or a TOML file) is read in exactly one place; the
//! resulting [`LoaderConfig`] is passed by value to the loader.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the remote CSV URL.
pub const CSV_URL_ENV: &str = "GITHUB_CSV_URL";
/// Environment variable overriding the local fallback path.
pub const LOCAL_CSV_ENV: &str = "DLBOARD_LOCAL_CSV";
/// Environment variable overriding the HTTP timeout, in seconds.
pub const TIMEOUT_ENV: &str = "DLBOARD_TIMEOUT_SECS";

pub const DEFAULT_CSV_URL: &str =
    "https://raw.githubusercontent.com/sheenana-dev/bticket-download-report/main/data/downloads.csv";
/// Bundled fallback file, relative to the workspace root.
pub const DEFAULT_LOCAL_CSV: &str = "data/downloads.csv";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Absolute path of the bundled fallback file.
///
/// Anchored to the workspace this crate ships in, so it resolves the same
/// way from any working directory.
pub fn default_local_fallback() -> PathBuf {
    let core_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    core_dir.parent().unwrap_or(core_dir).join(DEFAULT_LOCAL_CSV)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid source URL '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },

    #[error("invalid timeout '{0}': expected a positive number of seconds")]
    InvalidTimeout(String),

    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Where the loader reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Remote(Url),
    Local(PathBuf),
}

impl SourceLocation {
    /// Interpret a raw `source_location` value.
    ///
    /// Empty selects `fallback`. Values with an `http://` or `https://`
    /// scheme must be valid URLs; anything else is a local path.
    pub fn resolve(raw: &str, fallback: &Path) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(SourceLocation::Local(fallback.to_path_buf()));
        }

        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
                value: raw.to_string(),
                reason: e.to_string(),
            })?;
            if url.host_str().map_or(true, str::is_empty) {
                return Err(ConfigError::InvalidUrl {
                    value: raw.to_string(),
                    reason: "missing host".into(),
                });
            }
            return Ok(SourceLocation::Remote(url));
        }

        Ok(SourceLocation::Local(PathBuf::from(raw)))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, SourceLocation::Remote(_))
    }

    pub fn describe(&self) -> String {
        match self {
            SourceLocation::Remote(url) => url.to_string(),
            SourceLocation::Local(path) => path.display().to_string(),
        }
    }
}

/// Fully resolved loader configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub source: SourceLocation,
    /// Upper bound on the remote request, connect through body.
    pub timeout: Duration,
    /// File used when no remote URL is configured.
    pub local_fallback: PathBuf,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            // The default URL is a compile-time constant known to parse.
            source: Url::parse(DEFAULT_CSV_URL)
                .map(SourceLocation::Remote)
                .unwrap_or_else(|_| SourceLocation::Local(default_local_fallback())),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            local_fallback: default_local_fallback(),
        }
    }
}

/// On-disk / environment form before resolution. Unset fields take defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// URL, local path, or empty for the fallback file.
    pub source: Option<String>,
    pub local_fallback: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl RawConfig {
    /// Collect settings from an environment lookup.
    ///
    /// `GITHUB_CSV_URL` set to an empty string is kept as `Some("")`, which
    /// selects the local fallback; unset means the default URL.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let timeout_secs = match lookup(TIMEOUT_ENV) {
            Some(raw) => Some(parse_timeout(&raw)?),
            None => None,
        };

        Ok(Self {
            source: lookup(CSV_URL_ENV),
            local_fallback: lookup(LOCAL_CSV_ENV)
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            timeout_secs,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn resolve(self) -> Result<LoaderConfig, ConfigError> {
        let defaults = LoaderConfig::default();
        let local_fallback = self.local_fallback.unwrap_or(defaults.local_fallback);

        let source = match self.source {
            Some(raw) => SourceLocation::resolve(&raw, &local_fallback)?,
            None => defaults.source,
        };

        let timeout = match self.timeout_secs {
            Some(0) => return Err(ConfigError::InvalidTimeout("0".into())),
            Some(secs) => Duration::from_secs(secs),
            None => defaults.timeout,
        };

        Ok(LoaderConfig {
            source,
            timeout,
            local_fallback,
        })
    }
}

fn parse_timeout(raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}

impl LoaderConfig {
    /// Resolve from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        RawConfig::from_lookup(|key| std::env::var(key).ok())?.resolve()
    }

    /// Resolve from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        RawConfig::from_toml(&content)?.resolve()
    }

    /// Replace the source with a raw `source_location` value.
    pub fn with_source(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.source = SourceLocation::resolve(raw, &self.local_fallback)?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
