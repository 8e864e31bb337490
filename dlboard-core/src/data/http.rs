//! Remote source: a single blocking GET against a raw-file URL.
//!
//! There is no retry loop here. A failed request, a timeout or a non-2xx
//! status is reported once as `RemoteFetch` and the caller decides when to
//! try again.

use super::provider::{CsvSource, DataError, DataSource, FetchResult};
use reqwest::Url;
use std::time::Duration;

const USER_AGENT: &str = concat!("dlboard/", env!("CARGO_PKG_VERSION"));

pub struct HttpSource {
    client: reqwest::blocking::Client,
    url: Url,
}

impl HttpSource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DataError::RemoteFetch {
                url: url.to_string(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn fetch_error(&self, reason: impl Into<String>) -> DataError {
        DataError::RemoteFetch {
            url: self.url.to_string(),
            reason: reason.into(),
        }
    }
}

fn describe_request_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {e}")
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    }
}

impl CsvSource for HttpSource {
    fn name(&self) -> &str {
        "remote_url"
    }

    fn location(&self) -> String {
        self.url.to_string()
    }

    fn fetch(&self) -> Result<FetchResult, DataError> {
        let resp = self
            .client
            .get(self.url.clone())
            .send()
            .map_err(|e| self.fetch_error(describe_request_error(&e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(self.fetch_error(format!("HTTP {status}")));
        }

        let bytes = resp.bytes().map_err(|e| {
            self.fetch_error(format!(
                "failed to read body: {}",
                describe_request_error(&e)
            ))
        })?;

        Ok(FetchResult {
            bytes: bytes.to_vec(),
            source: DataSource::Remote,
            location: self.location(),
        })
    }
}
