//! End-to-end loader tests against a throwaway local HTTP server and fixture files.

use chrono::NaiveDate;
use dlboard_core::config::{default_local_fallback, LoaderConfig, RawConfig};
use dlboard_core::data::{DataError, DataLoader, DataSource};
use dlboard_core::domain::Platform;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/downloads.csv")
}

/// Serve exactly one canned HTTP response, optionally after a delay.
///
/// Returns the URL to request.
fn serve_once(status: &str, body: &str, delay: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 4096];
            let mut request = Vec::new();
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            thread::sleep(delay);
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        }
    });

    format!("http://{addr}/data/downloads.csv")
}

fn remote_loader(url: &str, timeout: Duration) -> DataLoader {
    let config = LoaderConfig::default()
        .with_source(url)
        .unwrap()
        .with_timeout(timeout);
    DataLoader::new(config)
}

#[test]
fn remote_csv_loads_records_in_order() {
    let body = "report_date,platform,daily_downloads\n2024-01-01,AppStore,10\n2024-01-01,GooglePlay,5\n";
    let url = serve_once("200 OK", body, Duration::ZERO);

    let outcome = remote_loader(&url, Duration::from_secs(5)).reload().unwrap();

    assert_eq!(outcome.source, DataSource::Remote);
    assert_eq!(outcome.location, url);
    assert_eq!(outcome.byte_len, body.len());

    let records = &outcome.dataset.records;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].report_date.to_string(), "2024-01-01");
    assert_eq!(records[0].platform, Platform::AppStore);
    assert_eq!(records[0].daily_downloads, 10);
    assert_eq!(records[1].platform, Platform::GooglePlay);
    assert_eq!(records[1].daily_downloads, 5);
}

#[test]
fn http_404_is_remote_fetch_error() {
    let url = serve_once("404 Not Found", "404: Not Found", Duration::ZERO);

    let err = remote_loader(&url, Duration::from_secs(5)).reload().unwrap_err();
    match err {
        DataError::RemoteFetch { url: failed, reason } => {
            assert_eq!(failed, url);
            assert!(reason.contains("404"), "{reason}");
        }
        other => panic!("expected RemoteFetch, got {other:?}"),
    }
}

#[test]
fn http_500_is_remote_fetch_error() {
    let url = serve_once("500 Internal Server Error", "", Duration::ZERO);
    let err = remote_loader(&url, Duration::from_secs(5)).reload().unwrap_err();
    assert!(matches!(err, DataError::RemoteFetch { .. }));
}

#[test]
fn slow_server_times_out_as_remote_fetch_error() {
    let body = "report_date,platform,daily_downloads\n";
    let url = serve_once("200 OK", body, Duration::from_secs(3));

    let err = remote_loader(&url, Duration::from_millis(300)).reload().unwrap_err();
    assert!(matches!(err, DataError::RemoteFetch { .. }), "{err:?}");
}

#[test]
fn remote_malformed_csv_is_parse_error() {
    let body = "report_date,platform,daily_downloads\n2024-01-01,appstore,lots\n";
    let url = serve_once("200 OK", body, Duration::ZERO);

    let err = remote_loader(&url, Duration::from_secs(5)).reload().unwrap_err();
    assert!(matches!(err, DataError::Parse { line: Some(2), .. }), "{err:?}");
}

#[test]
fn local_fallback_when_url_empty() {
    let config = RawConfig {
        source: Some(String::new()),
        local_fallback: Some(fixture_path()),
        timeout_secs: None,
    }
    .resolve()
    .unwrap();

    let loader = DataLoader::new(config);
    assert_eq!(loader.source().unwrap().name(), "local_file");

    let outcome = loader.reload().unwrap();
    assert_eq!(outcome.source, DataSource::LocalFile);
    assert_eq!(outcome.dataset.len(), 8);
    assert_eq!(
        outcome.dataset.columns,
        vec!["date", "report_date", "platform", "daily_downloads", "cumulative_total"]
    );
    assert_eq!(outcome.dataset.records[7].cumulative_total, Some(18396));
}

#[test]
fn missing_local_fallback_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = RawConfig {
        source: Some(String::new()),
        local_fallback: Some(dir.path().join("downloads.csv")),
        timeout_secs: None,
    }
    .resolve()
    .unwrap();

    let err = DataLoader::new(config).reload().unwrap_err();
    assert!(matches!(err, DataError::MissingLocalFile { .. }));
}

#[test]
fn local_path_override_reads_that_file() {
    let config = LoaderConfig::default()
        .with_source(fixture_path().to_str().unwrap())
        .unwrap();
    let outcome = DataLoader::new(config).reload().unwrap();
    assert_eq!(outcome.dataset.platforms(), vec![Platform::AppStore, Platform::GooglePlay]);
}

#[test]
fn bundled_fallback_loads_from_any_directory() {
    // Tests run from the crate directory, where a cwd-relative
    // "data/downloads.csv" does not exist.
    let config = LoaderConfig::default().with_source("").unwrap();
    assert_eq!(config.local_fallback, default_local_fallback());

    let outcome = DataLoader::new(config).reload().unwrap();
    assert_eq!(outcome.source, DataSource::LocalFile);
    assert_eq!(outcome.dataset.len(), 8);
    assert_eq!(
        outcome.dataset.date_range(),
        Some((
            NaiveDate::from_ymd_opt(2025, 2, 9).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 12).unwrap()
        ))
    );
}

#[test]
fn repeated_loads_are_equal() {
    let config = LoaderConfig::default()
        .with_source(fixture_path().to_str().unwrap())
        .unwrap();
    let loader = DataLoader::new(config);

    let a = loader.reload().unwrap();
    let b = loader.reload().unwrap();
    assert_eq!(a.dataset, b.dataset);
    assert_eq!(a.fingerprint, b.fingerprint);
}
