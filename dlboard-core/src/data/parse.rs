//! CSV bytes → Dataset.
//!
//! Parsing is strict: a cell that cannot be coerced to its column's type
//! fails the whole payload. Nothing is defaulted to zero and no partial
//! dataset is returned.

use super::provider::DataError;
use super::schema::{ColumnKind, ColumnMap, DownloadSchema};
use crate::domain::{Dataset, DownloadRecord, Platform};
use chrono::{NaiveDate, NaiveDateTime};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse a downloads CSV payload against the V1 schema.
pub fn parse_csv(bytes: &[u8]) -> Result<Dataset, DataError> {
    parse_with_schema(bytes, &DownloadSchema::V1)
}

pub fn parse_with_schema(bytes: &[u8], schema: &DownloadSchema) -> Result<Dataset, DataError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let columns: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();

    if columns.iter().all(String::is_empty) {
        return Err(DataError::parse(Some(1), "missing header row"));
    }

    let map = schema
        .resolve(&columns)
        .map_err(|e| DataError::parse(Some(1), e.to_string()))?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(csv_error)?;
        let line = row.position().map(|p| p.line());
        records.push(parse_row(&row, &columns, &map, line)?);
    }

    Ok(Dataset { columns, records })
}

fn parse_row(
    row: &csv::StringRecord,
    columns: &[String],
    map: &ColumnMap,
    line: Option<u64>,
) -> Result<DownloadRecord, DataError> {
    let cell = |idx: usize| row.get(idx).unwrap_or("");
    let bad = |idx: usize, kind: ColumnKind, value: &str| {
        let expected = match kind {
            ColumnKind::Date => "a date (YYYY-MM-DD)",
            ColumnKind::Count => "a non-negative integer",
            ColumnKind::Text => "text",
        };
        DataError::parse(
            line,
            format!("column '{}': expected {expected}, got '{value}'", columns[idx]),
        )
    };

    let report_date = {
        let raw = cell(map.report_date);
        parse_date(raw).ok_or_else(|| bad(map.report_date, ColumnKind::Date, raw))?
    };

    let platform = {
        let raw = cell(map.platform);
        if raw.is_empty() {
            return Err(bad(map.platform, ColumnKind::Text, raw));
        }
        Platform::parse(raw)
    };

    let daily_downloads = {
        let raw = cell(map.daily_downloads);
        parse_count(raw).ok_or_else(|| bad(map.daily_downloads, ColumnKind::Count, raw))?
    };

    let date = match map.collected_date {
        Some(idx) if !cell(idx).is_empty() => {
            let raw = cell(idx);
            Some(parse_date(raw).ok_or_else(|| bad(idx, ColumnKind::Date, raw))?)
        }
        _ => None,
    };

    let cumulative_total = match map.cumulative_total {
        Some(idx) if !cell(idx).is_empty() => {
            let raw = cell(idx);
            Some(parse_count(raw).ok_or_else(|| bad(idx, ColumnKind::Count, raw))?)
        }
        _ => None,
    };

    Ok(DownloadRecord {
        report_date,
        platform,
        daily_downloads,
        date,
        cumulative_total,
        extra: map.extra.iter().map(|&i| cell(i).to_string()).collect(),
    })
}

fn csv_error(e: csv::Error) -> DataError {
    let line = e.position().map(|p| p.line());
    let message = match e.kind() {
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {expected_len} fields, found {len}"),
        csv::ErrorKind::Utf8 { err, .. } => format!("invalid UTF-8: {err}"),
        _ => e.to_string(),
    };
    DataError::parse(line, message)
}

/// Accepts `YYYY-MM-DD` and datetimes in `YYYY-MM-DD[T ]HH:MM:SS` form.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn parse_count(raw: &str) -> Option<u64> {
    raw.parse::<u64>().ok()
}
