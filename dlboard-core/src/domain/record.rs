//! Download records and the dataset they are collected into.

use super::platform::Platform;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the downloads CSV: a platform's count for a single report date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRecord {
    /// Day the downloads happened.
    pub report_date: NaiveDate,
    pub platform: Platform,
    pub daily_downloads: u64,
    /// Day the producer collected the row, if the column is present.
    pub date: Option<NaiveDate>,
    /// All-time total as reported by the store on `report_date`.
    pub cumulative_total: Option<u64>,
    /// Raw values of columns outside the schema, aligned with
    /// [`Dataset::extra_columns`].
    pub extra: Vec<String>,
}

/// Records parsed from one CSV payload, in source row order.
///
/// Duplicate (report_date, platform) rows are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Header as observed, in source order.
    pub columns: Vec<String>,
    pub records: Vec<DownloadRecord>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Columns that the schema does not interpret, in source order.
    pub fn extra_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(|c| !crate::data::schema::DownloadSchema::V1.knows(c))
            .collect()
    }

    /// Earliest and latest report date, or `None` if empty.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.report_date).min()?;
        let max = self.records.iter().map(|r| r.report_date).max()?;
        Some((min, max))
    }

    /// Distinct platforms in order of first appearance.
    pub fn platforms(&self) -> Vec<Platform> {
        let mut seen = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.platform) {
                seen.push(record.platform.clone());
            }
        }
        seen
    }

    /// Copy of this dataset keeping only records that match `keep`.
    pub fn retain_by(&self, keep: impl Fn(&DownloadRecord) -> bool) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            records: self.records.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}
