//! Dataset → Polars DataFrame, the tabular handle handed to chart renderers.

use super::provider::DataError;
use super::schema::{COLLECTED_DATE, CUMULATIVE_TOTAL, DAILY_DOWNLOADS, PLATFORM, REPORT_DATE};
use crate::domain::Dataset;
use chrono::NaiveDate;
use polars::prelude::*;

/// Column with the human-readable platform name, added next to `platform`.
pub const PLATFORM_LABEL: &str = "platform_label";

fn epoch_days(date: NaiveDate) -> i32 {
    (date - NaiveDate::default()).num_days() as i32
}

fn date_column(name: &str, days: Vec<Option<i32>>) -> Result<Column, DataError> {
    Column::new(name.into(), days)
        .cast(&DataType::Date)
        .map_err(|e| DataError::Frame(format!("{name} cast: {e}")))
}

/// Build a DataFrame with one row per record, in dataset order.
///
/// Schema columns come first with typed dtypes (`Date`, `UInt64`), then the
/// platform label, then any extra columns as strings.
pub fn to_dataframe(dataset: &Dataset) -> Result<DataFrame, DataError> {
    let records = &dataset.records;

    let report_dates: Vec<Option<i32>> =
        records.iter().map(|r| Some(epoch_days(r.report_date))).collect();
    let platforms: Vec<&str> = records.iter().map(|r| r.platform.key()).collect();
    let labels: Vec<&str> = records.iter().map(|r| r.platform.label()).collect();
    let downloads: Vec<u64> = records.iter().map(|r| r.daily_downloads).collect();
    let collected: Vec<Option<i32>> = records.iter().map(|r| r.date.map(epoch_days)).collect();
    let cumulative: Vec<Option<u64>> = records.iter().map(|r| r.cumulative_total).collect();

    let mut columns = vec![
        date_column(REPORT_DATE, report_dates)?,
        Column::new(PLATFORM.into(), platforms),
        Column::new(PLATFORM_LABEL.into(), labels),
        Column::new(DAILY_DOWNLOADS.into(), downloads),
    ];

    if dataset.columns.iter().any(|c| c == COLLECTED_DATE) {
        columns.push(date_column(COLLECTED_DATE, collected)?);
    }
    if dataset.columns.iter().any(|c| c == CUMULATIVE_TOTAL) {
        columns.push(Column::new(CUMULATIVE_TOTAL.into(), cumulative));
    }

    for (pos, name) in dataset.extra_columns().into_iter().enumerate() {
        let values: Vec<&str> = records
            .iter()
            .map(|r| r.extra.get(pos).map(String::as_str).unwrap_or(""))
            .collect();
        columns.push(Column::new(name.into(), values));
    }

    DataFrame::new(columns).map_err(|e| DataError::Frame(format!("dataframe creation: {e}")))
}
