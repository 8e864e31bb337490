//! Property tests for CSV parsing.
//!
//! Uses proptest to verify:
//! 1. Idempotence — parsing the same bytes twice yields equal datasets
//! 2. Order preservation — records come back in row order with their values
//! 3. No silent coercion — a non-numeric count anywhere fails the whole payload

use chrono::NaiveDate;
use dlboard_core::data::{parse_csv, DataError};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..3650).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + chrono::Duration::days(offset)
    })
}

fn arb_platform() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("appstore"),
        Just("googleplay"),
        Just("App Store"),
        Just("huawei"),
    ]
}

fn arb_row() -> impl Strategy<Value = (NaiveDate, &'static str, u64)> {
    (arb_date(), arb_platform(), 0u64..1_000_000)
}

fn render(rows: &[(NaiveDate, &str, u64)]) -> String {
    let mut out = String::from("report_date,platform,daily_downloads\n");
    for (date, platform, count) in rows {
        out.push_str(&format!("{},{platform},{count}\n", date.format("%Y-%m-%d")));
    }
    out
}

proptest! {
    #[test]
    fn parsing_is_idempotent(rows in prop::collection::vec(arb_row(), 0..50)) {
        let csv = render(&rows);
        let first = parse_csv(csv.as_bytes()).unwrap();
        let second = parse_csv(csv.as_bytes()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn rows_keep_source_order(rows in prop::collection::vec(arb_row(), 1..50)) {
        let csv = render(&rows);
        let ds = parse_csv(csv.as_bytes()).unwrap();
        prop_assert_eq!(ds.len(), rows.len());
        for (record, (date, _, count)) in ds.records.iter().zip(&rows) {
            prop_assert_eq!(record.report_date, *date);
            prop_assert_eq!(record.daily_downloads, *count);
        }
    }

    #[test]
    fn non_numeric_count_fails_whole_payload(
        rows in prop::collection::vec(arb_row(), 1..20),
        idx in any::<prop::sample::Index>(),
        junk in "[a-z]{1,6}",
    ) {
        let bad = idx.index(rows.len());
        let mut csv = String::from("report_date,platform,daily_downloads\n");
        for (i, (date, platform, count)) in rows.iter().enumerate() {
            let cell = if i == bad { junk.clone() } else { count.to_string() };
            csv.push_str(&format!("{},{platform},{cell}\n", date.format("%Y-%m-%d")));
        }
        let is_parse_error = matches!(parse_csv(csv.as_bytes()), Err(DataError::Parse { .. }));
        prop_assert!(is_parse_error);
    }
}
