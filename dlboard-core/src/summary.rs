//! Dashboard views — pure functions from a dataset to the figures the charts show.
//!
//! Nothing here fetches or caches. Every function takes a `&Dataset` (or a
//! slice derived from one) and returns owned values.

use crate::domain::{Dataset, Platform};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Window of the trend chart's moving average, in days.
pub const TREND_WINDOW: usize = 7;

/// Platforms that always get a card, even with no rows on the latest day.
const HEADLINE_PLATFORMS: [Platform; 2] = [Platform::AppStore, Platform::GooglePlay];

// ─── Filtering ──────────────────────────────────────────────────────

/// Sidebar filter: inclusive report-date range and an optional platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub platform: Option<Platform>,
}

impl DatasetFilter {
    pub fn apply(&self, dataset: &Dataset) -> Dataset {
        dataset.retain_by(|r| {
            self.start.map_or(true, |s| r.report_date >= s)
                && self.end.map_or(true, |e| r.report_date <= e)
                && self.platform.as_ref().map_or(true, |p| &r.platform == p)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none() && self.platform.is_none()
    }
}

// ─── Aggregation ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub platform: Platform,
    pub downloads: u64,
}

/// Downloads summed per (report date, platform), ordered by date then platform.
pub fn daily_totals(dataset: &Dataset) -> Vec<DailyTotal> {
    let mut sums: BTreeMap<(NaiveDate, Platform), u64> = BTreeMap::new();
    for r in &dataset.records {
        let sum = sums.entry((r.report_date, r.platform.clone())).or_default();
        *sum = sum.saturating_add(r.daily_downloads);
    }
    sums.into_iter()
        .map(|((date, platform), downloads)| DailyTotal {
            date,
            platform,
            downloads,
        })
        .collect()
}

/// Downloads summed per report date across all platforms, ascending.
pub fn combined_daily(dataset: &Dataset) -> Vec<(NaiveDate, u64)> {
    let mut sums: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for r in &dataset.records {
        let sum = sums.entry(r.report_date).or_default();
        *sum = sum.saturating_add(r.daily_downloads);
    }
    sums.into_iter().collect()
}

/// Total downloads per platform, ordered by platform.
pub fn platform_split(dataset: &Dataset) -> Vec<(Platform, u64)> {
    let mut sums: BTreeMap<Platform, u64> = BTreeMap::new();
    for r in &dataset.records {
        let sum = sums.entry(r.platform.clone()).or_default();
        *sum = sum.saturating_add(r.daily_downloads);
    }
    sums.into_iter().collect()
}

/// Trailing mean over `window` points. Leading points average over what is
/// available, so the output has the same length as the input.
pub fn moving_average(values: &[u64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(values.len());
    // u128 holds any window of u64 counts without overflow.
    let mut sum: u128 = 0;
    for (i, &v) in values.iter().enumerate() {
        sum += u128::from(v);
        if i >= window {
            sum -= u128::from(values[i - window]);
        }
        let n = (i + 1).min(window);
        out.push(sum as f64 / n as f64);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub downloads: u64,
    pub average: f64,
}

/// One line on the trend chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub name: String,
    pub points: Vec<TrendPoint>,
}

fn to_series(name: String, daily: Vec<(NaiveDate, u64)>, window: usize) -> TrendSeries {
    let values: Vec<u64> = daily.iter().map(|(_, v)| *v).collect();
    let averages = moving_average(&values, window);
    TrendSeries {
        name,
        points: daily
            .into_iter()
            .zip(averages)
            .map(|((date, downloads), average)| TrendPoint {
                date,
                downloads,
                average,
            })
            .collect(),
    }
}

/// Moving-average series per platform, followed by a "Combined" series.
///
/// Averages run over observed report dates; missing days are not zero-filled.
pub fn trend_series(dataset: &Dataset, window: usize) -> Vec<TrendSeries> {
    let totals = daily_totals(dataset);
    let mut by_platform: BTreeMap<Platform, Vec<(NaiveDate, u64)>> = BTreeMap::new();
    for t in totals {
        by_platform.entry(t.platform).or_default().push((t.date, t.downloads));
    }

    let mut series: Vec<TrendSeries> = by_platform
        .into_iter()
        .map(|(platform, daily)| to_series(platform.label().to_string(), daily, window))
        .collect();

    if !dataset.is_empty() {
        series.push(to_series("Combined".into(), combined_daily(dataset), window));
    }
    series
}

// ─── Snapshot ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSnapshot {
    pub platform: Platform,
    /// Downloads on the latest report date.
    pub today: u64,
    /// Downloads on the calendar day before it.
    pub yesterday: u64,
    /// Last reported cumulative total on the latest date, 0 if none.
    pub cumulative: u64,
}

impl PlatformSnapshot {
    pub fn delta(&self) -> i128 {
        i128::from(self.today) - i128::from(self.yesterday)
    }
}

/// Stat pills under the hero cards, over combined daily totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlineStats {
    /// Mean of the last 7 report dates.
    pub avg_7: f64,
    /// Mean of the last 30 report dates.
    pub avg_30: f64,
    /// Latest day versus `avg_7`, in percent. 0 when `avg_7` is 0.
    pub pct_vs_avg_7: f64,
    /// Highest combined daily total.
    pub best_day: u64,
}

impl HeadlineStats {
    fn from_daily(daily: &[(NaiveDate, u64)], today: u64) -> Self {
        let avg_7 = tail_mean(daily, 7);
        let pct_vs_avg_7 = if avg_7 > 0.0 {
            (today as f64 / avg_7 - 1.0) * 100.0
        } else {
            0.0
        };
        Self {
            avg_7,
            avg_30: tail_mean(daily, 30),
            pct_vs_avg_7,
            best_day: daily.iter().map(|(_, v)| *v).max().unwrap_or(0),
        }
    }
}

fn tail_mean(daily: &[(NaiveDate, u64)], n: usize) -> f64 {
    let tail = &daily[daily.len().saturating_sub(n)..];
    if tail.is_empty() {
        return 0.0;
    }
    let sum: u128 = tail.iter().map(|(_, v)| u128::from(*v)).sum();
    sum as f64 / tail.len() as f64
}

/// Headline figures for the most recent report date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub latest_date: NaiveDate,
    pub platforms: Vec<PlatformSnapshot>,
    pub stats: HeadlineStats,
}

impl Snapshot {
    /// Build the snapshot for the latest report date, or `None` if empty.
    pub fn latest(dataset: &Dataset) -> Option<Snapshot> {
        let latest_date = dataset.records.iter().map(|r| r.report_date).max()?;
        let yesterday = latest_date - Duration::days(1);

        let mut platforms: Vec<Platform> = HEADLINE_PLATFORMS.to_vec();
        for p in dataset.platforms() {
            if !platforms.contains(&p) {
                platforms.push(p);
            }
        }

        let platforms = platforms
            .into_iter()
            .map(|platform| {
                let rows = dataset.records.iter().filter(|r| r.platform == platform);
                let mut snap = PlatformSnapshot {
                    platform: platform.clone(),
                    today: 0,
                    yesterday: 0,
                    cumulative: 0,
                };
                for r in rows {
                    if r.report_date == latest_date {
                        snap.today = snap.today.saturating_add(r.daily_downloads);
                        if let Some(total) = r.cumulative_total {
                            snap.cumulative = total;
                        }
                    } else if r.report_date == yesterday {
                        snap.yesterday = snap.yesterday.saturating_add(r.daily_downloads);
                    }
                }
                snap
            })
            .collect::<Vec<_>>();

        let today = saturating_sum(platforms.iter().map(|p| p.today));
        let stats = HeadlineStats::from_daily(&combined_daily(dataset), today);

        Some(Snapshot {
            latest_date,
            platforms,
            stats,
        })
    }

    pub fn combined_today(&self) -> u64 {
        saturating_sum(self.platforms.iter().map(|p| p.today))
    }

    pub fn combined_yesterday(&self) -> u64 {
        saturating_sum(self.platforms.iter().map(|p| p.yesterday))
    }

    pub fn combined_delta(&self) -> i128 {
        i128::from(self.combined_today()) - i128::from(self.combined_yesterday())
    }

    pub fn grand_total(&self) -> u64 {
        saturating_sum(self.platforms.iter().map(|p| p.cumulative))
    }
}

fn saturating_sum(values: impl Iterator<Item = u64>) -> u64 {
    values.fold(0, u64::saturating_add)
}

// ─── Growth ─────────────────────────────────────────────────────────

/// Cumulative totals of one platform, ordered by report date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthSeries {
    pub platform: Platform,
    pub points: Vec<(NaiveDate, u64)>,
}

/// One growth line per platform that reports a `cumulative_total`.
///
/// Rows without a total are skipped. Rows sharing a report date keep their
/// source order.
pub fn growth_series(dataset: &Dataset) -> Vec<GrowthSeries> {
    let mut by_platform: BTreeMap<Platform, Vec<(NaiveDate, u64)>> = BTreeMap::new();
    for r in &dataset.records {
        if let Some(total) = r.cumulative_total {
            by_platform
                .entry(r.platform.clone())
                .or_default()
                .push((r.report_date, total));
        }
    }

    by_platform
        .into_iter()
        .map(|(platform, mut points)| {
            points.sort_by_key(|(date, _)| *date);
            GrowthSeries { platform, points }
        })
        .collect()
}
