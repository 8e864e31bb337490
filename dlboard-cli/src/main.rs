//! DLBoard CLI — load the downloads CSV and print dashboard views.
//!
//! Commands:
//! - `load` — fetch and parse once, print the records (table or JSON)
//! - `summary` — latest-day snapshot, platform split, 7-day trend and growth
//! - `watch` — reload on a fixed interval and report when the data changes

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use dlboard_core::data::{DataLoader, LoadOutcome};
use dlboard_core::summary::{
    growth_series, platform_split, trend_series, DatasetFilter, GrowthSeries, Snapshot,
    TrendSeries, TREND_WINDOW,
};
use dlboard_core::{Dataset, LoaderConfig, Platform};
use std::cmp::Ordering;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "dlboard",
    about = "DLBoard CLI — App Store / Google Play download dashboard data"
)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// TOML config file. Without it, settings come from the environment.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Source location: an http(s) URL, a local path, or "" for the fallback file.
    #[arg(long, global = true)]
    source: Option<String>,

    /// HTTP timeout in seconds.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the CSV once and print its records.
    Load {
        /// Print JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the latest-day snapshot, platform split, trend and growth.
    Summary {
        /// First report date to include (YYYY-MM-DD).
        #[arg(long)]
        from: Option<String>,

        /// Last report date to include (YYYY-MM-DD).
        #[arg(long)]
        to: Option<String>,

        /// Only include one platform (e.g. appstore, googleplay).
        #[arg(long)]
        platform: Option<String>,
    },
    /// Reload on a fixed interval.
    Watch {
        /// Seconds between reloads.
        #[arg(long, default_value_t = 300)]
        interval_secs: u64,

        /// Stop after this many cycles.
        #[arg(long)]
        max_cycles: Option<u64>,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = resolve_config(&cli.source)?;
    info!(source = %config.source.describe(), "configuration resolved");
    let loader = DataLoader::new(config);

    match cli.command {
        Commands::Load { json } => run_load(&loader, json),
        Commands::Summary { from, to, platform } => run_summary(&loader, from, to, platform),
        Commands::Watch {
            interval_secs,
            max_cycles,
        } => run_watch(&loader, interval_secs, max_cycles),
    }
}

fn init_logging() {
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,dlboard_core=info,dlboard=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(args: &SourceArgs) -> Result<LoaderConfig> {
    let mut config = match &args.config {
        Some(path) => LoaderConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LoaderConfig::from_env().context("reading configuration from environment")?,
    };

    if let Some(raw) = &args.source {
        config = config.with_source(raw)?;
    }
    if let Some(secs) = args.timeout_secs {
        anyhow::ensure!(secs > 0, "--timeout-secs must be positive");
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

fn reload(loader: &DataLoader) -> Result<LoadOutcome> {
    loader
        .reload()
        .context("No data available. Check your CSV source configuration")
}

fn run_load(loader: &DataLoader, json: bool) -> Result<()> {
    let outcome = reload(loader)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.dataset.records)?);
        return Ok(());
    }

    print_records(&outcome.dataset);
    println!();
    println!(
        "{} record(s) from {} ({})",
        outcome.dataset.len(),
        outcome.location,
        format_size(outcome.byte_len as u64)
    );
    Ok(())
}

fn run_summary(
    loader: &DataLoader,
    from: Option<String>,
    to: Option<String>,
    platform: Option<String>,
) -> Result<()> {
    let filter = DatasetFilter {
        start: from.as_deref().map(parse_date).transpose()?,
        end: to.as_deref().map(parse_date).transpose()?,
        platform: platform.as_deref().map(Platform::parse),
    };

    let outcome = reload(loader)?;
    let dataset = &outcome.dataset;

    // The snapshot always reflects the latest day, regardless of filters.
    match Snapshot::latest(dataset) {
        Some(snapshot) => print_snapshot(&snapshot),
        None => {
            println!("No data available.");
            return Ok(());
        }
    }

    let filtered = filter.apply(dataset);
    if filtered.is_empty() {
        println!("No data for the selected filters.");
        return Ok(());
    }

    print_split(&filtered);
    print_trend(&trend_series(&filtered, TREND_WINDOW));
    print_growth(&growth_series(&filtered));
    Ok(())
}

fn run_watch(loader: &DataLoader, interval_secs: u64, max_cycles: Option<u64>) -> Result<()> {
    anyhow::ensure!(interval_secs > 0, "--interval-secs must be positive");
    let interval = Duration::from_secs(interval_secs);
    let mut last_fingerprint: Option<String> = None;
    let mut cycle: u64 = 0;

    loop {
        cycle += 1;
        match loader.reload() {
            Ok(outcome) => {
                let changed = last_fingerprint.as_deref() != Some(outcome.fingerprint.as_str());
                if changed {
                    let latest = outcome
                        .dataset
                        .date_range()
                        .map(|(_, max)| max.to_string())
                        .unwrap_or_else(|| "-".into());
                    info!(
                        cycle,
                        records = outcome.dataset.len(),
                        %latest,
                        "data changed"
                    );
                } else {
                    info!(cycle, "data unchanged");
                }
                last_fingerprint = Some(outcome.fingerprint);
            }
            // One failed cycle does not stop the loop.
            Err(e) => error!(cycle, error = %e, "reload failed"),
        }

        if max_cycles.is_some_and(|max| cycle >= max) {
            return Ok(());
        }
        std::thread::sleep(interval);
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

// ─── Output ─────────────────────────────────────────────────────────

fn print_records(dataset: &Dataset) {
    println!("{:<12} {:<18} {:>10} {:>12}", "Date", "Platform", "Daily", "Total");
    println!("{}", "-".repeat(55));
    for r in &dataset.records {
        let total = r
            .cumulative_total
            .map(format_count)
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<12} {:<18} {:>10} {:>12}",
            r.report_date.to_string(),
            r.platform.label(),
            format_count(r.daily_downloads),
            total
        );
    }
}

fn print_snapshot(snapshot: &Snapshot) {
    println!("=== Latest data: {} ===", snapshot.latest_date.format("%B %d, %Y"));
    for p in &snapshot.platforms {
        println!(
            "{:<18} {:>10}  {:<22} Total: {}",
            p.platform.label(),
            format_count(p.today),
            format_delta(p.today, p.yesterday),
            format_count(p.cumulative)
        );
    }
    println!(
        "{:<18} {:>10}  {:<22} Grand Total: {}",
        "Combined",
        format_count(snapshot.combined_today()),
        format_delta(snapshot.combined_today(), snapshot.combined_yesterday()),
        format_count(snapshot.grand_total())
    );

    let stats = &snapshot.stats;
    println!(
        "7-day avg: {:.0} | 30-day avg: {:.0} | vs 7-day avg: {:+.1}% | Best day: {}",
        stats.avg_7,
        stats.avg_30,
        stats.pct_vs_avg_7,
        format_count(stats.best_day)
    );
    println!();
}

fn print_split(dataset: &Dataset) {
    let split = platform_split(dataset);
    let total = split.iter().fold(0u64, |acc, (_, n)| acc.saturating_add(*n));
    println!("--- Platform split ---");
    for (platform, n) in &split {
        let pct = if total > 0 {
            *n as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        println!("{:<18} {:>10} {:>6.1}%", platform.label(), format_count(*n), pct);
    }
    println!();
}

fn print_trend(series: &[TrendSeries]) {
    println!("--- {TREND_WINDOW}-day trend ---");
    for s in series {
        let Some(last) = s.points.last() else {
            continue;
        };
        println!(
            "{:<18} last {} {:>8}  avg {:>8.1}",
            s.name,
            last.date,
            format_count(last.downloads),
            last.average
        );
    }
}

fn print_growth(series: &[GrowthSeries]) {
    if series.is_empty() {
        return;
    }
    println!();
    println!("--- Cumulative growth ---");
    for s in series {
        let (Some((first_date, first)), Some((last_date, last))) =
            (s.points.first(), s.points.last())
        else {
            continue;
        };
        println!(
            "{:<18} {} {:>10} -> {} {:>10}",
            s.platform.label(),
            first_date,
            format_count(*first),
            last_date,
            format_count(*last)
        );
    }
}

/// Day-over-day change. "--" when there is nothing to compare against.
fn format_delta(current: u64, previous: u64) -> String {
    if previous == 0 {
        return "--".to_string();
    }
    match current.cmp(&previous) {
        Ordering::Greater => format!("▲ +{} vs yesterday", format_count(current - previous)),
        Ordering::Less => format!("▼ -{} vs yesterday", format_count(previous - current)),
        Ordering::Equal => "0 vs yesterday".to_string(),
    }
}

fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn source_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["dlboard", "load", "--source", "", "--json"]).unwrap();
        assert_eq!(cli.source.source.as_deref(), Some(""));
        assert!(matches!(cli.command, Commands::Load { json: true }));
    }

    #[test]
    fn watch_defaults_to_five_minutes() {
        let cli = Cli::try_parse_from(["dlboard", "watch"]).unwrap();
        match cli.command {
            Commands::Watch {
                interval_secs,
                max_cycles,
            } => {
                assert_eq!(interval_secs, 300);
                assert_eq!(max_cycles, None);
            }
            _ => panic!("expected watch"),
        }
    }

    #[test]
    fn counts_are_grouped() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(18396), "18,396");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn deltas_have_direction() {
        assert_eq!(format_delta(15, 10), "▲ +5 vs yesterday");
        assert_eq!(format_delta(800, 2000), "▼ -1,200 vs yesterday");
        assert_eq!(format_delta(7, 7), "0 vs yesterday");
        assert_eq!(
            format_delta(u64::MAX, 1),
            format!("▲ +{} vs yesterday", format_count(u64::MAX - 1))
        );
    }

    #[test]
    fn delta_without_yesterday_is_dashes() {
        assert_eq!(format_delta(42, 0), "--");
        assert_eq!(format_delta(0, 0), "--");
    }

    #[test]
    fn source_override_beats_config() {
        let args = SourceArgs {
            config: None,
            source: Some(String::new()),
            timeout_secs: Some(2),
        };
        // Environment may carry GITHUB_CSV_URL; the override wins either way.
        let config = resolve_config(&args).unwrap();
        assert!(!config.source.is_remote());
        assert_eq!(config.timeout, Duration::from_secs(2));
    }
}
