//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - runs the share-of-search pipeline
//! - prints reports/plots
//! - writes optional exports

use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command, CommonArgs, DEFAULT_KEYWORDS};
use crate::domain::{KeywordSet, MissingValuePolicy, RunConfig, SourceSpec};
use crate::error::AppError;

pub mod pipeline;

/// Years of history analyzed when `--start` is omitted.
const DEFAULT_HISTORY_YEARS: i32 = 5;

/// Entry point for the `sos` binary.
pub fn run() -> Result<(), AppError> {
    // Before parsing, so `.env` can feed the clap `env` fallbacks.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let today = chrono::Local::now().date_naive();
    let config = run_config_from_args(&cli.command, today)?;
    handle_analysis(&config)
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second init (e.g. from an embedding process) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn handle_analysis(config: &RunConfig) -> Result<(), AppError> {
    let run = pipeline::run_analysis(config)?;

    if run.is_empty() {
        return Err(AppError::new(
            3,
            format!(
                "No search interest for {} in {} (region {}).",
                run.request.keywords,
                run.request.timeframe(),
                run.request.region
            ),
        ));
    }

    println!("{}", crate::report::format_run_summary(&run));
    println!("{}", crate::report::format_comparison(&run.comparison));
    if config.plot {
        println!(
            "{}",
            crate::plot::render_comparison_bars(&run.comparison, config.plot_width / 2)
        );
    }

    println!("{}", crate::report::format_aggregated_table(&run.aggregated));
    if config.plot {
        println!(
            "{}",
            crate::plot::render_share_lines(&run.aggregated, config.plot_width, config.plot_height)
        );
    }

    println!("{}", crate::report::format_yoy_table(&run.yearly, &run.yoy));

    // Optional exports.
    if let Some(path) = &config.export_csv {
        crate::io::export::write_aggregated_csv(path, &run.aggregated)?;
    }
    if let Some(path) = &config.export_shares {
        crate::io::export::write_shares_csv(path, &run.shares)?;
    }
    if let Some(path) = &config.export_json {
        crate::io::report_json::write_report_json(path, &run)?;
    }

    Ok(())
}

/// Resolve parsed arguments into a `RunConfig`.
///
/// `today` anchors the default window (Jan 1 five years back through today).
/// Keywords are validated here, before any data is read.
pub fn run_config_from_args(command: &Command, today: NaiveDate) -> Result<RunConfig, AppError> {
    let (source, common, keywords, missing_values) = match command {
        Command::Analyze(args) => (
            SourceSpec::Csv(args.input.clone()),
            &args.common,
            args.common.keywords.as_deref(),
            args.missing_values,
        ),
        Command::Sample(args) => (
            SourceSpec::Sample { seed: args.seed },
            &args.common,
            Some(args.common.keywords.as_deref().unwrap_or(DEFAULT_KEYWORDS)),
            MissingValuePolicy::Zero,
        ),
    };

    let keywords = keywords.map(KeywordSet::parse).transpose()?;
    let (start, end) = resolve_window(common, today)?;

    Ok(RunConfig {
        source,
        keywords,
        start,
        end,
        region: common.region.clone(),
        language: common.language.clone(),
        granularity: common.granularity,
        missing_values,
        cache_ttl: Duration::from_secs(common.cache_ttl_hours.saturating_mul(60 * 60)),
        plot: common.plot && !common.no_plot,
        plot_width: common.width,
        plot_height: common.height,
        export_csv: common.export_csv.clone(),
        export_shares: common.export_shares.clone(),
        export_json: common.export_json.clone(),
    })
}

fn resolve_window(common: &CommonArgs, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), AppError> {
    let end = common.end.unwrap_or(today);
    let start = match common.start {
        Some(start) => start,
        None => NaiveDate::from_ymd_opt(today.year() - DEFAULT_HISTORY_YEARS, 1, 1)
            .ok_or_else(|| AppError::new(2, "Cannot derive a default start date."))?,
    };
    if end < start {
        return Err(AppError::new(
            2,
            format!("Start date {start} is after end date {end}."),
        ));
    }
    Ok((start, end))
}
