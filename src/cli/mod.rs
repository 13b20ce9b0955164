//! Command-line parsing for the Share of Search tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! share computations; `app` turns the parsed arguments into a `RunConfig`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{Granularity, MissingValuePolicy};

/// Keywords used by `sos sample` when none are given.
pub const DEFAULT_KEYWORDS: &str = "Adidas, Nike, Reebok, Puma";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sos", version, about = "Share of Search analysis for competing keywords")]
pub struct Cli {
    /// Log filter (e.g. `info`, `share_of_search=debug`). Logs go to stderr.
    #[arg(long, global = true, env = "SOS_LOG", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a search-interest CSV export (one column per keyword).
    Analyze(AnalyzeArgs),
    /// Analyze a deterministic synthetic series (no data file needed).
    Sample(SampleArgs),
}

#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    /// CSV file with a date column and one interest column per keyword.
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: PathBuf,

    /// How to treat empty interest cells.
    #[arg(long, value_enum, default_value_t = MissingValuePolicy::Zero)]
    pub missing_values: MissingValuePolicy,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Random seed for the synthetic series.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Options shared by every analysis subcommand.
#[derive(Debug, Args, Clone)]
pub struct CommonArgs {
    /// Comma-separated keywords (at most 5), e.g. "Adidas, Nike".
    ///
    /// `analyze` defaults to every keyword column in the file.
    #[arg(short = 'k', long)]
    pub keywords: Option<String>,

    /// First day of the analysis window (default: Jan 1, five years ago).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub start: Option<NaiveDate>,

    /// Last day of the analysis window (default: today).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub end: Option<NaiveDate>,

    /// Region code passed to the data provider.
    #[arg(long, env = "SOS_REGION", default_value = "SK")]
    pub region: String,

    /// Interface language passed to the data provider.
    #[arg(long, env = "SOS_LANGUAGE", default_value = "sk-SK")]
    pub language: String,

    /// Aggregation bucket for the share table.
    #[arg(short = 'g', long, value_enum, default_value_t = Granularity::Month)]
    pub granularity: Granularity,

    /// How long fetched series stay cached (hours).
    #[arg(long, default_value_t = 6)]
    pub cache_ttl_hours: u64,

    /// Render ASCII charts in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal charts.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Line chart height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,

    /// Export the aggregated share table to CSV.
    #[arg(long)]
    pub export_csv: Option<PathBuf>,

    /// Export the per-date share series to CSV.
    #[arg(long)]
    pub export_shares: Option<PathBuf>,

    /// Export the full analysis (all views) to JSON.
    #[arg(long)]
    pub export_json: Option<PathBuf>,
}
