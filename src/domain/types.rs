//! Shared domain types.
//!
//! Every series type here is an immutable value object: constructors validate
//! the invariants once, and the transforms in `crate::sos` only ever produce
//! new values.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::SosError;

/// Upper bound on keywords compared at once (imposed by the trends provider).
pub const MAX_KEYWORDS: usize = 5;

/// Tolerance used when checking that a share row sums to 100.
pub const SHARE_TOLERANCE: f64 = 1e-6;

/// An ordered set of 1..=5 distinct, non-empty keywords.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct KeywordSet(Vec<String>);

impl KeywordSet {
    /// Validate and build a keyword set. Keywords are trimmed; order is kept.
    pub fn new<I, S>(keywords: I) -> Result<Self, SosError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for kw in keywords {
            let kw = kw.as_ref().trim();
            if kw.is_empty() {
                return Err(SosError::InvalidKeywordSet(
                    "keywords must be non-empty strings".to_string(),
                ));
            }
            if out.iter().any(|k| k.eq_ignore_ascii_case(kw)) {
                return Err(SosError::InvalidKeywordSet(format!("duplicate keyword `{kw}`")));
            }
            out.push(kw.to_string());
        }

        if out.is_empty() {
            return Err(SosError::InvalidKeywordSet(
                "at least one keyword is required".to_string(),
            ));
        }
        if out.len() > MAX_KEYWORDS {
            return Err(SosError::InvalidKeywordSet(format!(
                "at most {MAX_KEYWORDS} keywords can be compared at once (got {})",
                out.len()
            )));
        }

        Ok(Self(out))
    }

    /// Parse comma-separated user input (`"Adidas, Nike, Puma"`).
    ///
    /// Empty pieces (`"a,,b"`, trailing commas) are ignored.
    pub fn parse(input: &str) -> Result<Self, SosError> {
        Self::new(input.split(',').map(str::trim).filter(|s| !s.is_empty()))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for KeywordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

/// Time-bucket width used when aggregating a share series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Month,
    Quarter,
    Year,
}

impl Granularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Month => "month",
            Granularity::Quarter => "quarter",
            Granularity::Year => "year",
        }
    }

    /// Human-readable adjective for report headings.
    pub fn display_name(self) -> &'static str {
        match self {
            Granularity::Month => "Monthly",
            Granularity::Quarter => "Quarterly",
            Granularity::Year => "Yearly",
        }
    }

    /// The calendar bucket of this width that contains `date`.
    pub fn period_of(self, date: NaiveDate) -> Period {
        let index = match self {
            Granularity::Month => date.month(),
            Granularity::Quarter => date.month0() / 3 + 1,
            Granularity::Year => 1,
        };
        Period {
            granularity: self,
            year: date.year(),
            index,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = SosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "month" | "monthly" | "m" => Ok(Granularity::Month),
            "quarter" | "quarterly" | "q" => Ok(Granularity::Quarter),
            "year" | "yearly" | "annual" | "y" => Ok(Granularity::Year),
            _ => Err(SosError::UnrecognizedGranularity(s.to_string())),
        }
    }
}

/// A calendar bucket: one month, one quarter, or one year.
///
/// Buckets close at the period end, so the last day of a month still belongs
/// to that month. Ordering is chronological for periods of the same width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    granularity: Granularity,
    year: i32,
    /// Month (1-12), quarter (1-4), or 1 for a whole year.
    index: u32,
}

impl Period {
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.granularity.period_of(date) == *self
    }

    /// First day of the period.
    pub fn start(&self) -> Option<NaiveDate> {
        let month = match self.granularity {
            Granularity::Month => self.index,
            Granularity::Quarter => (self.index - 1) * 3 + 1,
            Granularity::Year => 1,
        };
        NaiveDate::from_ymd_opt(self.year, month, 1)
    }

    /// Last day of the period (the bucket label used by end-closed resampling).
    pub fn end(&self) -> Option<NaiveDate> {
        let months = match self.granularity {
            Granularity::Month => 1,
            Granularity::Quarter => 3,
            Granularity::Year => 12,
        };
        self.start()?
            .checked_add_months(chrono::Months::new(months))?
            .pred_opt()
    }

    pub fn label(&self) -> String {
        match self.granularity {
            Granularity::Month => format!("{:04}-{:02}", self.year, self.index),
            Granularity::Quarter => format!("{:04}-Q{}", self.year, self.index),
            Granularity::Year => format!("{:04}", self.year),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

/// One timestamp of raw interest values, in column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterestRow {
    pub date: NaiveDate,
    pub values: Vec<f64>,
}

/// Raw per-keyword interest over time.
///
/// Invariants: dates strictly increasing, one finite non-negative value per
/// column on every row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterestSeries {
    keywords: Vec<String>,
    rows: Vec<InterestRow>,
}

impl InterestSeries {
    pub fn new(keywords: Vec<String>, rows: Vec<InterestRow>) -> Result<Self, SosError> {
        for (i, kw) in keywords.iter().enumerate() {
            if keywords[..i].contains(kw) {
                return Err(SosError::InvalidSeries(format!("duplicate column `{kw}`")));
            }
        }

        for (i, row) in rows.iter().enumerate() {
            if row.values.len() != keywords.len() {
                return Err(SosError::InvalidSeries(format!(
                    "row {} has {} values, expected {}",
                    row.date,
                    row.values.len(),
                    keywords.len()
                )));
            }
            if let Some(v) = row.values.iter().find(|v| !(v.is_finite() && **v >= 0.0)) {
                return Err(SosError::InvalidSeries(format!(
                    "row {} has an invalid interest value {v} (must be finite and >= 0)",
                    row.date
                )));
            }
            if i > 0 && rows[i - 1].date >= row.date {
                return Err(SosError::InvalidSeries(format!(
                    "dates must be strictly increasing ({} follows {})",
                    row.date,
                    rows[i - 1].date
                )));
            }
        }

        Ok(Self { keywords, rows })
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn rows(&self) -> &[InterestRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, keyword: &str) -> Option<usize> {
        self.keywords.iter().position(|k| k == keyword)
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.rows.first()?.date, self.rows.last()?.date))
    }
}

/// One timestamp of percentage shares, in keyword order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareRow {
    pub date: NaiveDate,
    pub values: Vec<f64>,
}

impl ShareRow {
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// Percentage shares over time.
///
/// Every row either sums to 100 (within [`SHARE_TOLERANCE`]) or is all zeros.
/// The normalizer never emits all-zero rows; the constructor tolerates them so
/// that externally produced series can still be represented.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareSeries {
    keywords: Vec<String>,
    rows: Vec<ShareRow>,
}

impl ShareSeries {
    pub fn new(keywords: Vec<String>, rows: Vec<ShareRow>) -> Result<Self, SosError> {
        for (i, row) in rows.iter().enumerate() {
            if row.values.len() != keywords.len() {
                return Err(SosError::InvalidSeries(format!(
                    "share row {} has {} values, expected {}",
                    row.date,
                    row.values.len(),
                    keywords.len()
                )));
            }
            let total = row.total();
            let all_zero = row.values.iter().all(|v| *v == 0.0);
            if !all_zero && (total - 100.0).abs() > SHARE_TOLERANCE {
                return Err(SosError::InvalidSeries(format!(
                    "share row {} sums to {total}, expected 100",
                    row.date
                )));
            }
            if i > 0 && rows[i - 1].date >= row.date {
                return Err(SosError::InvalidSeries(format!(
                    "dates must be strictly increasing ({} follows {})",
                    row.date,
                    rows[i - 1].date
                )));
            }
        }
        Ok(Self { keywords, rows })
    }

    /// Build from rows the normalizer already guarantees are valid.
    pub(crate) fn from_normalized(keywords: Vec<String>, rows: Vec<ShareRow>) -> Self {
        Self { keywords, rows }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn rows(&self) -> &[ShareRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct calendar years covered by the series, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.rows.iter().map(|r| r.date.year()).collect();
        years.dedup();
        years
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.rows.first()?.date, self.rows.last()?.date))
    }
}

/// Mean shares for one calendar bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub period: Period,
    pub values: Vec<f64>,
    /// Number of share rows averaged into this bucket.
    pub rows: usize,
}

/// A share series resampled into calendar buckets. Empty buckets are absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedShareSeries {
    granularity: Granularity,
    keywords: Vec<String>,
    buckets: Vec<Bucket>,
}

impl AggregatedShareSeries {
    pub fn new(granularity: Granularity, keywords: Vec<String>, buckets: Vec<Bucket>) -> Result<Self, SosError> {
        for (i, bucket) in buckets.iter().enumerate() {
            if bucket.period.granularity() != granularity {
                return Err(SosError::GranularityMismatch {
                    expected: granularity.to_string(),
                    actual: bucket.period.granularity().to_string(),
                });
            }
            if bucket.values.len() != keywords.len() {
                return Err(SosError::InvalidSeries(format!(
                    "bucket {} has {} values, expected {}",
                    bucket.period,
                    bucket.values.len(),
                    keywords.len()
                )));
            }
            if i > 0 && buckets[i - 1].period >= bucket.period {
                return Err(SosError::InvalidSeries(format!(
                    "buckets must be in chronological order ({} follows {})",
                    bucket.period,
                    buckets[i - 1].period
                )));
            }
        }
        Ok(Self {
            granularity,
            keywords,
            buckets,
        })
    }

    /// Build from buckets the resampler already emits in order.
    pub(crate) fn from_resampled(granularity: Granularity, keywords: Vec<String>, buckets: Vec<Bucket>) -> Self {
        Self {
            granularity,
            keywords,
            buckets,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn bucket(&self, period: Period) -> Option<&Bucket> {
        self.buckets
            .binary_search_by(|b| b.period.cmp(&period))
            .ok()
            .map(|idx| &self.buckets[idx])
    }

    pub fn value(&self, keyword: &str, period: Period) -> Option<f64> {
        let col = self.keywords.iter().position(|k| k == keyword)?;
        self.bucket(period).map(|b| b.values[col])
    }
}

/// Mean share per keyword over one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlySnapshot {
    pub year: i32,
    pub keywords: Vec<String>,
    pub values: Vec<f64>,
    pub rows: usize,
}

impl YearlySnapshot {
    pub fn get(&self, keyword: &str) -> Option<f64> {
        let col = self.keywords.iter().position(|k| k == keyword)?;
        self.values.get(col).copied()
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.keywords.iter().map(String::as_str).zip(self.values.iter().copied())
    }
}

/// A defined year-over-year change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YoyEntry {
    pub keyword: String,
    pub year: i32,
    /// Percentage change against `year - 1`.
    pub change_pct: f64,
}

/// Year-over-year changes keyed by `(keyword, year)`.
///
/// Only defined changes are stored: the earliest year, years without a
/// preceding year, and zero prior-year values have no entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YoyTable {
    keywords: Vec<String>,
    years: Vec<i32>,
    entries: Vec<YoyEntry>,
}

/// One year of the combined share/YoY view, keyword-ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct YearColumns {
    pub year: i32,
    pub shares: Vec<f64>,
    pub yoy: Vec<Option<f64>>,
}

impl YoyTable {
    pub(crate) fn from_entries(keywords: Vec<String>, years: Vec<i32>, entries: Vec<YoyEntry>) -> Self {
        Self {
            keywords,
            years,
            entries,
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Every year of the underlying yearly series, ascending.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn entries(&self) -> &[YoyEntry] {
        &self.entries
    }

    pub fn get(&self, keyword: &str, year: i32) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.year == year && e.keyword == keyword)
            .map(|e| e.change_pct)
    }

    /// Pair each year's shares with its YoY changes, newest year first.
    pub fn interleaved_columns(&self, yearly: &AggregatedShareSeries) -> Vec<YearColumns> {
        let mut out: Vec<YearColumns> = yearly
            .buckets()
            .iter()
            .map(|b| YearColumns {
                year: b.period.year(),
                shares: b.values.clone(),
                yoy: yearly
                    .keywords()
                    .iter()
                    .map(|kw| self.get(kw, b.period.year()))
                    .collect(),
            })
            .collect();
        out.sort_by(|a, b| b.year.cmp(&a.year));
        out
    }
}

/// How ingestion treats a missing interest cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MissingValuePolicy {
    /// Count the cell as zero interest.
    Zero,
    /// Skip the whole row and report it as a row error.
    Reject,
}

/// Where the raw interest series comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Csv(PathBuf),
    Sample { seed: u64 },
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus `.env` / environment defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: SourceSpec,
    /// `None` means "every keyword column the source provides".
    pub keywords: Option<KeywordSet>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub region: String,
    pub language: String,
    pub granularity: Granularity,
    pub missing_values: MissingValuePolicy,
    pub cache_ttl: std::time::Duration,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_csv: Option<PathBuf>,
    pub export_shares: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}
