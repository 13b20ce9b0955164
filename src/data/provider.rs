//! The boundary to whatever supplies raw interest series.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{InterestSeries, KeywordSet, MissingValuePolicy};
use crate::error::AppError;
use crate::io::ingest::load_interest_csv;

/// What to fetch: keywords over a date range for one region and language.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FetchRequest {
    pub keywords: KeywordSet,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// ISO 3166 alpha-2 code, e.g. `SK`.
    pub region: String,
    /// Host language, e.g. `sk-SK`.
    pub language: String,
}

impl FetchRequest {
    pub fn new(
        keywords: KeywordSet,
        start: NaiveDate,
        end: NaiveDate,
        region: impl Into<String>,
        language: impl Into<String>,
    ) -> Result<Self, AppError> {
        if end < start {
            return Err(AppError::new(
                2,
                format!("Invalid date range: end {end} is before start {start}."),
            ));
        }
        Ok(Self {
            keywords,
            start,
            end,
            region: region.into(),
            language: language.into(),
        })
    }

    /// `YYYY-MM-DD YYYY-MM-DD`, the timeframe notation trends services use.
    pub fn timeframe(&self) -> String {
        format!("{} {}", self.start.format("%Y-%m-%d"), self.end.format("%Y-%m-%d"))
    }
}

/// Supplies one raw interest value per keyword per timestamp.
pub trait RawSeriesProvider {
    /// Short name for logs and reports.
    fn name(&self) -> &str;

    fn fetch(&self, request: &FetchRequest) -> Result<InterestSeries, AppError>;
}

/// Reads a trends-style CSV export from disk.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    path: PathBuf,
    missing_values: MissingValuePolicy,
    name: String,
}

impl CsvProvider {
    pub fn new(path: impl Into<PathBuf>, missing_values: MissingValuePolicy) -> Self {
        let path = path.into();
        let name = format!("csv:{}", path.display());
        Self {
            path,
            missing_values,
            name,
        }
    }
}

impl RawSeriesProvider for CsvProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, request: &FetchRequest) -> Result<InterestSeries, AppError> {
        let ingested = load_interest_csv(
            &self.path,
            Some(&request.keywords),
            Some((request.start, request.end)),
            self.missing_values,
        )?;

        for err in &ingested.row_errors {
            tracing::warn!(line = err.line, "skipped CSV row: {}", err.message);
        }
        tracing::info!(
            path = %self.path.display(),
            rows_read = ingested.rows_read,
            rows_used = ingested.rows_used,
            "loaded interest series"
        );

        Ok(ingested.series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn timeframe_format() {
        let kws = KeywordSet::parse("Adidas, Nike").unwrap();
        let req = FetchRequest::new(kws, d(2020, 1, 1), d(2025, 3, 9), "SK", "sk-SK").unwrap();
        assert_eq!(req.timeframe(), "2020-01-01 2025-03-09");
    }

    #[test]
    fn rejects_inverted_range() {
        let kws = KeywordSet::parse("Adidas").unwrap();
        let err = FetchRequest::new(kws, d(2025, 1, 1), d(2024, 1, 1), "SK", "sk-SK").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn csv_provider_restricts_to_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trends.csv");
        std::fs::write(
            &path,
            "Week,Adidas,Nike,Puma\n2023-12-31,10,20,5\n2024-01-07,30,10,5\n2024-01-14,0,0,0\n",
        )
        .unwrap();

        let provider = CsvProvider::new(&path, MissingValuePolicy::Zero);
        let kws = KeywordSet::parse("Nike, Adidas").unwrap();
        let req = FetchRequest::new(kws, d(2024, 1, 1), d(2024, 12, 31), "SK", "sk-SK").unwrap();
        let series = provider.fetch(&req).unwrap();

        assert_eq!(series.keywords(), &["Nike", "Adidas"]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.rows()[0].values, vec![10.0, 30.0]);
        assert!(provider.name().starts_with("csv:"));
    }
}
