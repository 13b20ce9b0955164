//! Shared analysis pipeline used by every CLI subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! provider fetch -> normalize -> {resample, yearly -> YoY, year snapshots}
//!
//! The front-end can then focus on presentation (tables, charts, exports).

use std::time::Duration;

use chrono::Datelike;

use crate::data::{CachedProvider, CsvProvider, FetchRequest, RawSeriesProvider, SampleProvider};
use crate::domain::{AggregatedShareSeries, Granularity, KeywordSet, RunConfig, ShareSeries, SourceSpec, YoyTable};
use crate::error::AppError;
use crate::io::ingest::read_csv_keywords;
use crate::sos::{PeriodComparison, compare_years, compute_yoy, normalize, resample};

/// All computed outputs of a single analysis run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub request: FetchRequest,
    pub provider: String,
    /// Rows in the raw series before zero-total rows were dropped.
    pub raw_rows: usize,
    pub shares: ShareSeries,
    /// Shares at the requested granularity.
    pub aggregated: AggregatedShareSeries,
    pub yearly: AggregatedShareSeries,
    pub yoy: YoyTable,
    pub comparison: PeriodComparison,
}

impl RunOutput {
    /// `true` when no row survived normalization.
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }
}

/// Runs analyses against one provider, reusing fetched series while they are
/// younger than the cache TTL.
pub struct Analyzer<P> {
    provider: CachedProvider<P>,
}

impl<P: RawSeriesProvider> Analyzer<P> {
    pub fn new(provider: P, cache_ttl: Duration) -> Self {
        Self {
            provider: CachedProvider::new(provider, cache_ttl),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Fetch `request` and derive every share view from it.
    ///
    /// An empty series is not an error here; callers decide how to present
    /// "no data" (see [`RunOutput::is_empty`]).
    pub fn run(&self, request: &FetchRequest, granularity: Granularity) -> Result<RunOutput, AppError> {
        let series = self.provider.fetch(request)?;
        let shares = normalize(&series, &request.keywords)?;
        let aggregated = resample(&shares, granularity);
        let yearly = resample(&shares, Granularity::Year);
        let yoy = compute_yoy(&yearly)?;
        let comparison = compare_years(&shares, request.end.year());

        tracing::info!(
            provider = self.provider.name(),
            raw_rows = series.len(),
            share_rows = shares.len(),
            buckets = aggregated.buckets().len(),
            years = yearly.buckets().len(),
            "share of search computed"
        );

        Ok(RunOutput {
            request: request.clone(),
            provider: self.provider.name().to_string(),
            raw_rows: series.len(),
            shares,
            aggregated,
            yearly,
            yoy,
            comparison,
        })
    }
}

/// Resolve the keyword set for a run.
///
/// Explicit keywords win; a CSV source without them contributes its columns.
/// Either way the set is validated before anything is fetched.
pub fn resolve_keywords(config: &RunConfig) -> Result<KeywordSet, AppError> {
    if let Some(kws) = &config.keywords {
        return Ok(kws.clone());
    }
    match &config.source {
        SourceSpec::Csv(path) => Ok(KeywordSet::new(read_csv_keywords(path)?)?),
        SourceSpec::Sample { .. } => Err(AppError::new(2, "The sample source requires `--keywords`.")),
    }
}

/// Build the fetch request described by `config`.
pub fn build_request(config: &RunConfig) -> Result<FetchRequest, AppError> {
    let keywords = resolve_keywords(config)?;
    FetchRequest::new(
        keywords,
        config.start,
        config.end,
        config.region.clone(),
        config.language.clone(),
    )
}

/// Execute the full pipeline for `config`.
pub fn run_analysis(config: &RunConfig) -> Result<RunOutput, AppError> {
    let request = build_request(config)?;
    tracing::info!(
        keywords = %request.keywords,
        timeframe = %request.timeframe(),
        region = %request.region,
        language = %request.language,
        "starting analysis"
    );

    match &config.source {
        SourceSpec::Csv(path) => {
            Analyzer::new(CsvProvider::new(path, config.missing_values), config.cache_ttl)
                .run(&request, config.granularity)
        }
        SourceSpec::Sample { seed } => {
            Analyzer::new(SampleProvider::new(*seed), config.cache_ttl).run(&request, config.granularity)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DEFAULT_CACHE_TTL;
    use crate::domain::{InterestRow, InterestSeries, MissingValuePolicy};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// A: 40% of interest in 2022, 60% in 2023; one zero week in 2023.
    struct FixedProvider {
        calls: AtomicUsize,
    }

    impl RawSeriesProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn fetch(&self, request: &FetchRequest) -> Result<InterestSeries, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let rows = vec![
                InterestRow { date: d(2022, 3, 6), values: vec![40.0, 60.0] },
                InterestRow { date: d(2022, 9, 4), values: vec![20.0, 30.0] },
                InterestRow { date: d(2023, 2, 5), values: vec![60.0, 40.0] },
                InterestRow { date: d(2023, 2, 12), values: vec![0.0, 0.0] },
                InterestRow { date: d(2023, 5, 7), values: vec![30.0, 20.0] },
            ];
            Ok(InterestSeries::new(request.keywords.as_slice().to_vec(), rows)?)
        }
    }

    fn request() -> FetchRequest {
        FetchRequest::new(KeywordSet::parse("A, B").unwrap(), d(2022, 1, 1), d(2023, 12, 31), "SK", "sk-SK")
            .unwrap()
    }

    #[test]
    fn analyzer_derives_every_view() {
        let analyzer = Analyzer::new(FixedProvider { calls: AtomicUsize::new(0) }, DEFAULT_CACHE_TTL);
        let run = analyzer.run(&request(), Granularity::Month).unwrap();

        assert_eq!(run.raw_rows, 5);
        assert_eq!(run.shares.len(), 4);
        assert_eq!(run.aggregated.buckets().len(), 4);
        assert_eq!(run.yearly.buckets().len(), 2);
        assert!((run.yoy.get("A", 2023).unwrap() - 50.0).abs() < 1e-9);
        assert_eq!(run.yoy.get("A", 2022), None);

        assert_eq!(run.comparison.current_year, 2023);
        let current = run.comparison.current.as_ref().unwrap();
        assert!((current.get("A").unwrap() - 60.0).abs() < 1e-9);
        assert!(run.comparison.previous.is_some());
        assert!(!run.is_empty());
    }

    #[test]
    fn analyzer_reuses_cached_series() {
        let analyzer = Analyzer::new(FixedProvider { calls: AtomicUsize::new(0) }, DEFAULT_CACHE_TTL);
        analyzer.run(&request(), Granularity::Month).unwrap();
        analyzer.run(&request(), Granularity::Quarter).unwrap();
        assert_eq!(analyzer.provider.inner().calls.load(Ordering::SeqCst), 1);
        assert_eq!(analyzer.provider_name(), "fixed");
    }

    fn config(source: SourceSpec, keywords: Option<&str>) -> RunConfig {
        RunConfig {
            source,
            keywords: keywords.map(|k| KeywordSet::parse(k).unwrap()),
            start: d(2021, 1, 1),
            end: d(2023, 12, 31),
            region: "SK".to_string(),
            language: "sk-SK".to_string(),
            granularity: Granularity::Quarter,
            missing_values: MissingValuePolicy::Zero,
            cache_ttl: DEFAULT_CACHE_TTL,
            plot: false,
            plot_width: 60,
            plot_height: 12,
            export_csv: None,
            export_shares: None,
            export_json: None,
        }
    }

    #[test]
    fn sample_source_requires_keywords() {
        let err = build_request(&config(SourceSpec::Sample { seed: 1 }, None)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn csv_source_with_too_many_columns_is_rejected_before_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("six.csv");
        std::fs::write(&path, "Week,a,b,c,d,e,f\n2022-01-02,1,1,1,1,1,1\n").unwrap();

        let err = run_analysis(&config(SourceSpec::Csv(path), None)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("Invalid keyword set"));
    }

    #[test]
    fn sample_run_end_to_end() {
        let run = run_analysis(&config(SourceSpec::Sample { seed: 3 }, Some("Adidas, Nike, Puma"))).unwrap();
        assert_eq!(run.provider, "sample");
        assert!(!run.is_empty());
        assert_eq!(run.yearly.buckets().len(), 3);
        for row in run.shares.rows() {
            assert!((row.total() - 100.0).abs() < 1e-6);
        }
        assert_eq!(run.comparison.current_year, 2023);
        assert_eq!(run.yoy.get("Adidas", 2021), None);
        assert!(run.yoy.get("Adidas", 2022).is_some());
    }
}
