//! Deterministic synthetic interest series.
//!
//! Useful for demos and tests when no trends export is at hand. Each keyword
//! gets a base level, a linear yearly trend, a yearly seasonal cycle and
//! multiplicative log-normal noise. Values are rescaled so the largest cell is
//! 100 and rounded to integers, like trends exports. A small fraction of weeks
//! report no interest at all.

use std::collections::hash_map::DefaultHasher;
use std::f64::consts::TAU;
use std::hash::{Hash, Hasher};

use chrono::{Datelike, Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::provider::{FetchRequest, RawSeriesProvider};
use crate::domain::{InterestRow, InterestSeries};
use crate::error::AppError;

/// Log-scale noise applied to every weekly value.
const NOISE_SIGMA: f64 = 0.12;

/// Probability that a week has no recorded interest for any keyword.
const ZERO_WEEK_PROB: f64 = 0.01;

/// Seasonal amplitude relative to the keyword level.
const SEASONAL_AMPLITUDE: f64 = 0.2;

#[derive(Debug, Clone)]
pub struct SampleProvider {
    seed: u64,
}

impl SampleProvider {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl RawSeriesProvider for SampleProvider {
    fn name(&self) -> &str {
        "sample"
    }

    fn fetch(&self, request: &FetchRequest) -> Result<InterestSeries, AppError> {
        generate_sample(request, self.seed)
    }
}

struct KeywordProfile {
    level: f64,
    trend_per_year: f64,
    phase: f64,
}

/// Weekly series (Sundays) covering `request.start..=request.end`.
pub fn generate_sample(request: &FetchRequest, seed: u64) -> Result<InterestSeries, AppError> {
    let mut rng = StdRng::seed_from_u64(sample_seed(request, seed));
    let normal = Normal::new(0.0, NOISE_SIGMA)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let profiles: Vec<KeywordProfile> = request
        .keywords
        .iter()
        .map(|_| KeywordProfile {
            level: rng.gen_range(20.0..80.0),
            trend_per_year: rng.gen_range(-0.15..0.15),
            phase: rng.gen_range(0.0..TAU),
        })
        .collect();

    let mut raw: Vec<(NaiveDate, Vec<f64>)> = Vec::new();
    let mut date = first_sunday_on_or_after(request.start);
    while date <= request.end {
        let years = (date - request.start).num_days() as f64 / 365.25;
        let season = TAU * date.ordinal0() as f64 / 365.25;
        let zero_week = rng.gen_bool(ZERO_WEEK_PROB);

        let values = profiles
            .iter()
            .map(|p| {
                let noise = normal.sample(&mut rng);
                if zero_week {
                    return 0.0;
                }
                let trend = (1.0 + p.trend_per_year * years).max(0.05);
                let seasonal = 1.0 + SEASONAL_AMPLITUDE * (season + p.phase).sin();
                p.level * trend * seasonal * noise.exp()
            })
            .collect();
        raw.push((date, values));
        date += Duration::weeks(1);
    }

    let max = raw
        .iter()
        .flat_map(|(_, v)| v.iter().copied())
        .fold(0.0_f64, f64::max);
    let scale = if max > 0.0 { 100.0 / max } else { 0.0 };

    let rows = raw
        .into_iter()
        .map(|(date, values)| InterestRow {
            date,
            values: values.into_iter().map(|v| (v * scale).round()).collect(),
        })
        .collect();

    tracing::debug!(seed, keywords = %request.keywords, "generated synthetic interest series");
    Ok(InterestSeries::new(request.keywords.as_slice().to_vec(), rows)?)
}

fn first_sunday_on_or_after(date: NaiveDate) -> NaiveDate {
    let offset = (7 - date.weekday().num_days_from_sunday()) % 7;
    date + Duration::days(i64::from(offset))
}

fn sample_seed(request: &FetchRequest, seed: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    request.keywords.hash(&mut hasher);
    request.start.hash(&mut hasher);
    request.end.hash(&mut hasher);
    request.region.hash(&mut hasher);
    request.language.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::KeywordSet;
    use chrono::Weekday;

    fn request(keywords: &str) -> FetchRequest {
        FetchRequest::new(
            KeywordSet::parse(keywords).unwrap(),
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            "SK",
            "sk-SK",
        )
        .unwrap()
    }

    #[test]
    fn sample_is_reproducible_for_seed() {
        let req = request("Adidas, Nike, Puma");
        let a = generate_sample(&req, 7).unwrap();
        let b = generate_sample(&req, 7).unwrap();
        let c = generate_sample(&req, 8).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn sample_is_weekly_on_sundays_and_scaled() {
        let req = request("Adidas, Nike");
        let series = generate_sample(&req, 42).unwrap();

        assert_eq!(series.keywords(), &["Adidas", "Nike"]);
        assert!(series.len() > 150);
        for row in series.rows() {
            assert_eq!(row.date.weekday(), Weekday::Sun);
            assert!(row.date >= req.start && row.date <= req.end);
            for v in &row.values {
                assert!((0.0..=100.0).contains(v));
                assert_eq!(v.fract(), 0.0);
            }
        }
        let max = series
            .rows()
            .iter()
            .flat_map(|r| r.values.iter().copied())
            .fold(0.0, f64::max);
        assert_eq!(max, 100.0);
    }

    #[test]
    fn first_sunday() {
        let sat = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        assert_eq!(first_sunday_on_or_after(sat), NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
        let sun = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        assert_eq!(first_sunday_on_or_after(sun), sun);
    }
}
