//! Sources of raw interest series.
//!
//! - `provider`: the `RawSeriesProvider` boundary + CSV-backed provider
//! - `sample`: deterministic synthetic series
//! - `cache`: TTL memoization in front of any provider

pub mod cache;
pub mod provider;
pub mod sample;

pub use cache::{CachedProvider, DEFAULT_CACHE_TTL};
pub use provider::{CsvProvider, FetchRequest, RawSeriesProvider};
pub use sample::{SampleProvider, generate_sample};
