//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input validation types (`KeywordSet`, `Granularity`, `MissingValuePolicy`)
//! - the series value objects (`InterestSeries`, `ShareSeries`, `AggregatedShareSeries`)
//! - aggregate views (`YearlySnapshot`, `YoyTable`)
//! - run configuration (`RunConfig`)

pub mod types;

pub use types::*;
