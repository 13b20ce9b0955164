//! Share-of-search transforms.
//!
//! Responsibilities:
//!
//! - normalize raw interest into per-timestamp shares (`normalize`)
//! - average shares into calendar buckets (`resample`)
//! - snapshot one calendar year and compare it with the previous one (`period`)
//! - year-over-year change of yearly shares (`yoy`)
//!
//! Everything here is a pure function over in-memory series.

pub mod normalize;
pub mod period;
pub mod resample;
pub mod yoy;

pub use normalize::normalize;
pub use period::{PeriodComparison, compare_years, snapshot};
pub use resample::resample;
pub use yoy::compute as compute_yoy;
