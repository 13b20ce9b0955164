//! Calendar-year snapshots and current-vs-previous year comparison.

use chrono::Datelike;
use serde::Serialize;

use crate::domain::{ShareSeries, YearlySnapshot};

/// Snapshots for a year and the year before it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodComparison {
    pub current_year: i32,
    pub current: Option<YearlySnapshot>,
    pub previous: Option<YearlySnapshot>,
}

impl PeriodComparison {
    pub fn previous_year(&self) -> i32 {
        self.current_year - 1
    }
}

/// Mean share per keyword over the rows dated in `year`.
///
/// Returns `None` when no row falls in the year, or when the means sum to zero
/// (nothing worth rendering).
pub fn snapshot(series: &ShareSeries, year: i32) -> Option<YearlySnapshot> {
    let mut sums = vec![0.0; series.keywords().len()];
    let mut rows = 0usize;
    for row in series.rows().iter().filter(|r| r.date.year() == year) {
        for (sum, v) in sums.iter_mut().zip(&row.values) {
            *sum += v;
        }
        rows += 1;
    }
    if rows == 0 {
        return None;
    }

    let values: Vec<f64> = sums.iter().map(|s| s / rows as f64).collect();
    if values.iter().sum::<f64>() <= 0.0 {
        return None;
    }

    Some(YearlySnapshot {
        year,
        keywords: series.keywords().to_vec(),
        values,
        rows,
    })
}

/// Snapshot `current_year` and `current_year - 1`.
pub fn compare_years(series: &ShareSeries, current_year: i32) -> PeriodComparison {
    PeriodComparison {
        current_year,
        current: snapshot(series, current_year),
        previous: snapshot(series, current_year - 1),
    }
}
