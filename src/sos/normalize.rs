//! Raw interest -> percentage shares.
//!
//! Each row is independent, so rows are evaluated in parallel; `collect` on an
//! indexed parallel iterator keeps the input order.

use rayon::prelude::*;

use crate::domain::{InterestSeries, KeywordSet, ShareRow, ShareSeries};
use crate::error::SosError;

/// Convert raw interest values into shares of the keyword total.
///
/// Rows whose total over `keywords` is zero are dropped rather than emitted as
/// all-zero rows, so they never drag down later averages. Columns of `series`
/// that are not in `keywords` are ignored.
pub fn normalize(series: &InterestSeries, keywords: &KeywordSet) -> Result<ShareSeries, SosError> {
    let columns = keywords
        .iter()
        .map(|kw| {
            series
                .column_index(kw)
                .ok_or_else(|| SosError::MissingKeyword(kw.to_string()))
        })
        .collect::<Result<Vec<usize>, SosError>>()?;

    let rows: Vec<ShareRow> = series
        .rows()
        .par_iter()
        .filter_map(|row| {
            let values: Vec<f64> = columns.iter().map(|&c| row.values[c]).collect();
            let max = values.iter().copied().fold(0.0_f64, f64::max);
            if max <= 0.0 {
                return None;
            }
            // Relative to the row max the total stays in [1, 5], so huge raw
            // values cannot overflow the sum.
            let scaled: Vec<f64> = values.iter().map(|v| v / max).collect();
            let total: f64 = scaled.iter().sum();
            Some(ShareRow {
                date: row.date,
                values: scaled.iter().map(|v| v / total * 100.0).collect(),
            })
        })
        .collect();

    let dropped = series.len() - rows.len();
    if dropped > 0 {
        tracing::debug!(dropped, kept = rows.len(), "dropped zero-total rows during normalization");
    }

    Ok(ShareSeries::from_normalized(keywords.as_slice().to_vec(), rows))
}
