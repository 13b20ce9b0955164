//! Year-over-year change of yearly-averaged shares.

use crate::domain::{AggregatedShareSeries, Granularity, YoyEntry, YoyTable};
use crate::error::SosError;

/// Percentage change of each keyword's yearly share against the year before.
///
/// A change exists only when year `Y - 1` is present in `yearly` and its value
/// is non-zero, so the earliest year never has one. Missing changes are absent
/// from the table rather than stored as zero or infinity.
pub fn compute(yearly: &AggregatedShareSeries) -> Result<YoyTable, SosError> {
    if yearly.granularity() != Granularity::Year {
        return Err(SosError::GranularityMismatch {
            expected: Granularity::Year.to_string(),
            actual: yearly.granularity().to_string(),
        });
    }

    let buckets = yearly.buckets();
    let mut entries = Vec::new();
    for pair in buckets.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        let year = cur.period.year();
        if prev.period.year() != year - 1 {
            continue;
        }
        for (col, keyword) in yearly.keywords().iter().enumerate() {
            let before = prev.values[col];
            if before == 0.0 {
                continue;
            }
            let change_pct = 100.0 * (cur.values[col] - before) / before;
            if change_pct.is_finite() {
                entries.push(YoyEntry {
                    keyword: keyword.clone(),
                    year,
                    change_pct,
                });
            }
        }
    }

    let years = buckets.iter().map(|b| b.period.year()).collect();
    Ok(YoyTable::from_entries(yearly.keywords().to_vec(), years, entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bucket;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn year(y: i32) -> crate::domain::Period {
        Granularity::Year.period_of(NaiveDate::from_ymd_opt(y, 6, 1).unwrap())
    }

    fn yearly(rows: &[(i32, f64)]) -> AggregatedShareSeries {
        AggregatedShareSeries::new(
            Granularity::Year,
            vec!["A".to_string(), "B".to_string()],
            rows.iter()
                .map(|&(y, a)| Bucket {
                    period: year(y),
                    values: vec![a, 100.0 - a],
                    rows: 52,
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn change_against_previous_year() {
        let table = compute(&yearly(&[(2022, 40.0), (2023, 60.0)])).unwrap();
        assert!((table.get("A", 2023).unwrap() - 50.0).abs() < 1e-9);
        assert!((table.get("B", 2023).unwrap() - (-100.0 / 3.0)).abs() < 1e-9);
        assert_eq!(table.get("A", 2022), None);
        assert_eq!(table.get("B", 2022), None);
    }

    #[test]
    fn zero_prior_year_is_absent() {
        let table = compute(&yearly(&[(2022, 0.0), (2023, 20.0)])).unwrap();
        assert_eq!(table.get("A", 2023), None);
        // B went from 100 to 80.
        assert!((table.get("B", 2023).unwrap() + 20.0).abs() < 1e-9);
    }

    #[test]
    fn gap_years_have_no_change() {
        let table = compute(&yearly(&[(2020, 50.0), (2022, 25.0), (2023, 50.0)])).unwrap();
        assert_eq!(table.get("A", 2022), None);
        assert!((table.get("A", 2023).unwrap() - 100.0).abs() < 1e-9);
        assert_eq!(table.years(), &[2020, 2022, 2023]);
    }

    #[test]
    fn rejects_non_yearly_series() {
        let monthly = AggregatedShareSeries::new(Granularity::Month, vec!["A".to_string()], vec![]).unwrap();
        assert!(matches!(compute(&monthly), Err(SosError::GranularityMismatch { .. })));
    }

    #[test]
    fn interleaved_columns_are_newest_first() {
        let series = yearly(&[(2021, 10.0), (2022, 20.0), (2023, 30.0)]);
        let table = compute(&series).unwrap();
        let cols = table.interleaved_columns(&series);

        let years: Vec<i32> = cols.iter().map(|c| c.year).collect();
        assert_eq!(years, vec![2023, 2022, 2021]);
        assert_eq!(cols[0].shares, vec![30.0, 70.0]);
        assert!((cols[0].yoy[0].unwrap() - 50.0).abs() < 1e-9);
        assert_eq!(cols[2].yoy, vec![None, None]);
    }

    proptest! {
        #[test]
        fn earliest_year_never_has_a_change(
            first in 2000i32..2030,
            shares in prop::collection::vec(0.0f64..=100.0, 1..8),
        ) {
            let rows: Vec<(i32, f64)> = shares
                .iter()
                .enumerate()
                .map(|(i, a)| (first + i as i32, *a))
                .collect();
            let table = compute(&yearly(&rows)).unwrap();
            prop_assert_eq!(table.get("A", first), None);
            prop_assert_eq!(table.get("B", first), None);
            for e in table.entries() {
                prop_assert!(e.change_pct.is_finite());
            }
        }
    }
}
