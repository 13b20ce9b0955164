//! Calendar resampling of share series.

use crate::domain::{AggregatedShareSeries, Bucket, Granularity, Period, ShareSeries};

/// Average a share series into calendar buckets.
///
/// Each keyword's bucket value is the unweighted mean of the rows in the
/// bucket. Buckets without rows are omitted; output is chronological.
pub fn resample(series: &ShareSeries, granularity: Granularity) -> AggregatedShareSeries {
    let width = series.keywords().len();
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut sums = vec![0.0; width];
    let mut count = 0usize;
    let mut current = None;

    // Rows are date-ordered, so each bucket is one contiguous run.
    for row in series.rows() {
        let period = granularity.period_of(row.date);
        if current != Some(period) {
            if let Some(done) = current {
                buckets.push(close_bucket(done, &mut sums, count));
            }
            current = Some(period);
            count = 0;
        }
        for (sum, v) in sums.iter_mut().zip(&row.values) {
            *sum += v;
        }
        count += 1;
    }
    if let Some(done) = current {
        buckets.push(close_bucket(done, &mut sums, count));
    }

    AggregatedShareSeries::from_resampled(granularity, series.keywords().to_vec(), buckets)
}

fn close_bucket(period: Period, sums: &mut [f64], count: usize) -> Bucket {
    let n = count as f64;
    let values = sums.iter().map(|s| s / n).collect();
    sums.iter_mut().for_each(|s| *s = 0.0);
    Bucket {
        period,
        values,
        rows: count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ShareRow;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use std::collections::{BTreeMap, BTreeSet};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn shares(rows: Vec<(NaiveDate, f64)>) -> ShareSeries {
        ShareSeries::new(
            vec!["A".to_string(), "B".to_string()],
            rows.into_iter()
                .map(|(date, a)| ShareRow { date, values: vec![a, 100.0 - a] })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn monthly_means_and_month_end_boundary() {
        let s = shares(vec![
            (d(2024, 1, 7), 40.0),
            (d(2024, 1, 31), 60.0),
            (d(2024, 2, 1), 10.0),
        ]);
        let monthly = resample(&s, Granularity::Month);

        assert_eq!(monthly.buckets().len(), 2);
        let jan = &monthly.buckets()[0];
        assert_eq!(jan.period.label(), "2024-01");
        assert_eq!(jan.rows, 2);
        assert!((jan.values[0] - 50.0).abs() < 1e-12);
        assert!((jan.values[1] - 50.0).abs() < 1e-12);

        let feb = &monthly.buckets()[1];
        assert_eq!(feb.period.label(), "2024-02");
        assert!((feb.values[0] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn empty_buckets_are_omitted() {
        let s = shares(vec![(d(2024, 1, 15), 30.0), (d(2024, 4, 15), 70.0)]);
        let monthly = resample(&s, Granularity::Month);
        let labels: Vec<String> = monthly.buckets().iter().map(|b| b.period.label()).collect();
        assert_eq!(labels, vec!["2024-01", "2024-04"]);
    }

    #[test]
    fn quarterly_and_yearly_buckets() {
        let s = shares(vec![
            (d(2022, 3, 31), 20.0),
            (d(2022, 4, 1), 40.0),
            (d(2022, 6, 30), 60.0),
            (d(2023, 1, 1), 80.0),
        ]);

        let quarterly = resample(&s, Granularity::Quarter);
        let labels: Vec<String> = quarterly.buckets().iter().map(|b| b.period.label()).collect();
        assert_eq!(labels, vec!["2022-Q1", "2022-Q2", "2023-Q1"]);
        assert!((quarterly.buckets()[1].values[0] - 50.0).abs() < 1e-12);

        let yearly = resample(&s, Granularity::Year);
        assert_eq!(yearly.buckets().len(), 2);
        assert!((yearly.buckets()[0].values[0] - 40.0).abs() < 1e-12);
        assert_eq!(yearly.buckets()[0].rows, 3);
        assert!((yearly.buckets()[1].values[0] - 80.0).abs() < 1e-12);
    }

    #[test]
    fn bucket_means_still_sum_to_100() {
        let s = shares(vec![(d(2024, 1, 1), 12.5), (d(2024, 1, 8), 77.0), (d(2024, 1, 15), 33.3)]);
        for b in resample(&s, Granularity::Month).buckets() {
            let total: f64 = b.values.iter().sum();
            assert!((total - 100.0).abs() < 1e-9);
        }
    }

    fn arb_shares() -> impl Strategy<Value = ShareSeries> {
        prop::collection::btree_map(0i64..1500, 0.0f64..=100.0, 0..80).prop_map(|cells| {
            let origin = d(2021, 1, 1);
            shares(
                cells
                    .into_iter()
                    .map(|(offset, a)| (origin + chrono::Duration::days(offset), a))
                    .collect(),
            )
        })
    }

    proptest! {
        #[test]
        fn matches_grouping_by_period(s in arb_shares()) {
            for granularity in [Granularity::Month, Granularity::Quarter, Granularity::Year] {
                let mut groups: BTreeMap<Period, Vec<&ShareRow>> = BTreeMap::new();
                for row in s.rows() {
                    groups.entry(granularity.period_of(row.date)).or_default().push(row);
                }

                let out = resample(&s, granularity);
                prop_assert_eq!(out.buckets().len(), groups.len());
                let periods: BTreeSet<Period> = out.buckets().iter().map(|b| b.period).collect();
                prop_assert_eq!(periods.len(), out.buckets().len());

                for (bucket, (period, rows)) in out.buckets().iter().zip(&groups) {
                    prop_assert_eq!(bucket.period, *period);
                    prop_assert_eq!(bucket.rows, rows.len());
                    for col in 0..2 {
                        let mean = rows.iter().map(|r| r.values[col]).sum::<f64>() / rows.len() as f64;
                        prop_assert!((bucket.values[col] - mean).abs() < 1e-9);
                    }
                }
            }
        }
    }

    #[test]
    fn empty_series_resamples_to_nothing() {
        let s = shares(vec![]);
        let yearly = resample(&s, Granularity::Year);
        assert!(yearly.is_empty());
        assert_eq!(yearly.granularity(), Granularity::Year);
    }
}
