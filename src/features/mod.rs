//! Lag-feature framing for supervised learning.
//!
//! A cleaned series of length `N` with lag depth `L` yields exactly
//! `max(0, N - L)` rows: the first `L` points have too few predecessors to
//! form a full feature vector and produce nothing.

use crate::domain::{LagTable, LaggedRow, PriceSeries, TrainTestSplit};

/// Derive the fixed-width lag table from a cleaned series.
///
/// Row `i` (for `i >= L`) carries `price[i]` as its label and
/// `price[i-1], ..., price[i-L]` as features, nearest predecessor first.
pub fn build_lag_table(series: &PriceSeries, lag_depth: usize) -> LagTable {
    let points = series.points();
    let mut rows = Vec::new();

    if lag_depth > 0 {
        for i in lag_depth..points.len() {
            let lags: Vec<f64> = (1..=lag_depth).map(|k| points[i - k].price).collect();
            rows.push(LaggedRow {
                date: points[i].date,
                label: points[i].price,
                lags,
            });
        }
    }

    LagTable { lag_depth, rows }
}

/// Partition a lag table chronologically (no shuffling).
///
/// The boundary is `floor(n * train_frac)`, so temporal order is preserved and
/// no future information leaks into training.
pub fn chronological_split(table: &LagTable, train_frac: f64) -> TrainTestSplit {
    let n = table.rows.len();
    let n_train = ((n as f64) * train_frac.clamp(0.0, 1.0)).floor() as usize;

    TrainTestSplit {
        lag_depth: table.lag_depth,
        train: table.rows[..n_train].to_vec(),
        test: table.rows[n_train..].to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PricePoint;
    use chrono::NaiveDate;

    fn series(values: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                price,
            })
            .collect();
        PriceSeries::from_points(points)
    }

    #[test]
    fn table_size_follows_the_window_law() {
        for (n, lag) in [(10usize, 3usize), (5, 5), (4, 5), (0, 2), (100, 1)] {
            let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
            let table = build_lag_table(&series(&values), lag);
            assert_eq!(table.rows.len(), n.saturating_sub(lag), "n={n} lag={lag}");
        }
    }

    #[test]
    fn lag_depth_two_scenario() {
        let table = build_lag_table(&series(&[10.0, 20.0, 30.0, 40.0]), 2);
        assert_eq!(table.rows.len(), 2);

        assert_eq!(table.rows[0].label, 30.0);
        assert_eq!(table.rows[0].lags, vec![20.0, 10.0]);

        assert_eq!(table.rows[1].label, 40.0);
        assert_eq!(table.rows[1].lags, vec![30.0, 20.0]);
    }

    #[test]
    fn split_is_chronological_at_the_floor_boundary() {
        let values: Vec<f64> = (0..15).map(|i| i as f64).collect();
        let table = build_lag_table(&series(&values), 5);
        assert_eq!(table.rows.len(), 10);

        let split = chronological_split(&table, 0.8);
        assert_eq!(split.train.len(), 8);
        assert_eq!(split.test.len(), 2);

        // Every train date precedes every test date.
        let last_train = split.train.last().unwrap().date;
        let first_test = split.test.first().unwrap().date;
        assert!(last_train < first_test);
    }

    #[test]
    fn empty_table_splits_empty() {
        let table = build_lag_table(&series(&[1.0, 2.0]), 5);
        let split = chronological_split(&table, 0.8);
        assert!(split.train.is_empty());
        assert!(split.test.is_empty());
    }
}
