//! Forecast engine: train on the lag table, evaluate on the holdout, then
//! extrapolate by a recursive (walk-forward) daily walk.
//!
//! The walk is the one genuinely non-trivial piece: each predicted price is
//! fed back as the newest lag feature for the next step, so every later
//! prediction is conditioned on the model's own earlier predictions. No ground
//! truth is injected mid-horizon and no uncertainty bound is produced; the
//! walk is purely deterministic given the trained model.

use chrono::{Duration, NaiveDate};

use crate::domain::{
    EvalMetrics, ForecastConfig, FutureForecastPoint, GbmParams, HoldoutPoint, LaggedRow,
    PriceSeries,
};
use crate::error::AppError;
use crate::features::{build_lag_table, chronological_split};
use crate::math::solve_least_squares;
use crate::model::GbmRegressor;

/// Everything a renderer or exporter needs from one forecast run.
#[derive(Debug, Clone)]
pub struct ForecastOutput {
    pub lag_depth: usize,
    pub horizon: usize,
    pub params: GbmParams,
    pub n_train: usize,
    pub n_test: usize,
    pub holdout: Vec<HoldoutPoint>,
    pub metrics: EvalMetrics,
    /// Linear AR baseline on the same features, for context.
    pub baseline_metrics: Option<EvalMetrics>,
    pub future: Vec<FutureForecastPoint>,
}

/// Train the boosted regressor and extrapolate `config.horizon` days past the
/// last observation.
///
/// Fails fast with a descriptive error when the series is too short for the
/// requested lag depth, rather than letting feature construction produce an
/// opaque shape mismatch downstream.
pub fn run_forecast(series: &PriceSeries, config: &ForecastConfig) -> Result<ForecastOutput, AppError> {
    let lag = config.lag_depth;
    if lag == 0 {
        return Err(AppError::new(2, "Lag depth must be >= 1."));
    }
    if config.horizon == 0 {
        return Err(AppError::new(2, "Forecast horizon must be >= 1."));
    }
    if series.len() < lag + 2 {
        return Err(AppError::new(
            3,
            format!(
                "Need at least {} cleaned observations for lag depth {lag}, got {}.",
                lag + 2,
                series.len()
            ),
        ));
    }

    let table = build_lag_table(series, lag);
    let split = chronological_split(&table, config.train_frac);
    if split.train.is_empty() {
        return Err(AppError::new(
            3,
            format!(
                "Training partition is empty ({} lagged rows at train fraction {:.2}).",
                table.rows.len(),
                config.train_frac
            ),
        ));
    }

    let (x_train, y_train) = design(&split.train);
    let model = GbmRegressor::fit(&x_train, &y_train, &config.params)?;

    let holdout: Vec<HoldoutPoint> = split
        .test
        .iter()
        .map(|row| HoldoutPoint {
            date: row.date,
            actual: row.label,
            predicted: model.predict(&row.lags),
        })
        .collect();
    let metrics = holdout_metrics(&holdout);

    let baseline_metrics = fit_linear_baseline(&x_train, &y_train).map(|coef| {
        let errors: Vec<(f64, f64)> = split
            .test
            .iter()
            .map(|row| (row.label, predict_linear(&coef, &row.lags)))
            .collect();
        metrics_from_pairs(&errors)
    });

    // The walk has to start from a real observation date.
    let last = series
        .last()
        .ok_or_else(|| AppError::new(3, "Cannot forecast from an empty series."))?;
    let seed = series.recent_prices(lag);
    let future = recursive_walk(last.date, config.horizon, seed, |lags| model.predict(lags));

    Ok(ForecastOutput {
        lag_depth: lag,
        horizon: config.horizon,
        params: config.params,
        n_train: split.train.len(),
        n_test: split.test.len(),
        holdout,
        metrics,
        baseline_metrics,
        future,
    })
}

/// Walk the forecast forward one day at a time.
///
/// `recent` holds the last known prices, most recent first (the same ordering
/// the lag-feature builder uses) and slides after every step: the oldest
/// value drops off and the new prediction becomes `recent[0]`.
///
/// Generic over the predictor so the feedback mechanism can be verified
/// step-by-step without a trained model.
pub fn recursive_walk<F>(
    last_date: NaiveDate,
    horizon: usize,
    mut recent: Vec<f64>,
    predict: F,
) -> Vec<FutureForecastPoint>
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = Vec::with_capacity(horizon);
    let mut date = last_date;

    for _ in 0..horizon {
        date = date + Duration::days(1);
        let price = predict(&recent);
        out.push(FutureForecastPoint { date, price });

        if !recent.is_empty() {
            recent.rotate_right(1);
            recent[0] = price;
        }
    }

    out
}

/// Column-expand lagged rows into parallel feature/label vectors.
fn design(rows: &[LaggedRow]) -> (Vec<Vec<f64>>, Vec<f64>) {
    let x = rows.iter().map(|r| r.lags.clone()).collect();
    let y = rows.iter().map(|r| r.label).collect();
    (x, y)
}

fn holdout_metrics(holdout: &[HoldoutPoint]) -> EvalMetrics {
    let pairs: Vec<(f64, f64)> = holdout.iter().map(|h| (h.actual, h.predicted)).collect();
    metrics_from_pairs(&pairs)
}

fn metrics_from_pairs(pairs: &[(f64, f64)]) -> EvalMetrics {
    let n = pairs.len();
    if n == 0 {
        return EvalMetrics { rmse: 0.0, mae: 0.0, n: 0 };
    }
    let mut sq = 0.0;
    let mut abs = 0.0;
    for &(actual, predicted) in pairs {
        let err = predicted - actual;
        sq += err * err;
        abs += err.abs();
    }
    EvalMetrics {
        rmse: (sq / n as f64).sqrt(),
        mae: abs / n as f64,
        n,
    }
}

/// Ordinary least squares on an intercept + the lag columns.
///
/// Returns `None` when the design matrix is too ill-conditioned; the baseline
/// is purely diagnostic, so that is not an error.
fn fit_linear_baseline(x: &[Vec<f64>], y: &[f64]) -> Option<Vec<f64>> {
    let n = x.len();
    let d = x.first()?.len();
    if n < d + 1 {
        return None;
    }

    let mut design = nalgebra::DMatrix::zeros(n, d + 1);
    for (i, row) in x.iter().enumerate() {
        design[(i, 0)] = 1.0;
        for (j, &v) in row.iter().enumerate() {
            design[(i, j + 1)] = v;
        }
    }
    let targets = nalgebra::DVector::from_column_slice(y);

    solve_least_squares(&design, &targets).map(|beta| beta.iter().copied().collect())
}

fn predict_linear(coef: &[f64], lags: &[f64]) -> f64 {
    coef[0]
        + coef[1..]
            .iter()
            .zip(lags)
            .map(|(c, v)| c * v)
            .sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PricePoint, PriceSeries};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn daily_series(n: usize) -> PriceSeries {
        let start = d(2024, 1, 1);
        let points = (0..n)
            .map(|i| PricePoint {
                date: start + Duration::days(i as i64),
                price: 70.0 + (i as f64 * 0.4).sin() * 5.0 + i as f64 * 0.05,
            })
            .collect();
        PriceSeries::from_points(points)
    }

    fn config(lag: usize, horizon: usize) -> ForecastConfig {
        ForecastConfig {
            granularity: crate::domain::Granularity::Daily,
            start: d(2024, 1, 1),
            end: d(2024, 12, 31),
            lag_depth: lag,
            horizon,
            train_frac: 0.8,
            params: GbmParams { n_estimators: 20, ..GbmParams::default() },
            offline: true,
            sample_seed: 0,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            export_results: None,
            export_forecast: None,
            debug_bundle: false,
        }
    }

    #[test]
    fn walk_feeds_predictions_back_as_features() {
        // Predictor returns newest lag + 1, so each step must see the
        // previous step's output at the front of the state.
        let future = recursive_walk(d(2024, 1, 10), 4, vec![3.0, 2.0, 1.0], |lags| lags[0] + 1.0);

        let prices: Vec<f64> = future.iter().map(|f| f.price).collect();
        assert_eq!(prices, vec![4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn walk_slides_the_whole_state() {
        // Predictor sums the state; with lag 2 and seed [1, 10]:
        // step1: 1+10=11, state [11, 1]
        // step2: 11+1=12, state [12, 11]
        // step3: 12+11=23
        let future = recursive_walk(d(2024, 1, 10), 3, vec![1.0, 10.0], |lags| lags.iter().sum());
        let prices: Vec<f64> = future.iter().map(|f| f.price).collect();
        assert_eq!(prices, vec![11.0, 12.0, 23.0]);
    }

    #[test]
    fn walk_dates_are_contiguous_and_start_after_the_last_observation() {
        let last = d(2024, 2, 28);
        let future = recursive_walk(last, 90, vec![1.0], |_| 1.0);

        assert_eq!(future.len(), 90);
        assert_eq!(future[0].date, d(2024, 2, 29));
        for w in future.windows(2) {
            assert_eq!(w[1].date - w[0].date, Duration::days(1));
        }
    }

    #[test]
    fn full_run_produces_exactly_horizon_points() {
        let series = daily_series(60);
        let out = run_forecast(&series, &config(5, 90)).unwrap();

        assert_eq!(out.future.len(), 90);
        assert_eq!(out.n_train + out.n_test, 60 - 5);
        assert_eq!(out.holdout.len(), out.n_test);
        assert_eq!(out.future[0].date, series.last().unwrap().date + Duration::days(1));
        assert!(out.future.iter().all(|f| f.price.is_finite()));
    }

    #[test]
    fn short_series_fails_with_a_descriptive_error() {
        let series = daily_series(4);
        let err = run_forecast(&series, &config(5, 90)).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("lag depth 5"));
    }

    #[test]
    fn baseline_tracks_a_linear_series_closely() {
        // A perfectly linear series is exactly representable by the AR
        // baseline, so its holdout RMSE should be essentially zero.
        let start = d(2024, 1, 1);
        let points = (0..40)
            .map(|i| PricePoint {
                date: start + Duration::days(i as i64),
                price: 50.0 + i as f64,
            })
            .collect();
        let series = PriceSeries::from_points(points);

        let out = run_forecast(&series, &config(3, 10)).unwrap();
        let baseline = out.baseline_metrics.expect("baseline should solve");
        assert!(baseline.rmse < 1e-6, "rmse = {}", baseline.rmse);
    }
}
