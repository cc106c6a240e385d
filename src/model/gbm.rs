//! Gradient boosting with a squared-error objective.
//!
//! Training is the classic additive scheme: start from the target mean, then
//! repeatedly fit a shallow regression tree to the current residuals and add
//! its (learning-rate-shrunken) predictions to the running estimate. With the
//! squared-error objective the negative gradient *is* the residual, so no
//! separate gradient step is needed.
//!
//! Fitting is deterministic: no row/feature subsampling, so the same inputs
//! and hyperparameters always yield the same model.

use crate::domain::{EvalMetrics, GbmParams};
use crate::error::AppError;
use crate::model::tree::{RegressionTree, TreeParams};

/// A trained boosted-tree regressor.
///
/// Owns its learned state for the lifetime of one forecast run; nothing is
/// persisted.
#[derive(Debug, Clone)]
pub struct GbmRegressor {
    base: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl GbmRegressor {
    /// Fit on `rows` (feature vectors) against `targets`.
    pub fn fit(rows: &[Vec<f64>], targets: &[f64], params: &GbmParams) -> Result<Self, AppError> {
        if rows.is_empty() || targets.is_empty() {
            return Err(AppError::new(3, "No training rows for the boosted regressor."));
        }
        if rows.len() != targets.len() {
            return Err(AppError::new(
                4,
                format!(
                    "Feature/label length mismatch: {} rows vs {} labels.",
                    rows.len(),
                    targets.len()
                ),
            ));
        }
        if params.n_estimators == 0 {
            return Err(AppError::new(2, "Tree count must be > 0."));
        }
        if !(params.learning_rate.is_finite() && params.learning_rate > 0.0) {
            return Err(AppError::new(2, "Learning rate must be positive."));
        }

        let base = targets.iter().sum::<f64>() / targets.len() as f64;
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_leaf: params.min_samples_leaf.max(1),
        };

        let mut estimate = vec![base; targets.len()];
        let mut trees = Vec::with_capacity(params.n_estimators);

        for _ in 0..params.n_estimators {
            let residuals: Vec<f64> = targets
                .iter()
                .zip(&estimate)
                .map(|(y, e)| y - e)
                .collect();

            let tree = RegressionTree::fit(rows, &residuals, &tree_params);
            for (e, row) in estimate.iter_mut().zip(rows) {
                *e += params.learning_rate * tree.predict(row);
            }
            trees.push(tree);
        }

        Ok(Self {
            base,
            learning_rate: params.learning_rate,
            trees,
        })
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let boost: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        self.base + self.learning_rate * boost
    }

    /// RMSE/MAE over a labeled set. Diagnostic only; nothing is gated on it.
    pub fn evaluate(&self, rows: &[Vec<f64>], targets: &[f64]) -> EvalMetrics {
        let n = rows.len().min(targets.len());
        if n == 0 {
            return EvalMetrics { rmse: 0.0, mae: 0.0, n: 0 };
        }

        let mut sq_sum = 0.0;
        let mut abs_sum = 0.0;
        for (row, y) in rows.iter().zip(targets).take(n) {
            let err = self.predict(row) - y;
            sq_sum += err * err;
            abs_sum += err.abs();
        }

        EvalMetrics {
            rmse: (sq_sum / n as f64).sqrt(),
            mae: abs_sum / n as f64,
            n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(n_estimators: usize) -> GbmParams {
        GbmParams {
            n_estimators,
            max_depth: 3,
            learning_rate: 0.1,
            min_samples_leaf: 1,
        }
    }

    #[test]
    fn constant_target_predicts_the_constant() {
        let rows: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let targets = vec![42.0; 20];

        let model = GbmRegressor::fit(&rows, &targets, &params(50)).unwrap();
        assert!((model.predict(&[3.0]) - 42.0).abs() < 1e-9);
        assert!((model.predict(&[19.0]) - 42.0).abs() < 1e-9);
    }

    #[test]
    fn boosting_beats_the_mean_predictor_in_sample() {
        let rows: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..40).map(|i| 2.0 * i as f64 + 5.0).collect();

        let model = GbmRegressor::fit(&rows, &targets, &params(100)).unwrap();
        let fit_metrics = model.evaluate(&rows, &targets);

        let mean = targets.iter().sum::<f64>() / targets.len() as f64;
        let mean_rmse = (targets.iter().map(|y| (y - mean).powi(2)).sum::<f64>()
            / targets.len() as f64)
            .sqrt();

        assert!(fit_metrics.rmse < mean_rmse * 0.25);
    }

    #[test]
    fn empty_training_set_is_a_descriptive_error() {
        let err = GbmRegressor::fit(&[], &[], &params(10)).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn zero_trees_is_rejected() {
        let rows = vec![vec![1.0], vec![2.0]];
        let targets = vec![1.0, 2.0];
        let err = GbmRegressor::fit(&rows, &targets, &params(0)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn fitting_is_deterministic() {
        let rows: Vec<Vec<f64>> = (0..30).map(|i| vec![(i as f64).sin(), i as f64]).collect();
        let targets: Vec<f64> = (0..30).map(|i| (i as f64 * 0.3).cos() * 10.0).collect();

        let a = GbmRegressor::fit(&rows, &targets, &params(25)).unwrap();
        let b = GbmRegressor::fit(&rows, &targets, &params(25)).unwrap();

        for i in 0..30 {
            let row = vec![(i as f64).sin(), i as f64];
            assert_eq!(a.predict(&row), b.predict(&row));
        }
    }
}
