//! Depth-limited regression tree.
//!
//! Each boosting round fits one of these to the current residuals. Splits are
//! found greedily by scanning every feature for the threshold with the best
//! sum-of-squared-error reduction; features are scanned in parallel since the
//! per-feature scans are independent.
//!
//! Candidate thresholds are midpoints between distinct consecutive sorted
//! values, and a sorted prefix-sum sweep evaluates all of them in one pass per
//! feature.

use std::cmp::Ordering;

use rayon::prelude::*;

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// A fitted regression tree.
#[derive(Debug, Clone)]
pub struct RegressionTree {
    root: Node,
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl RegressionTree {
    /// Fit a tree on `rows` (feature vectors) against `targets`.
    ///
    /// `rows` must be non-empty and rectangular; the forecast engine
    /// guarantees both before calling.
    pub fn fit(rows: &[Vec<f64>], targets: &[f64], params: &TreeParams) -> Self {
        let indices: Vec<usize> = (0..rows.len()).collect();
        let min_leaf = params.min_samples_leaf.max(1);
        let root = grow(rows, targets, indices, 0, params.max_depth, min_leaf);
        Self { root }
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }
}

fn grow(
    rows: &[Vec<f64>],
    targets: &[f64],
    indices: Vec<usize>,
    depth: usize,
    max_depth: usize,
    min_leaf: usize,
) -> Node {
    let mean = mean_of(targets, &indices);

    if depth >= max_depth || indices.len() < 2 * min_leaf {
        return Node::Leaf { value: mean };
    }

    let n_features = rows[indices[0]].len();
    let best = (0..n_features)
        .into_par_iter()
        .filter_map(|feature| best_split_on(rows, targets, &indices, feature, min_leaf))
        .max_by(|a, b| a.gain.partial_cmp(&b.gain).unwrap_or(Ordering::Equal));

    let Some(split) = best else {
        return Node::Leaf { value: mean };
    };

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .into_iter()
        .partition(|&i| rows[i][split.feature] <= split.threshold);

    Node::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(grow(rows, targets, left_idx, depth + 1, max_depth, min_leaf)),
        right: Box::new(grow(rows, targets, right_idx, depth + 1, max_depth, min_leaf)),
    }
}

fn mean_of(targets: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64
}

/// Best threshold for one feature, or `None` if no split improves the SSE.
fn best_split_on(
    rows: &[Vec<f64>],
    targets: &[f64],
    indices: &[usize],
    feature: usize,
    min_leaf: usize,
) -> Option<SplitCandidate> {
    let mut pairs: Vec<(f64, f64)> = indices
        .iter()
        .map(|&i| (rows[i][feature], targets[i]))
        .collect();
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    let n = pairs.len();
    let total_sum: f64 = pairs.iter().map(|p| p.1).sum();
    let total_sq: f64 = pairs.iter().map(|p| p.1 * p.1).sum();
    let parent_sse = total_sq - total_sum * total_sum / n as f64;

    let mut sum_left = 0.0;
    let mut sq_left = 0.0;
    let mut best: Option<SplitCandidate> = None;

    for k in 0..n - 1 {
        sum_left += pairs[k].1;
        sq_left += pairs[k].1 * pairs[k].1;

        // No threshold separates equal feature values.
        if pairs[k].0 == pairs[k + 1].0 {
            continue;
        }

        let n_left = k + 1;
        let n_right = n - n_left;
        if n_left < min_leaf || n_right < min_leaf {
            continue;
        }

        let sum_right = total_sum - sum_left;
        let sq_right = total_sq - sq_left;
        let sse_left = sq_left - sum_left * sum_left / n_left as f64;
        let sse_right = sq_right - sum_right * sum_right / n_right as f64;
        let gain = parent_sse - sse_left - sse_right;

        if gain > best.map_or(1e-12, |b| b.gain) {
            best = Some(SplitCandidate {
                feature,
                threshold: 0.5 * (pairs[k].0 + pairs[k + 1].0),
                gain,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_a_step_function() {
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..10).map(|i| if i < 5 { 0.0 } else { 10.0 }).collect();

        let tree = RegressionTree::fit(
            &rows,
            &targets,
            &TreeParams { max_depth: 2, min_samples_leaf: 1 },
        );

        assert!((tree.predict(&[1.0]) - 0.0).abs() < 1e-9);
        assert!((tree.predict(&[8.0]) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn zero_depth_predicts_the_mean() {
        let rows: Vec<Vec<f64>> = (0..4).map(|i| vec![i as f64]).collect();
        let targets = vec![1.0, 2.0, 3.0, 4.0];

        let tree = RegressionTree::fit(
            &rows,
            &targets,
            &TreeParams { max_depth: 0, min_samples_leaf: 1 },
        );

        for i in 0..4 {
            assert!((tree.predict(&[i as f64]) - 2.5).abs() < 1e-9);
        }
    }

    #[test]
    fn splits_respect_the_minimum_leaf_size() {
        // With min_samples_leaf = 3 and 4 rows, no split is legal.
        let rows: Vec<Vec<f64>> = (0..4).map(|i| vec![i as f64]).collect();
        let targets = vec![0.0, 0.0, 10.0, 10.0];

        let tree = RegressionTree::fit(
            &rows,
            &targets,
            &TreeParams { max_depth: 4, min_samples_leaf: 3 },
        );

        assert!((tree.predict(&[0.0]) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn constant_features_fall_back_to_a_leaf() {
        let rows: Vec<Vec<f64>> = (0..6).map(|_| vec![1.0, 1.0]).collect();
        let targets = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];

        let tree = RegressionTree::fit(
            &rows,
            &targets,
            &TreeParams { max_depth: 3, min_samples_leaf: 1 },
        );

        assert!((tree.predict(&[1.0, 1.0]) - 3.5).abs() < 1e-9);
    }
}
