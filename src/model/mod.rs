//! Regression models for the forecast engine.
//!
//! - depth-limited regression trees with greedy variance-reduction splits (`tree`)
//! - squared-error gradient boosting over those trees (`gbm`)

pub mod gbm;
pub mod tree;

pub use gbm::GbmRegressor;
pub use tree::{RegressionTree, TreeParams};
