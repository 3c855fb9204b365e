//! Regression algorithms for the forecasting pipeline
//!
//! The holdout evaluator iterates a fixed roster of algorithms in declared
//! order; the walk-forward trainer uses the gradient-boosted trees model
//! directly. Every implementation carries fixed hyperparameters and a fixed
//! seed, so repeated runs over the same table are byte-identical.

use crate::error::Result;
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::fmt::Debug;

/// A regression algorithm that can be fitted to a feature matrix
pub trait Regressor: Debug {
    /// Stable name used in metric rows and prediction tags
    fn name(&self) -> &'static str;

    /// Fit a fresh model instance
    fn fit(&self, x: &DenseMatrix<f64>, y: &[f64]) -> Result<Box<dyn FittedRegressor>>;
}

/// A fitted model ready to predict
pub trait FittedRegressor: Debug {
    fn predict(&self, x: &DenseMatrix<f64>) -> Result<Vec<f64>>;
}

pub mod decision_tree;
pub mod gradient_boosting;
pub mod linear;
pub mod random_forest;

pub use decision_tree::DecisionTree;
pub use gradient_boosting::GradientBoosting;
pub use linear::LinearModel;
pub use random_forest::RandomForest;

/// The fixed algorithm roster, in selection tie-break order. First entry wins
/// when two algorithms score identically.
pub fn default_roster() -> Vec<Box<dyn Regressor>> {
    vec![
        Box::new(RandomForest::default()),
        Box::new(GradientBoosting::default()),
        Box::new(DecisionTree::default()),
        Box::new(LinearModel::default()),
    ]
}
