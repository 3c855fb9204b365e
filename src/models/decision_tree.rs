//! Single decision tree regressor backed by smartcore

use crate::error::{ForecastError, Result};
use crate::models::{FittedRegressor, Regressor};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_regressor::{
    DecisionTreeRegressor, DecisionTreeRegressorParameters,
};

/// CART regression tree. Fitting is deterministic, so no seed is needed.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub max_depth: u16,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self { max_depth: 5 }
    }
}

#[derive(Debug)]
pub struct FittedDecisionTree {
    model: DecisionTreeRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>,
}

impl Regressor for DecisionTree {
    fn name(&self) -> &'static str {
        "decision_tree"
    }

    fn fit(&self, x: &DenseMatrix<f64>, y: &[f64]) -> Result<Box<dyn FittedRegressor>> {
        let params = DecisionTreeRegressorParameters::default().with_max_depth(self.max_depth);

        let model = DecisionTreeRegressor::fit(x, &y.to_vec(), params)
            .map_err(|e| ForecastError::Training(format!("decision tree fit failed: {}", e)))?;

        Ok(Box::new(FittedDecisionTree { model }))
    }
}

impl FittedRegressor for FittedDecisionTree {
    fn predict(&self, x: &DenseMatrix<f64>) -> Result<Vec<f64>> {
        self.model
            .predict(x)
            .map_err(|e| ForecastError::Training(format!("decision tree predict failed: {}", e)))
    }
}
