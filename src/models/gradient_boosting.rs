//! Gradient-boosted regression trees
//!
//! Stagewise least-squares boosting over smartcore CART trees: start from the
//! target mean, fit each tree to the current residuals, and shrink its
//! contribution by the learning rate. CART fitting is deterministic, so the
//! whole ensemble is reproducible without a random source. This is the model
//! the walk-forward trainer refits for every predicted week.

use crate::error::{ForecastError, Result};
use crate::models::{FittedRegressor, Regressor};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_regressor::{
    DecisionTreeRegressor, DecisionTreeRegressorParameters,
};

/// Gradient-boosted trees with fixed hyperparameters
#[derive(Debug, Clone)]
pub struct GradientBoosting {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: u16,
}

impl Default for GradientBoosting {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 5,
        }
    }
}

/// A fitted boosting ensemble
#[derive(Debug)]
pub struct FittedGradientBoosting {
    base: f64,
    learning_rate: f64,
    trees: Vec<DecisionTreeRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>>,
}

impl GradientBoosting {
    /// Fit to a concrete ensemble type. The walk-forward trainer calls this
    /// directly; the roster goes through the `Regressor` impl below.
    pub fn fit_boosted(
        &self,
        x: &DenseMatrix<f64>,
        y: &[f64],
    ) -> Result<FittedGradientBoosting> {
        if y.is_empty() {
            return Err(ForecastError::Training(
                "cannot fit gradient boosting on an empty target".to_string(),
            ));
        }

        let base = y.iter().sum::<f64>() / y.len() as f64;
        let mut current: Vec<f64> = vec![base; y.len()];
        let mut trees = Vec::with_capacity(self.n_estimators);

        for _ in 0..self.n_estimators {
            let residuals: Vec<f64> = y
                .iter()
                .zip(current.iter())
                .map(|(t, c)| t - c)
                .collect();

            let params = DecisionTreeRegressorParameters::default().with_max_depth(self.max_depth);
            let tree = DecisionTreeRegressor::fit(x, &residuals, params)
                .map_err(|e| ForecastError::Training(format!("boosting stage failed: {}", e)))?;

            let update = tree
                .predict(x)
                .map_err(|e| ForecastError::Training(format!("boosting stage failed: {}", e)))?;
            for (c, u) in current.iter_mut().zip(update.iter()) {
                *c += self.learning_rate * u;
            }

            trees.push(tree);
        }

        Ok(FittedGradientBoosting {
            base,
            learning_rate: self.learning_rate,
            trees,
        })
    }
}

impl Regressor for GradientBoosting {
    fn name(&self) -> &'static str {
        "gradient_boosting"
    }

    fn fit(&self, x: &DenseMatrix<f64>, y: &[f64]) -> Result<Box<dyn FittedRegressor>> {
        Ok(Box::new(self.fit_boosted(x, y)?))
    }
}

impl FittedRegressor for FittedGradientBoosting {
    fn predict(&self, x: &DenseMatrix<f64>) -> Result<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(ForecastError::Training(
                "gradient boosting has no fitted trees".to_string(),
            ));
        }

        let mut acc: Vec<f64> = Vec::new();
        for (i, tree) in self.trees.iter().enumerate() {
            let stage = tree
                .predict(x)
                .map_err(|e| ForecastError::Training(format!("boosting predict failed: {}", e)))?;

            if i == 0 {
                acc = vec![self.base; stage.len()];
            }
            for (a, s) in acc.iter_mut().zip(stage.iter()) {
                *a += self.learning_rate * s;
            }
        }

        Ok(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::matrix_from_rows;

    fn toy_matrix() -> (DenseMatrix<f64>, Vec<f64>) {
        let rows: Vec<Vec<f64>> = (0..30)
            .map(|i| vec![i as f64, (i % 4) as f64])
            .collect();
        let y: Vec<f64> = (0..30).map(|i| 2.0 * i as f64 + 5.0).collect();
        (matrix_from_rows(&rows).unwrap(), y)
    }

    #[test]
    fn constant_target_is_recovered() {
        let rows: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let x = matrix_from_rows(&rows).unwrap();
        let y = vec![100.0; 20];

        let model = GradientBoosting::default().fit_boosted(&x, &y).unwrap();
        let preds = model.predict(&x).unwrap();

        for p in preds {
            assert!((p - 100.0).abs() < 1e-6, "expected ~100, got {}", p);
        }
    }

    #[test]
    fn refitting_is_deterministic() {
        let (x, y) = toy_matrix();
        let spec = GradientBoosting::default();

        let first = spec.fit_boosted(&x, &y).unwrap().predict(&x).unwrap();
        let second = spec.fit_boosted(&x, &y).unwrap().predict(&x).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn empty_target_is_rejected() {
        let (x, _) = toy_matrix();
        assert!(GradientBoosting::default().fit_boosted(&x, &[]).is_err());
    }
}
