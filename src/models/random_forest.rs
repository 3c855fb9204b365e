//! Random forest regressor backed by smartcore

use crate::error::{ForecastError, Result};
use crate::models::{FittedRegressor, Regressor};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

/// Random forest with fixed hyperparameters and a fixed bootstrap seed
#[derive(Debug, Clone)]
pub struct RandomForest {
    pub n_trees: usize,
    pub max_depth: u16,
    pub seed: u64,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 5,
            seed: 42,
        }
    }
}

#[derive(Debug)]
pub struct FittedRandomForest {
    model: RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>,
}

impl Regressor for RandomForest {
    fn name(&self) -> &'static str {
        "random_forest"
    }

    fn fit(&self, x: &DenseMatrix<f64>, y: &[f64]) -> Result<Box<dyn FittedRegressor>> {
        let params = RandomForestRegressorParameters::default()
            .with_n_trees(self.n_trees)
            .with_max_depth(self.max_depth)
            .with_seed(self.seed);

        let model = RandomForestRegressor::fit(x, &y.to_vec(), params)
            .map_err(|e| ForecastError::Training(format!("random forest fit failed: {}", e)))?;

        Ok(Box::new(FittedRandomForest { model }))
    }
}

impl FittedRegressor for FittedRandomForest {
    fn predict(&self, x: &DenseMatrix<f64>) -> Result<Vec<f64>> {
        self.model
            .predict(x)
            .map_err(|e| ForecastError::Training(format!("random forest predict failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::matrix_from_rows;

    fn toy_matrix() -> (DenseMatrix<f64>, Vec<f64>) {
        let rows: Vec<Vec<f64>> = (0..40)
            .map(|i| vec![i as f64, (i % 5) as f64])
            .collect();
        let y: Vec<f64> = (0..40).map(|i| 3.0 * i as f64 + 10.0).collect();
        (matrix_from_rows(&rows).unwrap(), y)
    }

    #[test]
    fn default_forest_fits_and_predicts() {
        let (x, y) = toy_matrix();

        let fitted = RandomForest::default().fit(&x, &y).unwrap();
        let preds = fitted.predict(&x).unwrap();

        assert_eq!(preds.len(), y.len());
        assert!(preds.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn fixed_seed_makes_refits_identical() {
        let (x, y) = toy_matrix();
        let spec = RandomForest::default();

        let first = spec.fit(&x, &y).unwrap().predict(&x).unwrap();
        let second = spec.fit(&x, &y).unwrap().predict(&x).unwrap();

        assert_eq!(first, second);
    }
}
