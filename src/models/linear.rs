//! Ordinary least squares baseline backed by smartcore

use crate::error::{ForecastError, Result};
use crate::models::{FittedRegressor, Regressor};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{LinearRegression, LinearRegressionParameters};

/// Plain linear regression, kept in the roster as a sanity baseline
#[derive(Debug, Clone, Default)]
pub struct LinearModel;

#[derive(Debug)]
pub struct FittedLinearModel {
    model: LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>,
}

impl Regressor for LinearModel {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn fit(&self, x: &DenseMatrix<f64>, y: &[f64]) -> Result<Box<dyn FittedRegressor>> {
        let model = LinearRegression::fit(x, &y.to_vec(), LinearRegressionParameters::default())
            .map_err(|e| ForecastError::Training(format!("linear fit failed: {}", e)))?;

        Ok(Box::new(FittedLinearModel { model }))
    }
}

impl FittedRegressor for FittedLinearModel {
    fn predict(&self, x: &DenseMatrix<f64>) -> Result<Vec<f64>> {
        self.model
            .predict(x)
            .map_err(|e| ForecastError::Training(format!("linear predict failed: {}", e)))
    }
}
