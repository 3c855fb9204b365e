//! Holdout evaluation and algorithm selection
//!
//! A single 80/20 chronological split over the prepared table. Every roster
//! algorithm trains on the early 80% with fixed hyperparameters and seeds and
//! is scored on the late 20%; the winner is the one with the lowest weighted
//! MAPE, first-seen winning ties. The winner also gets permutation feature
//! importances and its held-out predictions are emitted tagged with its name.

use crate::config::ModelSpec;
use crate::data::{column_as_f64, feature_rows, matrix_from_rows, PreparedData};
use crate::error::Result;
use crate::metrics::{mean_absolute_error, r_squared, root_mean_squared_error, wmape};
use crate::models::{FittedRegressor, Regressor};
use crate::predictions::prediction_frame;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{info, warn};

/// Fewer clean rows than this and the split would be meaningless
const MIN_HOLDOUT_ROWS: usize = 10;

/// Seed base for the permutation-importance shuffles
const PERMUTATION_SEED: u64 = 42;

/// Comparison metrics for one (family, algorithm) pair
#[derive(Debug, Clone, Serialize)]
pub struct MetricRow {
    pub model: String,
    pub algorithm: String,
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
    pub wmape: f64,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Permutation importance of one feature under the winning algorithm
#[derive(Debug, Clone, Serialize)]
pub struct ImportanceRow {
    pub model: String,
    pub feature: String,
    pub importance: f64,
}

/// Outcome of holdout evaluation for one family
#[derive(Debug)]
pub struct HoldoutOutput {
    /// Held-out predictions from the winning algorithm, canonical schema
    pub predictions: DataFrame,
    /// One row per roster algorithm that trained successfully
    pub metrics: Vec<MetricRow>,
    /// Permutation importances for the winner
    pub importances: Vec<ImportanceRow>,
    pub best_algorithm: String,
}

/// Evaluate the roster on a chronological 80/20 split.
///
/// Returns `None` when there is too little clean data to split; callers
/// treat that as insufficient history, not a failure. An algorithm whose fit
/// or predict fails is skipped with a warning, keeping the roster policy of
/// "unavailable means ignored".
pub fn evaluate_holdout(
    prepared: &PreparedData,
    spec: &ModelSpec,
    roster: &[Box<dyn Regressor>],
) -> Result<Option<HoldoutOutput>> {
    let n = prepared.df.height();
    if n < MIN_HOLDOUT_ROWS || prepared.feature_columns.is_empty() {
        info!(
            family = spec.family.tag(),
            rows = n,
            "not enough clean data for holdout evaluation"
        );
        return Ok(None);
    }

    let split = ((n as f64) * 0.8).floor() as usize;
    let split = split.clamp(1, n - 1);
    let train = prepared.df.slice(0, split);
    let test = prepared.df.slice(split as i64, n - split);

    let features = &prepared.feature_columns;
    let x_train = matrix_from_rows(&feature_rows(&train, features)?)?;
    let y_train = column_as_f64(&train, spec.target)?;
    let test_rows = feature_rows(&test, features)?;
    let x_test = matrix_from_rows(&test_rows)?;
    let y_test = column_as_f64(&test, spec.target)?;

    let mut metrics = Vec::new();
    let mut best: Option<(String, Vec<f64>, f64, Box<dyn FittedRegressor>)> = None;

    for algorithm in roster {
        let fitted = match algorithm.fit(&x_train, &y_train) {
            Ok(fitted) => fitted,
            Err(e) => {
                warn!(
                    family = spec.family.tag(),
                    algorithm = algorithm.name(),
                    error = %e,
                    "algorithm failed to train, skipping it"
                );
                continue;
            }
        };
        let predicted = match fitted.predict(&x_test) {
            Ok(predicted) => predicted,
            Err(e) => {
                warn!(
                    family = spec.family.tag(),
                    algorithm = algorithm.name(),
                    error = %e,
                    "algorithm failed to predict, skipping it"
                );
                continue;
            }
        };

        let score = wmape(&y_test, &predicted);
        metrics.push(MetricRow {
            model: spec.family.tag().to_string(),
            algorithm: algorithm.name().to_string(),
            mae: mean_absolute_error(&y_test, &predicted),
            rmse: root_mean_squared_error(&y_test, &predicted),
            r2: r_squared(&y_test, &predicted),
            wmape: score,
            train_rows: split,
            test_rows: n - split,
        });

        // Strict less-than: the first algorithm to reach a score keeps it.
        let improves = match &best {
            Some((_, _, best_score, _)) => score < *best_score,
            None => true,
        };
        if improves {
            best = Some((algorithm.name().to_string(), predicted, score, fitted));
        }
    }

    let (best_algorithm, best_predictions, best_score, best_fitted) = match best {
        Some(parts) => parts,
        None => {
            warn!(
                family = spec.family.tag(),
                "no roster algorithm produced a usable model"
            );
            return Ok(None);
        }
    };

    info!(
        family = spec.family.tag(),
        algorithm = best_algorithm.as_str(),
        wmape = best_score,
        "holdout winner selected"
    );

    let baseline_mae = mean_absolute_error(&y_test, &best_predictions);
    let importances = permutation_importance(
        best_fitted.as_ref(),
        &test_rows,
        &y_test,
        baseline_mae,
        features,
        spec,
    )?;

    let predictions = prediction_frame(
        &test,
        spec,
        best_predictions,
        Some(best_algorithm.as_str()),
        None,
    )?;

    Ok(Some(HoldoutOutput {
        predictions,
        metrics,
        importances,
        best_algorithm,
    }))
}

/// Model-agnostic importance: shuffle one feature column across the held-out
/// rows (seeded per column) and measure how much the MAE degrades.
fn permutation_importance(
    model: &dyn FittedRegressor,
    rows: &[Vec<f64>],
    actual: &[f64],
    baseline_mae: f64,
    features: &[String],
    spec: &ModelSpec,
) -> Result<Vec<ImportanceRow>> {
    let mut out = Vec::with_capacity(features.len());

    for (j, feature) in features.iter().enumerate() {
        let mut rng = StdRng::seed_from_u64(PERMUTATION_SEED + j as u64);
        let mut shuffled: Vec<f64> = rows.iter().map(|r| r[j]).collect();
        shuffled.shuffle(&mut rng);

        let permuted: Vec<Vec<f64>> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut row = row.clone();
                row[j] = shuffled[i];
                row
            })
            .collect();

        let predicted = model.predict(&matrix_from_rows(&permuted)?)?;
        let degraded = mean_absolute_error(actual, &predicted);

        out.push(ImportanceRow {
            model: spec.family.tag().to_string(),
            feature: feature.clone(),
            importance: (degraded - baseline_mae).max(0.0),
        });
    }

    Ok(out)
}
