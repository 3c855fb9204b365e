//! Expanding-window walk-forward training
//!
//! For every week past a warm-up window, a fresh gradient-boosted-trees model
//! is fitted on all strictly earlier weeks and predicts the target week. That
//! yields an out-of-sample prediction for the whole history rather than only
//! a held-out tail, at the cost of one full training run per week. Models are
//! never carried between weeks: feature distributions drift by season, and a
//! stale fit is worse than the retraining bill.

use crate::config::{ModelSpec, WalkForwardConfig};
use crate::data::{
    self, column_as_f64, distinct_weeks, drop_incomplete, feature_rows, fill_missing,
    matrix_from_rows, usable_features, WEEK_KEY,
};
use crate::error::Result;
use crate::models::{FittedRegressor, GradientBoosting};
use crate::predictions::{empty_prediction_frame, prediction_frame};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Outcome of a walk-forward run over one feature table
#[derive(Debug)]
pub struct WalkForwardOutput {
    /// One row per (entity, week) in the canonical prediction schema; empty
    /// when no week was eligible
    pub predictions: DataFrame,
    /// Declared features the table did not carry
    pub missing_features: Vec<String>,
    /// Weeks skipped for an empty test slice or an under-floor training set
    pub skipped_weeks: usize,
}

impl WalkForwardOutput {
    pub fn is_empty(&self) -> bool {
        self.predictions.height() == 0
    }
}

/// Run the expanding-window procedure over a raw feature table.
///
/// Too little history is not an error: the caller gets an empty prediction
/// frame and decides what that means.
pub fn walk_forward(
    df: DataFrame,
    spec: &ModelSpec,
    config: &WalkForwardConfig,
) -> Result<WalkForwardOutput> {
    let df = data::derive_week_key(df)?;
    let (features, missing_features) = usable_features(&df, spec)?;

    if !missing_features.is_empty() {
        warn!(
            family = spec.family.tag(),
            missing = %missing_features.join(", "),
            "feature table is missing declared columns, continuing without them"
        );
    }

    if features.is_empty() {
        warn!(
            family = spec.family.tag(),
            "no declared feature column present, skipping walk-forward"
        );
        return Ok(WalkForwardOutput {
            predictions: empty_prediction_frame()?,
            missing_features,
            skipped_weeks: 0,
        });
    }

    let weeks = distinct_weeks(&df)?;
    if weeks.len() <= config.min_train_weeks {
        info!(
            family = spec.family.tag(),
            weeks = weeks.len(),
            warm_up = config.min_train_weeks,
            "not enough distinct weeks for walk-forward"
        );
        return Ok(WalkForwardOutput {
            predictions: empty_prediction_frame()?,
            missing_features,
            skipped_weeks: 0,
        });
    }

    let model = GradientBoosting::default();
    let mut frames: Vec<DataFrame> = Vec::new();
    let mut skipped = 0usize;

    for &target_week in weeks.iter().skip(config.min_train_weeks) {
        let keys = df.column(WEEK_KEY)?.i64()?;

        let test = df.filter(&keys.equal(target_week))?;
        if test.height() == 0 {
            skipped += 1;
            continue;
        }

        // Leakage guard: training rows come strictly before the target week.
        let train = df.filter(&keys.lt(target_week))?;
        let train = drop_incomplete(train, spec.target, &features)?;
        if train.height() < config.min_train_rows.max(1) {
            debug!(
                family = spec.family.tag(),
                week = target_week,
                rows = train.height(),
                "training set under the row floor, week skipped"
            );
            skipped += 1;
            continue;
        }

        let test = fill_missing(test, &features)?;
        if test.height() == 0 {
            skipped += 1;
            continue;
        }

        let x_train = matrix_from_rows(&feature_rows(&train, &features)?)?;
        let y_train = column_as_f64(&train, spec.target)?;
        let training_weeks = distinct_weeks(&train)?.len() as i64;

        let fitted = model.fit_boosted(&x_train, &y_train)?;
        let x_test = matrix_from_rows(&feature_rows(&test, &features)?)?;
        let predicted = fitted.predict(&x_test)?;

        frames.push(prediction_frame(
            &test,
            spec,
            predicted,
            None,
            Some(training_weeks),
        )?);
    }

    let mut predictions = empty_prediction_frame()?;
    for frame in &frames {
        predictions.vstack_mut(frame)?;
    }

    info!(
        family = spec.family.tag(),
        rows = predictions.height(),
        skipped_weeks = skipped,
        "walk-forward complete"
    );

    Ok(WalkForwardOutput {
        predictions,
        missing_features,
        skipped_weeks: skipped,
    })
}
