//! Per-family orchestration and result materialization
//!
//! Each requested family runs independently: read its feature table, produce
//! full-history walk-forward predictions, run the holdout comparison, roll up
//! accuracy, and carry everything to the combined result tables at the end.
//! A family with a missing table, a broken target column or a malformed
//! schema is skipped with a logged reason; warehouse I/O failures abort the
//! whole run.

use crate::accuracy::{dimension_accuracy, weekly_accuracy};
use crate::config::{ModelFamily, ModelSpec, WalkForwardConfig};
use crate::error::{ForecastError, Result};
use crate::evaluate::{evaluate_holdout, HoldoutOutput, ImportanceRow, MetricRow};
use crate::models::{default_roster, Regressor};
use crate::predictions::empty_prediction_frame;
use crate::sink::Warehouse;
use crate::data;
use crate::walk_forward::{walk_forward, WalkForwardOutput};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{error, info, warn};

pub const PREDICTIONS_TABLE: &str = "forecast_predictions";
pub const METRICS_TABLE: &str = "forecast_model_metrics";
pub const IMPORTANCE_TABLE: &str = "forecast_feature_importance";
pub const WEEKLY_ACCURACY_TABLE: &str = "forecast_accuracy_weekly";
pub const RUN_SUMMARY_FILE: &str = "run_summary.json";

/// Result table name for one grouping dimension
pub fn dimension_table(dimension: &str) -> String {
    format!("forecast_accuracy_by_{}", dimension)
}

/// How one family's run ended
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyStatus {
    Completed,
    SkippedMissingTable,
    Failed { reason: String },
}

/// Per-family slice of the run summary
#[derive(Debug, Clone, Serialize)]
pub struct FamilySummary {
    pub family: ModelFamily,
    pub status: FamilyStatus,
    pub walk_forward_rows: usize,
    pub holdout_rows: usize,
    pub best_algorithm: Option<String>,
    pub missing_features: Vec<String>,
    pub skipped_weeks: usize,
}

impl FamilySummary {
    fn empty(family: ModelFamily, status: FamilyStatus) -> Self {
        Self {
            family,
            status,
            walk_forward_rows: 0,
            holdout_rows: 0,
            best_algorithm: None,
            missing_features: Vec::new(),
            skipped_weeks: 0,
        }
    }
}

/// Machine-readable summary written next to the result tables
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub families: Vec<FamilySummary>,
}

struct FamilyOutput {
    walk_forward: WalkForwardOutput,
    holdout: Option<HoldoutOutput>,
    weekly: Option<DataFrame>,
    by_dimension: Vec<(String, DataFrame)>,
}

/// The forecasting pipeline over one warehouse
#[derive(Debug)]
pub struct Pipeline {
    warehouse: Warehouse,
    config: WalkForwardConfig,
}

impl Pipeline {
    pub fn new(warehouse: Warehouse, config: WalkForwardConfig) -> Self {
        Self { warehouse, config }
    }

    /// Run the requested families and overwrite the result tables
    pub fn run(&self, families: &[ModelFamily]) -> Result<RunSummary> {
        let roster = default_roster();

        let mut combined = empty_prediction_frame()?;
        let mut metrics: Vec<MetricRow> = Vec::new();
        let mut importances: Vec<ImportanceRow> = Vec::new();
        let mut weekly_frames: Vec<DataFrame> = Vec::new();
        let mut dim_frames: BTreeMap<String, Vec<DataFrame>> = BTreeMap::new();
        let mut summaries: Vec<FamilySummary> = Vec::new();

        for &family in families {
            let spec = family.spec();

            let table = match self.warehouse.feature_table(&spec) {
                Ok(table) => table,
                Err(ForecastError::MissingFeatureTable { table }) => {
                    warn!(family = spec.family.tag(), table = table.as_str(), "feature table missing, family skipped");
                    summaries.push(FamilySummary::empty(family, FamilyStatus::SkippedMissingTable));
                    continue;
                }
                Err(e) => return Err(e),
            };

            match run_family(table, &spec, &self.config, &roster) {
                Ok(output) => {
                    combined.vstack_mut(&output.walk_forward.predictions)?;
                    let mut holdout_rows = 0;
                    let mut best_algorithm = None;
                    if let Some(holdout) = &output.holdout {
                        combined.vstack_mut(&holdout.predictions)?;
                        holdout_rows = holdout.predictions.height();
                        best_algorithm = Some(holdout.best_algorithm.clone());
                        metrics.extend(holdout.metrics.iter().cloned());
                        importances.extend(holdout.importances.iter().cloned());
                    }
                    if let Some(weekly) = output.weekly {
                        weekly_frames.push(weekly);
                    }
                    for (dimension, frame) in output.by_dimension {
                        dim_frames.entry(dimension).or_default().push(frame);
                    }

                    summaries.push(FamilySummary {
                        family,
                        status: FamilyStatus::Completed,
                        walk_forward_rows: output.walk_forward.predictions.height(),
                        holdout_rows,
                        best_algorithm,
                        missing_features: output.walk_forward.missing_features.clone(),
                        skipped_weeks: output.walk_forward.skipped_weeks,
                    });
                }
                // Warehouse I/O stays fatal; everything a family's own table
                // can cause, including polars errors from a malformed schema,
                // fails that family alone.
                Err(e @ ForecastError::Io(_)) => return Err(e),
                Err(e) => {
                    error!(family = spec.family.tag(), error = %e, "family failed, continuing with the rest");
                    summaries.push(FamilySummary::empty(
                        family,
                        FamilyStatus::Failed { reason: e.to_string() },
                    ));
                }
            }
        }

        self.warehouse.write_table(PREDICTIONS_TABLE, &mut combined)?;
        self.warehouse
            .write_table(METRICS_TABLE, &mut metrics_frame(&metrics)?)?;
        self.warehouse
            .write_table(IMPORTANCE_TABLE, &mut importance_frame(&importances)?)?;

        let mut weekly = empty_weekly_frame()?;
        for frame in &weekly_frames {
            weekly.vstack_mut(frame)?;
        }
        self.warehouse.write_table(WEEKLY_ACCURACY_TABLE, &mut weekly)?;

        for (dimension, frames) in dim_frames {
            let mut combined_dim: Option<DataFrame> = None;
            for frame in frames {
                match combined_dim.as_mut() {
                    None => combined_dim = Some(frame),
                    Some(acc) => {
                        acc.vstack_mut(&frame)?;
                    }
                }
            }
            if let Some(mut frame) = combined_dim {
                self.warehouse
                    .write_table(&dimension_table(&dimension), &mut frame)?;
            }
        }

        let summary = RunSummary {
            generated_at: Utc::now(),
            families: summaries,
        };
        self.warehouse.write_json(RUN_SUMMARY_FILE, &summary)?;

        info!(
            predictions = combined.height(),
            families = summary.families.len(),
            "pipeline run complete"
        );
        Ok(summary)
    }
}

fn run_family(
    table: DataFrame,
    spec: &ModelSpec,
    config: &WalkForwardConfig,
    roster: &[Box<dyn Regressor>],
) -> Result<FamilyOutput> {
    info!(family = spec.family.tag(), rows = table.height(), "running family");

    let walk = walk_forward(table.clone(), spec, config)?;
    let prepared = data::prepare(table, spec)?;
    let holdout = evaluate_holdout(&prepared, spec, roster)?;

    let mut weekly = None;
    let mut by_dimension = Vec::new();
    if let Some(holdout) = &holdout {
        if holdout.predictions.height() > 0 {
            weekly = Some(weekly_accuracy(&holdout.predictions)?);
            for dimension in spec.group_columns {
                if prepared.meta_columns.iter().any(|m| m == dimension) {
                    by_dimension.push((
                        dimension.to_string(),
                        dimension_accuracy(&holdout.predictions, dimension)?,
                    ));
                }
            }
        }
    }

    Ok(FamilyOutput {
        walk_forward: walk,
        holdout,
        weekly,
        by_dimension,
    })
}

fn metrics_frame(rows: &[MetricRow]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Series::new("model", rows.iter().map(|r| r.model.as_str()).collect::<Vec<_>>()),
        Series::new(
            "algorithm",
            rows.iter().map(|r| r.algorithm.as_str()).collect::<Vec<_>>(),
        ),
        Series::new("mae", rows.iter().map(|r| r.mae).collect::<Vec<_>>()),
        Series::new("rmse", rows.iter().map(|r| r.rmse).collect::<Vec<_>>()),
        Series::new("r2", rows.iter().map(|r| r.r2).collect::<Vec<_>>()),
        Series::new("wmape", rows.iter().map(|r| r.wmape).collect::<Vec<_>>()),
        Series::new(
            "train_rows",
            rows.iter().map(|r| r.train_rows as i64).collect::<Vec<_>>(),
        ),
        Series::new(
            "test_rows",
            rows.iter().map(|r| r.test_rows as i64).collect::<Vec<_>>(),
        ),
    ])?;
    Ok(df)
}

fn importance_frame(rows: &[ImportanceRow]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Series::new("model", rows.iter().map(|r| r.model.as_str()).collect::<Vec<_>>()),
        Series::new(
            "feature",
            rows.iter().map(|r| r.feature.as_str()).collect::<Vec<_>>(),
        ),
        Series::new(
            "importance",
            rows.iter().map(|r| r.importance).collect::<Vec<_>>(),
        ),
    ])?;
    Ok(df)
}

fn empty_weekly_frame() -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Series::new_empty("model", &DataType::Utf8),
        Series::new_empty("year", &DataType::Int64),
        Series::new_empty("week", &DataType::Int64),
        Series::new_empty(data::WEEK_KEY, &DataType::Int64),
        Series::new_empty("actual_total", &DataType::Float64),
        Series::new_empty("predicted_total", &DataType::Float64),
        Series::new_empty("abs_error_total", &DataType::Float64),
        Series::new_empty("wmape", &DataType::Float64),
    ])?;
    Ok(df)
}
