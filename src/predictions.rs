//! Canonical prediction table
//!
//! Walk-forward and holdout predictions land in one combined table, so both
//! paths emit the same schema. Families that lack a grouping dimension leave
//! it null; walk-forward rows leave `algorithm` null and holdout rows leave
//! `training_weeks` null.

use crate::config::{ModelSpec, ALL_DIMENSIONS};
use crate::data::WEEK_KEY;
use crate::error::Result;
use polars::prelude::*;

/// Column order of the combined prediction table
pub const PREDICTION_COLUMNS: [&str; 11] = [
    "model",
    "algorithm",
    "year",
    "week",
    "week_key",
    "farm",
    "variety",
    "customer",
    "actual",
    "predicted",
    "training_weeks",
];

/// Build a prediction frame from a test slice and its predicted values
pub fn prediction_frame(
    test: &DataFrame,
    spec: &ModelSpec,
    predicted: Vec<f64>,
    algorithm: Option<&str>,
    training_weeks: Option<i64>,
) -> Result<DataFrame> {
    let n = predicted.len();
    let columns = test.get_column_names();

    let model = Series::new("model", vec![spec.family.tag(); n]);
    let algorithm = match algorithm {
        Some(name) => Series::new("algorithm", vec![name; n]),
        None => Series::full_null("algorithm", n, &DataType::Utf8),
    };
    let year = test.column("year")?.cast(&DataType::Int64)?;
    let week = test.column("week")?.cast(&DataType::Int64)?;
    let week_key = test.column(WEEK_KEY)?.cast(&DataType::Int64)?;

    let mut dims = Vec::with_capacity(ALL_DIMENSIONS.len());
    for dim in ALL_DIMENSIONS {
        if spec.group_columns.contains(&dim) && columns.contains(&dim) {
            dims.push(test.column(dim)?.cast(&DataType::Utf8)?);
        } else {
            dims.push(Series::full_null(dim, n, &DataType::Utf8));
        }
    }

    // Nulls in the target survive here: a test row without an actual still
    // gets a prediction.
    let mut actual = test.column(spec.target)?.cast(&DataType::Float64)?;
    actual.rename("actual");

    let predicted = Series::new("predicted", predicted);
    let training_weeks = match training_weeks {
        Some(weeks) => Series::new("training_weeks", vec![weeks; n]),
        None => Series::full_null("training_weeks", n, &DataType::Int64),
    };

    let mut series = vec![model, algorithm, year, week, week_key];
    series.extend(dims);
    series.extend([actual, predicted, training_weeks]);

    Ok(DataFrame::new(series)?)
}

/// An empty frame with the canonical schema, for the no-eligible-week case
pub fn empty_prediction_frame() -> Result<DataFrame> {
    let series = vec![
        Series::new_empty("model", &DataType::Utf8),
        Series::new_empty("algorithm", &DataType::Utf8),
        Series::new_empty("year", &DataType::Int64),
        Series::new_empty("week", &DataType::Int64),
        Series::new_empty(WEEK_KEY, &DataType::Int64),
        Series::new_empty("farm", &DataType::Utf8),
        Series::new_empty("variety", &DataType::Utf8),
        Series::new_empty("customer", &DataType::Utf8),
        Series::new_empty("actual", &DataType::Float64),
        Series::new_empty("predicted", &DataType::Float64),
        Series::new_empty("training_weeks", &DataType::Int64),
    ];

    Ok(DataFrame::new(series)?)
}
