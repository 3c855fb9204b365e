//! Accuracy rollups over holdout predictions
//!
//! Per-row absolute and percent errors (the actual floored at 1 so zero
//! weeks don't divide by zero), then one rollup by week and one per grouping
//! dimension of the family. WMAPE at every level uses the same floored
//! denominator.

use crate::data::WEEK_KEY;
use crate::error::Result;
use polars::prelude::*;

/// Floor an aggregated or per-row actual at 1.0 before dividing by it
fn floored(expr: Expr) -> Expr {
    when(expr.clone().lt(lit(1.0))).then(lit(1.0)).otherwise(expr)
}

/// Attach `abs_error` and `pct_error` columns to a prediction frame
pub fn with_row_errors(predictions: DataFrame) -> Result<DataFrame> {
    let df = predictions
        .lazy()
        .with_column(
            (col("actual").fill_null(lit(0.0)) - col("predicted"))
                .abs()
                .alias("abs_error"),
        )
        .with_column(
            (col("abs_error") / floored(col("actual").fill_null(lit(0.0))) * lit(100.0))
                .alias("pct_error"),
        )
        .collect()?;
    Ok(df)
}

fn rollup(enriched: DataFrame, keys: Vec<Expr>, sort_by: &str) -> Result<DataFrame> {
    let df = enriched
        .lazy()
        .groupby(keys)
        .agg([
            col("actual").fill_null(lit(0.0)).sum().alias("actual_total"),
            col("predicted").sum().alias("predicted_total"),
            col("abs_error").sum().alias("abs_error_total"),
        ])
        .with_column(
            (col("abs_error_total") / floored(col("actual_total")) * lit(100.0)).alias("wmape"),
        )
        .sort(sort_by, Default::default())
        .collect()?;
    Ok(df)
}

/// Weekly rollup: grouped by year and week, summed actual/predicted/absolute
/// error plus derived WMAPE
pub fn weekly_accuracy(predictions: &DataFrame) -> Result<DataFrame> {
    let enriched = with_row_errors(predictions.clone())?;
    rollup(
        enriched,
        vec![col("model"), col("year"), col("week"), col(WEEK_KEY)],
        WEEK_KEY,
    )
}

/// Rollup by one grouping dimension (e.g. customer, farm, variety)
pub fn dimension_accuracy(predictions: &DataFrame, dimension: &str) -> Result<DataFrame> {
    let enriched = with_row_errors(predictions.clone())?;
    let enriched = enriched
        .lazy()
        .filter(col(dimension).is_not_null())
        .collect()?;
    rollup(enriched, vec![col("model"), col(dimension)], dimension)
}
