//! Data preparation shared by the walk-forward trainer and the holdout
//! evaluator
//!
//! A feature table arrives as a polars [`DataFrame`] with grouping
//! dimensions, `year`/`week` columns, numeric feature columns and a target.
//! Preparation selects the declared features actually present, drops rows
//! with a null target or null available feature, zero-fills whatever nulls
//! remain, and carries the identifying metadata through untouched.

use crate::config::ModelSpec;
use crate::error::{ForecastError, Result};
use polars::prelude::*;
use smartcore::linalg::basic::matrix::DenseMatrix;

/// Derived composite week key column, `year * 100 + week`
pub const WEEK_KEY: &str = "week_key";

/// A cleaned feature table ready for training
#[derive(Debug, Clone)]
pub struct PreparedData {
    /// Meta + feature + target columns, sorted by week key
    pub df: DataFrame,
    /// Declared features that were present and survived preparation
    pub feature_columns: Vec<String>,
    /// Declared features absent from the table; reported, not fatal
    pub missing_features: Vec<String>,
    /// Identifying columns: year, week, week key and the grouping dimensions
    /// present in the table
    pub meta_columns: Vec<String>,
}

/// Add the composite week key column when the table does not already carry it
pub fn derive_week_key(df: DataFrame) -> Result<DataFrame> {
    if df.get_column_names().contains(&WEEK_KEY) {
        return Ok(df);
    }

    let df = df
        .lazy()
        .with_column(
            (col("year") * lit(100) + col("week"))
                .cast(DataType::Int64)
                .alias(WEEK_KEY),
        )
        .collect()?;
    Ok(df)
}

/// Partition the spec's declared features into those present in the table and
/// those missing from it. Fails when the target column itself is absent.
pub fn usable_features(df: &DataFrame, spec: &ModelSpec) -> Result<(Vec<String>, Vec<String>)> {
    let columns = df.get_column_names();

    if !columns.contains(&spec.target) {
        return Err(ForecastError::MissingTarget {
            table: spec.table.to_string(),
            column: spec.target.to_string(),
        });
    }

    let mut present = Vec::new();
    let mut missing = Vec::new();
    for feature in spec.features {
        if columns.contains(feature) {
            present.push(feature.to_string());
        } else {
            missing.push(feature.to_string());
        }
    }

    Ok((present, missing))
}

/// Drop every row with a null target or a null value in any available
/// feature column. This is the cleaning rule applied to training data.
pub fn drop_incomplete(df: DataFrame, target: &str, features: &[String]) -> Result<DataFrame> {
    let mut keep = col(target).is_not_null();
    for feature in features {
        keep = keep.and(col(feature.as_str()).is_not_null());
    }

    let df = df.lazy().filter(keep).collect()?;
    Ok(df)
}

/// Zero-fill nulls in the feature columns and cast them to f64. This is the
/// rule applied to test slices, where rows must not be dropped.
pub fn fill_missing(df: DataFrame, features: &[String]) -> Result<DataFrame> {
    if features.is_empty() {
        return Ok(df);
    }

    let exprs: Vec<Expr> = features
        .iter()
        .map(|f| {
            col(f.as_str())
                .cast(DataType::Float64)
                .fill_null(lit(0.0))
                .alias(f.as_str())
        })
        .collect();

    let df = df.lazy().with_columns(exprs).collect()?;
    Ok(df)
}

/// Identifying columns carried alongside predictions: year, week, week key
/// and whichever grouping dimensions the table actually has.
pub fn meta_columns(df: &DataFrame, spec: &ModelSpec) -> Vec<String> {
    let columns = df.get_column_names();
    let mut meta = vec!["year".to_string(), "week".to_string(), WEEK_KEY.to_string()];
    for dim in spec.group_columns {
        if columns.contains(dim) {
            meta.push(dim.to_string());
        }
    }
    meta
}

/// Full preparation: feature selection, drop rule, residual zero-fill, week
/// key derivation and a chronological sort.
pub fn prepare(df: DataFrame, spec: &ModelSpec) -> Result<PreparedData> {
    let df = derive_week_key(df)?;
    let (feature_columns, missing_features) = usable_features(&df, spec)?;
    let meta = meta_columns(&df, spec);

    let df = drop_incomplete(df, spec.target, &feature_columns)?;
    let df = fill_missing(df, &feature_columns)?;
    let df = df.lazy().sort(WEEK_KEY, Default::default()).collect()?;

    Ok(PreparedData {
        df,
        feature_columns,
        missing_features,
        meta_columns: meta,
    })
}

/// Distinct week keys present in the table, ascending
pub fn distinct_weeks(df: &DataFrame) -> Result<Vec<i64>> {
    let weeks = df.column(WEEK_KEY)?.unique()?.sort(false);
    Ok(weeks.i64()?.into_no_null_iter().collect())
}

/// Extract a numeric column as f64 values, nulls mapped to 0.0
pub fn column_as_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let col = df
        .column(name)
        .map_err(|e| ForecastError::Data(format!("column '{}' not found: {}", name, e)))?;

    let col = col
        .cast(&DataType::Float64)
        .map_err(|_| ForecastError::Data(format!("column '{}' is not numeric", name)))?;

    Ok(col
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect())
}

/// Feature rows in table order, one `Vec<f64>` per observation
pub fn feature_rows(df: &DataFrame, features: &[String]) -> Result<Vec<Vec<f64>>> {
    let mut columns = Vec::with_capacity(features.len());
    for feature in features {
        columns.push(column_as_f64(df, feature)?);
    }

    let height = df.height();
    let mut rows = Vec::with_capacity(height);
    for i in 0..height {
        rows.push(columns.iter().map(|c| c[i]).collect());
    }
    Ok(rows)
}

/// Pack feature rows into the row-major matrix smartcore consumes
pub fn matrix_from_rows(rows: &[Vec<f64>]) -> Result<DenseMatrix<f64>> {
    let nrows = rows.len();
    if nrows == 0 {
        return Err(ForecastError::Data(
            "cannot build a feature matrix from zero rows".to_string(),
        ));
    }

    let ncols = rows[0].len();
    let mut flat = Vec::with_capacity(nrows * ncols);
    for row in rows {
        flat.extend_from_slice(row);
    }

    Ok(DenseMatrix::new(nrows, ncols, flat, false))
}
