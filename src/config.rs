//! Per-family model configuration
//!
//! Each model family carries a static [`ModelSpec`]: the warehouse table it
//! reads, its target column, the feature columns the upstream feature build
//! is expected to produce, and the grouping dimensions its accuracy rollups
//! use. The specs are fixed at compile time so grouping-column and
//! feature-list access is statically checkable.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every grouping dimension that can appear across families. The combined
/// prediction table carries all of them; families that lack one leave it null.
pub const ALL_DIMENSIONS: [&str; 3] = ["farm", "variety", "customer"];

/// The four forecast model families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    Demand,
    Dispatch,
    Production,
    Rejection,
}

impl ModelFamily {
    /// All families, in pipeline execution order
    pub const ALL: [ModelFamily; 4] = [
        ModelFamily::Demand,
        ModelFamily::Dispatch,
        ModelFamily::Production,
        ModelFamily::Rejection,
    ];

    /// Tag used in result tables and log lines
    pub fn tag(&self) -> &'static str {
        match self {
            ModelFamily::Demand => "demand",
            ModelFamily::Dispatch => "dispatch",
            ModelFamily::Production => "production",
            ModelFamily::Rejection => "rejection",
        }
    }

    /// The static configuration for this family
    pub fn spec(&self) -> ModelSpec {
        match self {
            ModelFamily::Demand => ModelSpec {
                family: *self,
                table: "features_demand",
                target: "demand_qty",
                features: &[
                    "week_sin",
                    "week_cos",
                    "lag_1",
                    "lag_2",
                    "lag_4",
                    "lag_52",
                    "rolling_mean_4",
                    "rolling_mean_12",
                    "customer_share_4w",
                    "variety_total_lag_1",
                ],
                group_columns: &["variety", "customer"],
                description: "weekly stems demanded per variety and customer",
            },
            ModelFamily::Dispatch => ModelSpec {
                family: *self,
                table: "features_dispatch",
                target: "dispatched_qty",
                features: &[
                    "week_sin",
                    "week_cos",
                    "lag_1",
                    "lag_2",
                    "lag_4",
                    "rolling_mean_4",
                    "rolling_mean_8",
                    "fulfillment_rate_4w",
                    "customer_total_lag_1",
                ],
                group_columns: &["variety", "customer"],
                description: "weekly stems dispatched per variety and customer",
            },
            ModelFamily::Production => ModelSpec {
                family: *self,
                table: "features_production",
                target: "produced_qty",
                features: &[
                    "week_sin",
                    "week_cos",
                    "lag_1",
                    "lag_2",
                    "lag_4",
                    "lag_52",
                    "rolling_mean_4",
                    "rolling_mean_12",
                    "farm_total_lag_1",
                    "area_planted",
                ],
                group_columns: &["farm", "variety"],
                description: "weekly stems harvested per farm and variety",
            },
            ModelFamily::Rejection => ModelSpec {
                family: *self,
                table: "features_rejection",
                target: "rejected_qty",
                features: &[
                    "week_sin",
                    "week_cos",
                    "lag_1",
                    "lag_2",
                    "rolling_mean_4",
                    "rejection_rate_4w",
                    "farm_total_lag_1",
                    "production_lag_1",
                ],
                group_columns: &["farm", "variety"],
                description: "weekly stems rejected at quality control per farm and variety",
            },
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ModelFamily {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "demand" => Ok(ModelFamily::Demand),
            "dispatch" => Ok(ModelFamily::Dispatch),
            "production" => Ok(ModelFamily::Production),
            "rejection" => Ok(ModelFamily::Rejection),
            other => Err(ForecastError::Data(format!(
                "unknown model family '{}' (expected demand, dispatch, production or rejection)",
                other
            ))),
        }
    }
}

/// Static per-family configuration
#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub family: ModelFamily,
    /// Source table name in the warehouse
    pub table: &'static str,
    /// Target column name
    pub target: &'static str,
    /// Feature columns the upstream build is expected to deliver. Missing
    /// ones are reported by the data preparer, not fatal.
    pub features: &'static [&'static str],
    /// Grouping dimensions accuracy is rolled up by
    pub group_columns: &'static [&'static str],
    pub description: &'static str,
}

/// Knobs for the expanding-window walk-forward trainer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkForwardConfig {
    /// Warm-up: number of distinct weeks that must precede the first
    /// predicted week
    pub min_train_weeks: usize,
    /// Per-week floor on cleaned training rows, applied independently of the
    /// warm-up because weeks can be sparse even late in history
    pub min_train_rows: usize,
}

impl Default for WalkForwardConfig {
    fn default() -> Self {
        Self {
            min_train_weeks: 12,
            min_train_rows: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_round_trips_through_str() {
        for family in ModelFamily::ALL {
            let parsed: ModelFamily = family.tag().parse().unwrap();
            assert_eq!(parsed, family);
        }
        assert!("staffing".parse::<ModelFamily>().is_err());
    }

    #[test]
    fn specs_only_use_known_dimensions() {
        for family in ModelFamily::ALL {
            let spec = family.spec();
            assert!(!spec.features.is_empty());
            for dim in spec.group_columns {
                assert!(ALL_DIMENSIONS.contains(dim), "unknown dimension {}", dim);
            }
        }
    }
}
