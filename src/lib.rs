//! # Bloom Forecast
//!
//! A Rust library for weekly forecasting over flower-farm feature tables.
//!
//! ## Features
//!
//! - Four model families (demand, dispatch, production, rejection), each
//!   driven by a typed, compile-time [`config::ModelSpec`]
//! - Expanding-window walk-forward training: an out-of-sample prediction for
//!   every historical week past the warm-up, with a strict temporal leakage
//!   guard
//! - Holdout evaluation of a fixed regression roster (random forest,
//!   gradient-boosted trees, decision tree, linear), winner picked by
//!   weighted MAPE
//! - Permutation feature importance for the winning algorithm
//! - Weekly and per-dimension accuracy rollups
//! - Parquet warehouse sink with all-or-nothing overwrites
//!
//! ## Quick Start
//!
//! ```no_run
//! use bloom_forecast::config::{ModelFamily, WalkForwardConfig};
//! use bloom_forecast::pipeline::Pipeline;
//! use bloom_forecast::sink::Warehouse;
//!
//! # fn main() -> bloom_forecast::Result<()> {
//! let warehouse = Warehouse::new("./warehouse");
//! let pipeline = Pipeline::new(warehouse, WalkForwardConfig::default());
//!
//! // Run a single family, or all of them
//! let summary = pipeline.run(&[ModelFamily::Demand])?;
//! for family in &summary.families {
//!     println!("{}: {:?}", family.family, family.status);
//! }
//! # Ok(())
//! # }
//! ```

pub mod accuracy;
pub mod config;
pub mod data;
pub mod error;
pub mod evaluate;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod predictions;
pub mod sink;
pub mod walk_forward;

// Re-export commonly used types
pub use crate::config::{ModelFamily, ModelSpec, WalkForwardConfig};
pub use crate::data::PreparedData;
pub use crate::error::{ForecastError, Result};
pub use crate::evaluate::{HoldoutOutput, ImportanceRow, MetricRow};
pub use crate::pipeline::{Pipeline, RunSummary};
pub use crate::sink::Warehouse;
pub use crate::walk_forward::WalkForwardOutput;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
