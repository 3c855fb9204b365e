//! Columnar warehouse access
//!
//! Feature tables are read from, and result tables written to, a single
//! warehouse directory as parquet files (csv is accepted on the read side for
//! hand-built tables). Every write fully replaces the previous table:
//! parquet goes to a `.tmp` sibling first and is renamed over the
//! destination, so a failed write never leaves a partial table visible.

use crate::config::ModelSpec;
use crate::error::{ForecastError, Result};
use polars::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Handle on the warehouse directory
#[derive(Debug, Clone)]
pub struct Warehouse {
    root: PathBuf,
}

impl Warehouse {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn parquet_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{}.parquet", table))
    }

    /// Load the feature table for a model family. A missing table is its own
    /// error kind so the pipeline can skip the family and move on.
    pub fn feature_table(&self, spec: &ModelSpec) -> Result<DataFrame> {
        let parquet = self.parquet_path(spec.table);
        if parquet.exists() {
            let file = File::open(&parquet)?;
            return Ok(ParquetReader::new(file).finish()?);
        }

        let csv = self.root.join(format!("{}.csv", spec.table));
        if csv.exists() {
            let file = File::open(&csv)?;
            return Ok(CsvReader::new(file)
                .infer_schema(None)
                .has_header(true)
                .finish()?);
        }

        Err(ForecastError::MissingFeatureTable {
            table: spec.table.to_string(),
        })
    }

    /// Read a result table back, mainly for consumers and tests
    pub fn read_table(&self, table: &str) -> Result<DataFrame> {
        let path = self.parquet_path(table);
        if !path.exists() {
            return Err(ForecastError::MissingFeatureTable {
                table: table.to_string(),
            });
        }
        let file = File::open(path)?;
        Ok(ParquetReader::new(file).finish()?)
    }

    /// Overwrite a result table, all-or-nothing
    pub fn write_table(&self, table: &str, df: &mut DataFrame) -> Result<()> {
        fs::create_dir_all(&self.root)?;

        let tmp = self.root.join(format!("{}.parquet.tmp", table));
        let file = File::create(&tmp)?;
        ParquetWriter::new(file).finish(df)?;
        fs::rename(&tmp, self.parquet_path(table))?;

        debug!(table, rows = df.height(), "table written");
        Ok(())
    }

    /// Overwrite a small JSON artifact next to the tables (the run summary)
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.root)?;

        let body = serde_json::to_string_pretty(value)
            .map_err(|e| ForecastError::Data(format!("summary serialization failed: {}", e)))?;
        let tmp = self.root.join(format!("{}.tmp", name));
        fs::write(&tmp, body)?;
        fs::rename(&tmp, self.root.join(name))?;
        Ok(())
    }
}
