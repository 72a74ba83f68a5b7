//! Destinations for transformed records.

use std::fs;
use std::path::{Path, PathBuf};

use aou_model::OutputRecord;
use serde::Serialize;
use tracing::info;

use crate::error::LoadError;
use crate::sql::{TableName, load_script};

/// Outcome of one load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub sink: &'static str,
    pub table: String,
    pub path: PathBuf,
    pub rows: usize,
}

/// A destination that replaces the contents of `table` with `records`.
pub trait RecordSink {
    fn name(&self) -> &'static str;

    fn load(
        &mut self,
        table: &TableName,
        columns: &[&str],
        records: &[OutputRecord],
    ) -> Result<LoadSummary, LoadError>;
}

/// Writes a header row then one row per record.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for CsvSink {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn load(
        &mut self,
        table: &TableName,
        columns: &[&str],
        records: &[OutputRecord],
    ) -> Result<LoadSummary, LoadError> {
        ensure_parent(&self.path)?;
        let mut writer =
            csv::Writer::from_path(&self.path).map_err(|err| LoadError::csv(&self.path, err))?;
        writer
            .write_record(columns)
            .map_err(|err| LoadError::csv(&self.path, err))?;

        for (index, record) in records.iter().enumerate() {
            let mut row = Vec::with_capacity(columns.len());
            for column in columns {
                let value = record.get(column).ok_or_else(|| LoadError::MissingValue {
                    index,
                    column: (*column).to_string(),
                })?;
                row.push(value);
            }
            writer
                .write_record(&row)
                .map_err(|err| LoadError::csv(&self.path, err))?;
        }
        writer.flush().map_err(|err| LoadError::io(&self.path, err))?;

        info!(path = %self.path.display(), rows = records.len(), "wrote CSV export");
        Ok(LoadSummary {
            sink: self.name(),
            table: table.to_string(),
            path: self.path.clone(),
            rows: records.len(),
        })
    }
}

/// Writes a T-SQL script that replace-loads the table.
#[derive(Debug, Clone)]
pub struct SqlScriptSink {
    path: PathBuf,
    ensure_columns: Vec<String>,
}

impl SqlScriptSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ensure_columns: Vec::new(),
        }
    }

    /// Columns the script adds to the table when it lacks them.
    #[must_use]
    pub fn ensure_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ensure_columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for SqlScriptSink {
    fn name(&self) -> &'static str {
        "sql"
    }

    fn load(
        &mut self,
        table: &TableName,
        columns: &[&str],
        records: &[OutputRecord],
    ) -> Result<LoadSummary, LoadError> {
        let script = load_script(table, columns, records, &self.ensure_columns)?;
        ensure_parent(&self.path)?;
        fs::write(&self.path, script).map_err(|err| LoadError::io(&self.path, err))?;

        info!(path = %self.path.display(), table = %table, rows = records.len(), "wrote load script");
        Ok(LoadSummary {
            sink: self.name(),
            table: table.to_string(),
            path: self.path.clone(),
            rows: records.len(),
        })
    }
}

fn ensure_parent(path: &Path) -> Result<(), LoadError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|err| LoadError::io(parent, err))
        }
        _ => Ok(()),
    }
}
