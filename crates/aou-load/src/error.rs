//! Error types for loading and post-load jobs.

use std::path::PathBuf;

use thiserror::Error;

use crate::job::JobStep;

#[derive(Debug, Error)]
pub enum LoadError {
    /// The configured table is not `[catalog.]schema.table` or `table`.
    #[error("invalid table name '{name}': {reason}")]
    InvalidTableName { name: String, reason: String },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A record lacks one of the columns being loaded.
    #[error("record {index} has no value for column '{column}'")]
    MissingValue { index: usize, column: String },

    /// An export being compared lacks its key column.
    #[error("{path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

/// The post-load job did not complete successfully.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("job '{name}' has no {step} command configured")]
    EmptyCommand { name: String, step: JobStep },

    #[error("failed to run {step} command of job '{name}': {source}")]
    Spawn {
        name: String,
        step: JobStep,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to poll {step} command of job '{name}': {source}")]
    Wait {
        name: String,
        step: JobStep,
        #[source]
        source: std::io::Error,
    },

    #[error("job '{name}' exceeded its timeout of {timeout_secs} seconds")]
    Timeout { name: String, timeout_secs: u64 },

    #[error("{step} command of job '{name}' failed ({status})")]
    Failed {
        name: String,
        step: JobStep,
        status: String,
    },

    #[error("unrecognized status from job '{name}': '{output}'")]
    InvalidStatus { name: String, output: String },

    #[error("job '{name}' did not run successfully (last run outcome {outcome})")]
    Unsuccessful { name: String, outcome: i64 },
}
