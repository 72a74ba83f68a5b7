//! Load side of the refresh.
//!
//! - **sql**: table names and T-SQL rendering
//! - **sink**: [`RecordSink`] implementations for CSV exports and load scripts
//! - **job**: the post-load job runner
//! - **compare**: participant-level diff of two exports

pub mod compare;
pub mod error;
pub mod job;
pub mod sink;
pub mod sql;

pub use compare::{ColumnChange, Comparison, ParticipantDiff, compare, read_export};
pub use error::{JobError, LoadError};
pub use job::{JobOutcome, JobRunner, JobStatus, JobStep};
pub use sink::{CsvSink, LoadSummary, RecordSink, SqlScriptSink};
pub use sql::{DEFAULT_SCHEMA, MAX_ROWS_PER_INSERT, TableName};
