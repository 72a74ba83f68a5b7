use std::path::PathBuf;
use std::time::Duration;

use aou_load::{JobOutcome, LoadSummary};
use aou_transform::PolicyVersion;
use chrono::NaiveDate;

/// What a `refresh` or `transform` run did.
#[derive(Debug)]
pub struct RunReport {
    /// Target table; `source` names the input file for offline runs.
    pub target: String,
    pub source: Option<PathBuf>,
    pub as_of: NaiveDate,
    pub policy: PolicyVersion,
    pub fetched: usize,
    pub transformed: usize,
    pub with_retention_date: usize,
    pub outputs: Vec<LoadSummary>,
    pub job: Option<JobOutcome>,
    pub dry_run: bool,
    pub elapsed: Duration,
}
