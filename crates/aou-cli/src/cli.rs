//! CLI argument definitions for the AoU refresh.

use std::path::PathBuf;

use aou_transform::PolicyVersion;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "aou-refresh",
    version,
    about = "Refresh AoU participant data into the HealthPro work-queue format",
    long_about = "Pull participant summaries from the AoU API, convert them to the\n\
                  HealthPro work-queue schema with an Active Retention Date, and\n\
                  write CSV exports and T-SQL load scripts."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Write logs to rotating per-crate files in this directory.
    #[arg(
        long = "log-dir",
        value_name = "DIR",
        global = true,
        conflicts_with = "log_file"
    )]
    pub log_dir: Option<PathBuf>,

    /// Allow participant identifiers in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch from the API, transform, and write load outputs.
    Refresh(RefreshArgs),

    /// Transform saved API output offline.
    Transform(TransformArgs),

    /// List the output columns in order.
    Columns,

    /// Compare two CSV exports participant by participant.
    Compare(CompareArgs),
}

#[derive(Parser)]
pub struct RefreshArgs {
    /// Site configuration file.
    #[arg(long = "site-config", value_name = "PATH")]
    pub site_config: PathBuf,

    /// API specification file.
    #[arg(long = "api-spec", alias = "aou-api-spec", value_name = "PATH")]
    pub api_spec: PathBuf,

    /// Stop fetching once about this many records have been read.
    #[arg(long = "maxrows", value_name = "N")]
    pub maxrows: Option<usize>,

    /// Processing date for the retention window (default: today, US/Eastern).
    #[arg(long = "as-of", value_name = "YYYY-MM-DD")]
    pub as_of: Option<NaiveDate>,

    /// Fetch and transform without writing outputs or running the job.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct TransformArgs {
    /// Saved bundle or JSON array of participant summaries.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// CSV file to write.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: PathBuf,

    /// Also write a T-SQL load script.
    #[arg(long = "sql", value_name = "PATH")]
    pub sql: Option<PathBuf>,

    /// Target table for the load script.
    #[arg(long = "table", value_name = "NAME", default_value = "dbo.healthpro")]
    pub table: String,

    /// Processing date for the retention window (default: today, US/Eastern).
    #[arg(long = "as-of", value_name = "YYYY-MM-DD")]
    pub as_of: Option<NaiveDate>,

    /// Retention policy version.
    #[arg(long = "policy", value_enum, default_value = "current")]
    pub policy: PolicyArg,
}

#[derive(Parser)]
pub struct CompareArgs {
    /// Baseline export.
    #[arg(value_name = "LEFT")]
    pub left: PathBuf,

    /// Export to compare against the baseline.
    #[arg(value_name = "RIGHT")]
    pub right: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    Current,
    Baseline,
}

impl From<PolicyArg> for PolicyVersion {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Current => Self::Current,
            PolicyArg::Baseline => Self::Baseline,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
