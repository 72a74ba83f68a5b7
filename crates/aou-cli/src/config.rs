//! Site configuration file.
//!
//! ```json
//! {"db-table-name": "dm_aou.dbo.healthpro",
//!  "paired-organization-params": {"organization": "COLUMBIA_WEILL"},
//!  "output-dir": "out",
//!  "load-format": "both",
//!  "should-run-agent-job": true,
//!  "agent-job-name": "HealthPro refresh",
//!  "agent-job-command": ["sqlcmd", "-b", "-Q", "EXEC msdb.dbo.sp_start_job N'HealthPro refresh'"],
//!  "agent-job-status-command": ["/opt/aou/agent-job-status", "HealthPro refresh"],
//!  "agent-job-timeout": 20000,
//!  "should-send-emails": true,
//!  "from-email": "aou-refresh@example.org",
//!  "to-email": "aou-ops@example.org, dba@example.org"}
//! ```
//!
//! `sp_start_job` returns once the job has started, so an agent job needs a
//! status command printing `<current_execution_status> <last_run_outcome>`
//! (see [`aou_load::job`]). Without one the job command itself must block
//! until the job is done.
//!
//! Keys this tool does not use are ignored.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use aou_load::{JobRunner, TableName};
use aou_transform::PolicyVersion;

use crate::notify::{DEFAULT_SMTP_PORT, DEFAULT_SMTP_SERVER, EmailSettings};

const DEFAULT_OUTPUT_DIR: &str = "output";
const DEFAULT_JOB_TIMEOUT_SECS: u64 = 60;
const DEFAULT_JOB_POLL_SECS: u64 = 10;

/// Outputs written by a refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadFormat {
    Csv,
    Sql,
    #[default]
    Both,
}

impl LoadFormat {
    pub fn writes_csv(self) -> bool {
        matches!(self, Self::Csv | Self::Both)
    }

    pub fn writes_sql(self) -> bool {
        matches!(self, Self::Sql | Self::Both)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SiteConfig {
    pub db_table_name: String,
    /// Extra participant-summary filters, typically the paired organization.
    #[serde(default)]
    pub paired_organization_params: Option<BTreeMap<String, String>>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub load_format: LoadFormat,
    #[serde(default)]
    pub retention_policy: PolicyVersion,
    #[serde(default)]
    pub should_run_agent_job: bool,
    #[serde(default)]
    pub agent_job_name: Option<String>,
    /// Program and arguments of the post-load job.
    #[serde(default)]
    pub agent_job_command: Vec<String>,
    /// Program and arguments reporting the job's status after it is started.
    #[serde(default)]
    pub agent_job_status_command: Vec<String>,
    /// Seconds.
    #[serde(default = "default_job_timeout")]
    pub agent_job_timeout: u64,
    /// Seconds.
    #[serde(default = "default_job_poll_interval")]
    pub agent_job_poll_interval: u64,
    #[serde(default)]
    pub should_send_emails: bool,
    #[serde(default)]
    pub from_email: Option<String>,
    /// One address, or several separated by commas.
    #[serde(default)]
    pub to_email: Option<String>,
    #[serde(default = "default_email_server")]
    pub email_server: String,
    #[serde(default = "default_email_port")]
    pub email_port: u16,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_job_timeout() -> u64 {
    DEFAULT_JOB_TIMEOUT_SECS
}

fn default_job_poll_interval() -> u64 {
    DEFAULT_JOB_POLL_SECS
}

fn default_email_server() -> String {
    DEFAULT_SMTP_SERVER.to_string()
}

fn default_email_port() -> u16 {
    DEFAULT_SMTP_PORT
}

impl SiteConfig {
    /// Reads and validates a site config.
    ///
    /// A relative `output-dir` is resolved against the config file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read site config: {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parse site config: {}", path.display()))?;

        if config.output_dir.is_relative()
            && let Some(parent) = path.parent()
        {
            config.output_dir = parent.join(&config.output_dir);
        }
        config
            .validate()
            .with_context(|| format!("invalid site config: {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.table_name()?;
        if self.should_run_agent_job && self.agent_job_command.is_empty() {
            bail!("should-run-agent-job is set but agent-job-command is empty");
        }
        self.email()?;
        Ok(())
    }

    /// Notification settings, when `should-send-emails` is set.
    pub fn email(&self) -> Result<Option<EmailSettings>> {
        if !self.should_send_emails {
            return Ok(None);
        }
        let (Some(from), Some(to)) = (&self.from_email, &self.to_email) else {
            bail!("should-send-emails is set but from-email or to-email is missing");
        };
        EmailSettings::new(&self.email_server, self.email_port, from, to).map(Some)
    }

    pub fn table_name(&self) -> Result<TableName> {
        TableName::parse(&self.db_table_name).context("db-table-name")
    }

    pub fn filters(&self) -> BTreeMap<String, String> {
        self.paired_organization_params.clone().unwrap_or_default()
    }

    /// The configured post-load job, when enabled.
    pub fn job_runner(&self) -> Option<JobRunner> {
        if !self.should_run_agent_job {
            return None;
        }
        let name = self
            .agent_job_name
            .clone()
            .unwrap_or_else(|| self.db_table_name.clone());
        let runner = JobRunner::new(name, self.agent_job_command.clone())
            .timeout(Duration::from_secs(self.agent_job_timeout))
            .poll_interval(Duration::from_secs(self.agent_job_poll_interval));
        if self.agent_job_status_command.is_empty() {
            Some(runner)
        } else {
            Some(runner.status_command(self.agent_job_status_command.clone()))
        }
    }
}
