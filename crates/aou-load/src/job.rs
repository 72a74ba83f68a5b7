//! Post-load job execution.
//!
//! A job is started by an external command after a successful load. When a
//! status command is configured the start command only has to launch the job
//! (as `sp_start_job` does); the runner then polls the status command until
//! the job is idle and checks its last run outcome. Without a status command
//! the start command must block until the job is done, and its exit status is
//! the outcome.
//!
//! The status command prints `<execution status> <last run outcome>` on its
//! last non-empty line, using SQL Server Agent's codes: execution status `4`
//! is idle and outcome `1` is success.

use std::fmt;
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::JobError;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// `current_execution_status` of an agent job that is not running.
pub const IDLE_EXECUTION_STATUS: i64 = 4;

/// `last_run_outcome` of an agent job that succeeded.
pub const SUCCEEDED_OUTCOME: i64 = 1;

/// How often a start or status command is checked for exit.
const COMMAND_CHECK_INTERVAL: Duration = Duration::from_millis(100);

/// Which of the job's commands an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStep {
    Start,
    Status,
}

impl fmt::Display for JobStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::Status => "status",
        })
    }
}

/// One reading of the status command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobStatus {
    pub execution_status: i64,
    pub last_run_outcome: i64,
}

impl JobStatus {
    /// Reads the two codes from the last non-empty line of `output`.
    pub fn parse(output: &str) -> Option<Self> {
        let line = output.lines().rev().map(str::trim).find(|line| !line.is_empty())?;
        let mut fields = line.split_whitespace().map(str::parse::<i64>);
        let execution_status = fields.next()?.ok()?;
        let last_run_outcome = fields.next()?.ok()?;
        Some(Self {
            execution_status,
            last_run_outcome,
        })
    }

    pub fn is_idle(&self) -> bool {
        self.execution_status == IDLE_EXECUTION_STATUS
    }

    pub fn succeeded(&self) -> bool {
        self.last_run_outcome == SUCCEEDED_OUTCOME
    }
}

/// A completed job run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub name: String,
    pub elapsed: Duration,
    pub polls: u32,
}

#[derive(Debug, Clone)]
pub struct JobRunner {
    name: String,
    command: Vec<String>,
    status_command: Option<Vec<String>>,
    timeout: Duration,
    poll_interval: Duration,
}

struct Finished {
    stdout: String,
    polls: u32,
}

impl JobRunner {
    /// `command` is the program followed by its arguments.
    pub fn new(name: impl Into<String>, command: Vec<String>) -> Self {
        Self {
            name: name.into(),
            command,
            status_command: None,
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Polls `command` for the job's state after the start command returns.
    #[must_use]
    pub fn status_command(mut self, command: Vec<String>) -> Self {
        self.status_command = Some(command);
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Starts the job and blocks until it has finished and succeeded.
    ///
    /// A job still running at the timeout is reported as
    /// [`JobError::Timeout`]. A blocking start command is killed at that
    /// point; a job launched through the status protocol keeps running.
    pub fn run(&self) -> Result<JobOutcome, JobError> {
        let started = Instant::now();
        info!(job = %self.name, "starting job");

        let Some(status_command) = &self.status_command else {
            let finished = self.run_command(JobStep::Start, &self.command, self.poll_interval)?;
            return Ok(self.finished(started, finished.polls));
        };

        let check = self.poll_interval.min(COMMAND_CHECK_INTERVAL);
        self.run_command(JobStep::Start, &self.command, check)?;

        let mut polls = 0;
        loop {
            let remaining = self.timeout.saturating_sub(started.elapsed());
            thread::sleep(self.poll_interval.min(remaining));
            polls += 1;

            let output = self.run_command(JobStep::Status, status_command, check)?.stdout;
            let status = JobStatus::parse(&output).ok_or_else(|| JobError::InvalidStatus {
                name: self.name.clone(),
                output: output.trim().to_string(),
            })?;
            debug!(
                job = %self.name,
                execution_status = status.execution_status,
                last_run_outcome = status.last_run_outcome,
                "job status"
            );

            if status.is_idle() {
                if !status.succeeded() {
                    return Err(JobError::Unsuccessful {
                        name: self.name.clone(),
                        outcome: status.last_run_outcome,
                    });
                }
                return Ok(self.finished(started, polls));
            }
            if started.elapsed() >= self.timeout {
                return Err(self.timed_out());
            }
            info!(
                job = %self.name,
                elapsed_secs = started.elapsed().as_secs(),
                "waiting for job to finish"
            );
        }
    }

    fn finished(&self, started: Instant, polls: u32) -> JobOutcome {
        let elapsed = started.elapsed();
        info!(job = %self.name, elapsed_ms = elapsed.as_millis(), "job finished");
        JobOutcome {
            name: self.name.clone(),
            elapsed,
            polls,
        }
    }

    fn timed_out(&self) -> JobError {
        JobError::Timeout {
            name: self.name.clone(),
            timeout_secs: self.timeout.as_secs(),
        }
    }

    /// Runs one command to a successful exit within the timeout, checking it
    /// every `check`. Only the status command's stdout is captured.
    fn run_command(
        &self,
        step: JobStep,
        command: &[String],
        check: Duration,
    ) -> Result<Finished, JobError> {
        let (program, args) = command.split_first().ok_or_else(|| JobError::EmptyCommand {
            name: self.name.clone(),
            step,
        })?;

        debug!(job = %self.name, %step, program = %program, "running job command");
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(match step {
                JobStep::Start => Stdio::inherit(),
                JobStep::Status => Stdio::piped(),
            })
            .spawn()
            .map_err(|source| JobError::Spawn {
                name: self.name.clone(),
                step,
                source,
            })?;

        let started = Instant::now();
        let mut polls = 0;
        loop {
            polls += 1;
            let wait_error = |source| JobError::Wait {
                name: self.name.clone(),
                step,
                source,
            };
            if let Some(status) = child.try_wait().map_err(wait_error)? {
                if !status.success() {
                    return Err(JobError::Failed {
                        name: self.name.clone(),
                        step,
                        status: status.to_string(),
                    });
                }
                let mut stdout = String::new();
                if let Some(mut pipe) = child.stdout.take() {
                    pipe.read_to_string(&mut stdout).map_err(wait_error)?;
                }
                return Ok(Finished { stdout, polls });
            }

            let elapsed = started.elapsed();
            if elapsed >= self.timeout {
                self.stop(&mut child);
                return Err(self.timed_out());
            }
            if step == JobStep::Start && self.status_command.is_none() {
                info!(job = %self.name, elapsed_secs = elapsed.as_secs(), "waiting for job to finish");
            }
            thread::sleep(check.min(self.timeout - elapsed));
        }
    }

    fn stop(&self, child: &mut Child) {
        if let Err(err) = child.kill() {
            warn!(job = %self.name, error = %err, "failed to stop timed-out job");
        }
        if let Err(err) = child.wait() {
            warn!(job = %self.name, error = %err, "failed to reap timed-out job");
        }
    }
}
