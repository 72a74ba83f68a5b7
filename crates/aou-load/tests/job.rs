//! Job runner tests. These start real processes and need a Unix shell.
#![cfg(unix)]

use std::path::Path;
use std::time::{Duration, Instant};

use aou_load::{JobError, JobRunner, JobStep};
use tempfile::TempDir;

fn sh(script: &str) -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string(), script.to_string()]
}

#[test]
fn successful_job_completes() {
    let outcome = JobRunner::new("refresh", sh("exit 0"))
        .poll_interval(Duration::from_millis(20))
        .timeout(Duration::from_secs(10))
        .run()
        .unwrap();
    assert_eq!(outcome.name, "refresh");
    assert!(outcome.polls >= 1);
}

#[test]
fn failing_job_is_reported() {
    let err = JobRunner::new("refresh", sh("exit 3"))
        .poll_interval(Duration::from_millis(20))
        .timeout(Duration::from_secs(10))
        .run()
        .unwrap_err();
    assert!(matches!(
        err,
        JobError::Failed { ref name, step: JobStep::Start, .. } if name == "refresh"
    ));
}

#[test]
fn slow_job_times_out() {
    let err = JobRunner::new("slow", sh("sleep 5"))
        .poll_interval(Duration::from_millis(50))
        .timeout(Duration::from_millis(200))
        .run()
        .unwrap_err();
    assert!(matches!(err, JobError::Timeout { .. }));
}

#[test]
fn empty_command_is_rejected() {
    let err = JobRunner::new("nothing", Vec::new()).run().unwrap_err();
    assert!(matches!(err, JobError::EmptyCommand { .. }));
}

#[test]
fn missing_program_fails_to_spawn() {
    let err = JobRunner::new("ghost", vec!["/nonexistent/aou-job".to_string()])
        .run()
        .unwrap_err();
    assert!(matches!(err, JobError::Spawn { .. }));
}

/// Start command that launches a background job and returns at once, the way
/// `sp_start_job` does. The job reports running, then `final_status` after
/// `delay`.
fn agent_start(state: &Path, delay: &str, final_status: &str) -> Vec<String> {
    let state = state.display();
    sh(&format!(
        "echo '1 0' > {state}; (sleep {delay}; echo '{final_status}' > {state}) &"
    ))
}

fn agent_status(state: &Path) -> Vec<String> {
    sh(&format!("cat {}", state.display()))
}

fn agent_runner(dir: &TempDir, delay: &str, final_status: &str) -> JobRunner {
    let state = dir.path().join("job.status");
    JobRunner::new("HealthPro refresh", agent_start(&state, delay, final_status))
        .status_command(agent_status(&state))
        .poll_interval(Duration::from_millis(50))
        .timeout(Duration::from_secs(10))
}

#[test]
fn waits_for_launched_job_to_succeed() {
    let dir = TempDir::new().unwrap();
    let started = Instant::now();
    let outcome = agent_runner(&dir, "0.4", "4 1").run().unwrap();
    assert!(started.elapsed() >= Duration::from_millis(400));
    assert!(outcome.polls > 1);
}

#[test]
fn launched_job_failure_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = agent_runner(&dir, "0.3", "4 0").run().unwrap_err();
    assert!(matches!(err, JobError::Unsuccessful { outcome: 0, .. }), "{err}");
}

#[test]
fn launched_job_still_running_times_out() {
    let dir = TempDir::new().unwrap();
    let err = agent_runner(&dir, "30", "4 1")
        .timeout(Duration::from_millis(300))
        .run()
        .unwrap_err();
    assert!(matches!(err, JobError::Timeout { .. }));
}

#[test]
fn garbled_status_is_an_error() {
    let err = JobRunner::new("refresh", sh("true"))
        .status_command(sh("echo 'job is fine'"))
        .poll_interval(Duration::from_millis(20))
        .run()
        .unwrap_err();
    assert!(matches!(err, JobError::InvalidStatus { ref output, .. } if output == "job is fine"));
}

#[test]
fn failing_status_command_is_reported() {
    let err = JobRunner::new("refresh", sh("true"))
        .status_command(sh("exit 2"))
        .poll_interval(Duration::from_millis(20))
        .run()
        .unwrap_err();
    assert!(matches!(err, JobError::Failed { step: JobStep::Status, .. }));
}
