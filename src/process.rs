//! External command execution
//!
//! Spawns short-lived tools, drains both output streams fully and hands back
//! the exit code with the decoded text. Start failures are reported in-band as
//! an exit code of `-1` so callers treat them like any other tool failure.

use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Exit code reported when the tool could not be started or was killed by a signal.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn spawn_failure(message: impl Into<String>) -> Self {
        Self {
            exit_code: SPAWN_FAILURE_EXIT_CODE,
            stdout: String::new(),
            stderr: message.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

impl From<std::process::Output> for ProcessOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            exit_code: output.status.code().unwrap_or(SPAWN_FAILURE_EXIT_CODE),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// The caller cancelled the query before the tool exited.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("query cancelled before the external tool exited")]
pub struct Cancelled;

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args`, each passed as one argument with no shell
    /// interpretation. Returns `Err(Cancelled)` only when `cancel` fires first.
    async fn run(
        &self,
        program: &str,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<ProcessOutput, Cancelled>;
}

#[derive(Debug, Default, Clone)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<ProcessOutput, Cancelled> {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }

        // Dropping the child on cancellation kills it.
        let child = match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(err) => {
                warn!(program = %program, error = %err, "failed to start external tool");
                return Ok(ProcessOutput::spawn_failure(format!(
                    "failed to start {program}: {err}"
                )));
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(program = %program, "external tool cancelled, killing child");
                Err(Cancelled)
            }
            output = child.wait_with_output() => match output {
                Ok(output) => Ok(ProcessOutput::from(output)),
                Err(err) => {
                    warn!(program = %program, error = %err, "failed to collect external tool output");
                    Ok(ProcessOutput::spawn_failure(format!(
                        "failed to collect output of {program}: {err}"
                    )))
                }
            },
        }
    }
}
