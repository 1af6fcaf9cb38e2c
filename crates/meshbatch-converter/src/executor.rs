//! External tool execution for conversions.
//!
//! Runs a conversion tool as a child process bounded by a [`Deadline`],
//! capturing its output. The child is spawned with `kill_on_drop`, so a
//! deadline expiry kills it rather than leaving it running.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

use crate::deadline::Deadline;

/// Maximum stderr characters kept in errors.
const STDERR_LIMIT: usize = 2000;

/// Errors from process execution.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The command was not found.
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    /// The process did not exit before the deadline.
    #[error("Process timed out after {0:?}")]
    Timeout(Duration),

    /// The process exited with a non-zero code.
    #[error("Process failed with exit code {code}: {stderr}")]
    ProcessFailed {
        /// The exit code.
        code: i32,
        /// Standard error output, truncated.
        stderr: String,
    },

    /// The process was terminated by a signal.
    #[error("Process was killed by a signal")]
    Killed,

    /// IO error while spawning or waiting.
    #[error("IO error during execution: {0}")]
    IoError(#[from] std::io::Error),
}

/// Parameters for one tool invocation.
#[derive(Debug, Clone)]
pub struct ExecutionParams {
    /// The command to execute.
    pub command: String,
    /// Arguments after placeholder substitution.
    pub args: Vec<String>,
    /// Working directory.
    pub working_dir: Option<PathBuf>,
}

/// Captured output of a successful invocation.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Standard output from the process.
    pub stdout: String,
    /// Standard error from the process.
    pub stderr: String,
    /// Wall-clock duration.
    pub duration: Duration,
}

/// Runs tools under a deadline.
#[derive(Debug, Clone, Default)]
pub struct ToolExecutor;

impl ToolExecutor {
    /// Create a new executor.
    pub fn new() -> Self {
        Self
    }

    /// Execute `params`, failing with [`ExecutorError::Timeout`] if the
    /// process outlives `deadline`.
    pub async fn execute(
        &self,
        params: &ExecutionParams,
        deadline: &Deadline,
    ) -> Result<ExecutionResult, ExecutorError> {
        let start = std::time::Instant::now();

        tracing::debug!(
            command = %params.command,
            args = ?params.args,
            remaining_ms = deadline.remaining().as_millis() as u64,
            "Spawning conversion tool"
        );

        let mut cmd = Command::new(&params.command);
        cmd.args(&params.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref dir) = params.working_dir {
            cmd.current_dir(dir);
        }

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExecutorError::CommandNotFound(params.command.clone())
            } else {
                ExecutorError::IoError(e)
            }
        })?;

        let output = match deadline.run(child.wait_with_output()).await {
            Ok(result) => result?,
            Err(exceeded) => {
                tracing::warn!(
                    command = %params.command,
                    budget_s = exceeded.budget.as_secs(),
                    "Conversion tool exceeded deadline, killed"
                );
                return Err(ExecutorError::Timeout(exceeded.budget));
            }
        };

        let duration = start.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        match output.status.code() {
            Some(0) => {
                tracing::debug!(
                    command = %params.command,
                    duration_ms = duration.as_millis() as u64,
                    "Conversion tool finished"
                );
                Ok(ExecutionResult {
                    stdout,
                    stderr,
                    duration,
                })
            }
            Some(code) => {
                tracing::error!(
                    command = %params.command,
                    exit_code = code,
                    stderr = %stderr.chars().take(500).collect::<String>(),
                    "Conversion tool failed"
                );
                Err(ExecutorError::ProcessFailed {
                    code,
                    stderr: stderr.chars().take(STDERR_LIMIT).collect(),
                })
            }
            None => Err(ExecutorError::Killed),
        }
    }

    /// Check whether a command resolves on this system.
    pub async fn check_command_available(&self, command: &str) -> bool {
        let locator = if cfg!(target_os = "windows") {
            "where"
        } else {
            "which"
        };

        Command::new(locator)
            .arg(command)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> ExecutionParams {
        ExecutionParams {
            command: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            working_dir: None,
        }
    }

    #[tokio::test]
    async fn test_successful_command_captures_stdout() {
        let result = ToolExecutor::new()
            .execute(&sh("echo converted"), &Deadline::after_secs(10))
            .await
            .expect("success");
        assert_eq!(result.stdout.trim(), "converted");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_process_failed() {
        let err = ToolExecutor::new()
            .execute(&sh("echo 'bad header' >&2; exit 3"), &Deadline::after_secs(10))
            .await
            .expect_err("failure");
        match err {
            ExecutorError::ProcessFailed { code, stderr } => {
                assert_eq!(code, 3);
                assert!(stderr.contains("bad header"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_slow_command_times_out() {
        let started = std::time::Instant::now();
        let err = ToolExecutor::new()
            .execute(&sh("sleep 5"), &Deadline::after(Duration::from_millis(200)))
            .await
            .expect_err("timeout");
        assert!(matches!(err, ExecutorError::Timeout(_)));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_missing_command() {
        let params = ExecutionParams {
            command: "definitely-not-a-real-tool-8d1f".to_string(),
            args: Vec::new(),
            working_dir: None,
        };
        let err = ToolExecutor::new()
            .execute(&params, &Deadline::after_secs(10))
            .await
            .expect_err("missing");
        assert!(matches!(err, ExecutorError::CommandNotFound(_)));
    }

    #[tokio::test]
    async fn test_check_command_available() {
        let executor = ToolExecutor::new();
        assert!(executor.check_command_available("sh").await);
        assert!(
            !executor
                .check_command_available("definitely-not-a-real-tool-8d1f")
                .await
        );
    }
}
