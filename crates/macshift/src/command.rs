//! External command execution.
//!
//! Every call to the interface control tools goes through a [`Runner`], which
//! returns an explicit [`CommandOutput`] (exit status plus captured output)
//! instead of firing and forgetting. The production runner,
//! [`CommandRunner`], bounds each invocation with a timeout and kills the
//! child if it expires.

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::{Error, Result};

/// Default per-command timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Captured result of one external command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Program that was run.
    pub program: String,
    /// Arguments passed to it.
    pub args: Vec<String>,
    /// Exit code, `None` if the process was killed by a signal.
    pub status: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Create a successful output with the given stdout.
    pub fn ok(program: &str, args: &[&str], stdout: impl Into<String>) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failed output with the given exit code and stderr.
    pub fn failed(program: &str, args: &[&str], status: i32, stderr: impl Into<String>) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            status: Some(status),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Check if the command exited with status 0.
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Check if the command was refused for lack of privileges.
    pub fn is_permission_denied(&self) -> bool {
        let stderr = self.stderr.to_ascii_lowercase();
        !self.success()
            && (stderr.contains("operation not permitted") || stderr.contains("permission denied"))
    }

    /// The command line as a single string, for logs and messages.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Short description of a failure: the first stderr line, or the exit code.
    pub fn failure_summary(&self) -> String {
        match self.stderr.lines().map(str::trim).find(|l| !l.is_empty()) {
            Some(line) => line.to_string(),
            None => match self.status {
                Some(code) => format!("exit status {}", code),
                None => "terminated by signal".to_string(),
            },
        }
    }
}

/// Something that can run an external program.
pub trait Runner {
    /// Run `program` with `args` and capture its output.
    ///
    /// Fails with [`Error::CommandLaunch`] if the program cannot be started
    /// and [`Error::CommandTimeout`] if it does not finish in time. A non-zero
    /// exit is not an error at this level.
    fn run(&self, program: &str, args: &[&str]) -> impl Future<Output = Result<CommandOutput>>;
}

/// Runs commands as child processes with a bounded timeout.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    timeout: Duration,
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl CommandRunner {
    /// Create a runner with the given per-command timeout.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Runner for CommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let command = command_line(program, args);
        tracing::debug!(%command, "running");

        let mut cmd = Command::new(program);
        cmd.args(args)
            // Parsers expect untranslated output
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => return Err(Error::CommandLaunch { command, source }),
            Err(_) => {
                return Err(Error::CommandTimeout {
                    command,
                    timeout: self.timeout,
                });
            }
        };

        let result = CommandOutput {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!(%command, status = ?result.status, "finished");

        Ok(result)
    }
}

fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
