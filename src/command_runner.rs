//! External Command Execution
//!
//! Every call to restic or ffmpeg goes through the `CommandRunner` capability:
//! one method that runs an external operation with arguments and environment
//! and reports its exit status plus captured output. Pipeline logic depends
//! on the trait only, so tests swap in a recording fake instead of real
//! binaries.
//!
//! `SystemRunner` is the production implementation on `std::process`.
//! Children stay in our process group, so a Ctrl-C from the terminal reaches
//! the running tool and its own signal handling decides the cleanup.

use std::fmt;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::secret::Secret;
use crate::tool_traits::ToolArgs;

/// How a child's stdout/stderr are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Collect stdout/stderr into `CommandOutput`.
    Capture,
    /// Inherit the terminal so verbose tool output is visible live.
    Stream,
}

/// One fully resolved external command.
#[derive(Clone)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
    /// Child-only environment; values are redacted in `Debug`.
    pub env: Vec<(String, Secret)>,
    pub output: OutputMode,
}

impl ToolInvocation {
    /// Program and arguments joined for log lines.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Names of the environment variables set on the child.
    pub fn env_keys(&self) -> Vec<&str> {
        self.env.iter().map(|(key, _)| key.as_str()).collect()
    }

    /// Value of a child environment variable, if set.
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.expose())
    }
}

impl fmt::Debug for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolInvocation")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("env", &self.env_keys())
            .field("output", &self.output)
            .finish()
    }
}

/// Output from an external command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Standard output (empty when streamed).
    pub stdout: String,
    /// Standard error (empty when streamed).
    pub stderr: String,
    /// Exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
    /// Whether the command exited successfully (exit code 0).
    pub success: bool,
}

impl CommandOutput {
    /// Successful output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
            success: true,
        }
    }

    /// Failed output with the given exit code and stderr.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code: Some(exit_code),
            success: false,
        }
    }

    /// Short description of a failure for user-facing messages.
    pub fn failure_detail(&self) -> String {
        let status = match self.exit_code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        };
        match self.stderr.trim().lines().last() {
            Some(line) if !line.is_empty() => format!("{}: {}", status, line),
            _ => status,
        }
    }

    /// Check if the command succeeded and return an error if not.
    pub fn ensure_success(&self, context: &str) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            anyhow::bail!("{} failed ({})", context, self.failure_detail())
        }
    }
}

/// Capability to run an external command.
pub trait CommandRunner {
    /// Run the invocation to completion, blocking the caller.
    ///
    /// A non-zero exit is reported through `CommandOutput::success`; `Err`
    /// is reserved for commands that could not be started at all.
    fn run(&self, invocation: &ToolInvocation) -> Result<CommandOutput>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, invocation: &ToolInvocation) -> Result<CommandOutput> {
        (**self).run(invocation)
    }
}

/// Run a typed tool invocation through `runner`.
pub fn run_tool<R: CommandRunner + ?Sized, T: ToolArgs>(runner: &R, args: &T) -> Result<CommandOutput> {
    runner.run(&args.invocation())
}

/// Runs commands with `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<CommandOutput> {
        // Log exact command and environment NAMES only, never values
        info!(
            "run: {} env={:?} output={:?}",
            invocation.command_line(),
            invocation.env_keys(),
            invocation.output
        );

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        for (key, value) in &invocation.env {
            cmd.env(key, value.expose());
        }

        let output = match invocation.output {
            OutputMode::Stream => {
                let status = cmd
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .with_context(|| format!("Failed to spawn {}", invocation.program))?;
                CommandOutput {
                    stdout: String::new(),
                    stderr: String::new(),
                    exit_code: status.code(),
                    success: status.success(),
                }
            }
            OutputMode::Capture => {
                let output = cmd
                    .stdin(Stdio::null())
                    .output()
                    .with_context(|| format!("Failed to spawn {}", invocation.program))?;
                CommandOutput {
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                    exit_code: output.status.code(),
                    success: output.status.success(),
                }
            }
        };

        if output.success {
            debug!("{} exited successfully", invocation.program);
        } else {
            warn!("{} failed: {}", invocation.program, output.failure_detail());
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(program: &str, args: &[&str]) -> ToolInvocation {
        ToolInvocation {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            env: vec![("SOME_PASSWORD".to_string(), Secret::new("s3cr3t"))],
            output: OutputMode::Capture,
        }
    }

    #[test]
    fn test_debug_hides_env_values() {
        let inv = invocation("restic", &["check"]);
        let printed = format!("{:?}", inv);
        assert!(printed.contains("SOME_PASSWORD"));
        assert!(!printed.contains("s3cr3t"));
    }

    #[test]
    fn test_command_line_joins_program_and_args() {
        let inv = invocation("restic", &["backup", "--verbose", "/srv"]);
        assert_eq!(inv.command_line(), "restic backup --verbose /srv");
    }

    #[test]
    fn test_failure_detail_uses_last_stderr_line() {
        let output = CommandOutput::failed(1, "warming up\nFatal: unable to open config file\n");
        assert_eq!(
            output.failure_detail(),
            "exit code 1: Fatal: unable to open config file"
        );
    }

    #[test]
    fn test_failure_detail_signal() {
        let output = CommandOutput {
            exit_code: None,
            ..CommandOutput::default()
        };
        assert_eq!(output.failure_detail(), "terminated by signal");
    }

    #[test]
    fn test_ensure_success() {
        assert!(CommandOutput::ok("").ensure_success("check").is_ok());
        let err = CommandOutput::failed(3, "")
            .ensure_success("check")
            .unwrap_err();
        assert_eq!(err.to_string(), "check failed (exit code 3)");
    }

    #[test]
    fn test_system_runner_captures_exit_status() {
        let runner = SystemRunner;
        let ok = runner.run(&invocation("true", &[])).unwrap();
        assert!(ok.success);

        let failed = runner.run(&invocation("false", &[])).unwrap();
        assert!(!failed.success);
        assert_eq!(failed.exit_code, Some(1));
    }

    #[test]
    fn test_system_runner_passes_env_to_child_only() {
        let runner = SystemRunner;
        let output = runner
            .run(&invocation("sh", &["-c", "printf %s \"$SOME_PASSWORD\""]))
            .unwrap();
        assert_eq!(output.stdout, "s3cr3t");
        assert!(std::env::var("SOME_PASSWORD").is_err());
    }

    #[test]
    fn test_system_runner_missing_binary_is_err() {
        let runner = SystemRunner;
        let result = runner.run(&invocation("this_binary_definitely_does_not_exist_12345", &[]));
        assert!(result.is_err());
    }
}
