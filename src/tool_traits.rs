//! Type-safe external tool argument contracts.
//!
//! This module provides the `ToolArgs` trait for ensuring compile-time
//! correctness of external tool invocations. Instead of raw string vectors,
//! one struct per tool operation (restic backup, ffmpeg transcode, ...)
//! implements this trait to produce the exact CLI arguments and environment
//! variables the tool expects.
//!
//! # Design Goals
//!
//! 1. **Compile-Time Safety**: a restic subcommand or ffmpeg codec flag is
//!    spelled in exactly one place.
//! 2. **Single Source of Truth**: the struct definition IS the contract.
//! 3. **Environment Contracts**: secrets travel via the child's environment,
//!    never via arguments.

use crate::command_runner::{OutputMode, ToolInvocation};
use crate::secret::Secret;

/// Trait for typed external tool arguments.
///
/// # Contract
///
/// - `program()`: binary name or path to execute.
/// - `to_cli_args()`: arguments exactly as the tool's parser expects them.
/// - `get_env_vars()`: environment variables set on the child only.
///
/// # Invariants
///
/// - Secret values MUST only appear in `get_env_vars()`.
/// - Environment variables are scoped to the spawned child; the parent's own
///   environment is never modified.
pub trait ToolArgs {
    /// Binary to execute (e.g. `restic`, `/usr/bin/ffmpeg`).
    fn program(&self) -> &str;

    /// Convert struct fields to CLI arguments.
    fn to_cli_args(&self) -> Vec<String>;

    /// Environment variables for the child process.
    fn get_env_vars(&self) -> Vec<(String, Secret)> {
        Vec::new()
    }

    /// Whether the tool's output is streamed to the terminal or captured.
    fn output_mode(&self) -> OutputMode {
        OutputMode::Capture
    }

    /// Build the invocation handed to a `CommandRunner`.
    fn invocation(&self) -> ToolInvocation {
        ToolInvocation {
            program: self.program().to_string(),
            args: self.to_cli_args(),
            env: self.get_env_vars(),
            output: self.output_mode(),
        }
    }
}
