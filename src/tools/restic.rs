//! Type-safe arguments for restic operations.
//!
//! This module provides the typed argument struct for the four restic calls
//! the backup pipeline makes:
//! - `cat config` to confirm the repository exists and is initialized
//! - `backup --verbose <dir>`
//! - `forget --keep-last N --prune --verbose`
//! - `check`
//!
//! # Security Model
//!
//! The repository password is NEVER passed via CLI arguments. It travels in
//! `RESTIC_PASSWORD` on the child's environment, next to
//! `RESTIC_REPOSITORY`.

use std::path::PathBuf;

use crate::command_runner::OutputMode;
use crate::secret::Secret;
use crate::tool_traits::ToolArgs;

/// Environment variable restic reads the repository location from.
pub const REPOSITORY_ENV: &str = "RESTIC_REPOSITORY";

/// Environment variable restic reads the repository password from.
pub const PASSWORD_ENV: &str = "RESTIC_PASSWORD";

/// Number of snapshots kept by retention pruning.
pub const KEEP_LAST: u32 = 30;

/// A restic subcommand with its operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResticCommand {
    /// `restic cat config`
    CatConfig,
    /// `restic backup --verbose <source>`
    Backup { source: PathBuf },
    /// `restic forget --keep-last <n> --prune --verbose`
    ForgetPrune { keep_last: u32 },
    /// `restic check`
    Check,
}

impl ResticCommand {
    /// Subcommand and flags exactly as restic parses them.
    pub fn to_args(&self) -> Vec<String> {
        match self {
            ResticCommand::CatConfig => vec!["cat".to_string(), "config".to_string()],
            ResticCommand::Backup { source } => vec![
                "backup".to_string(),
                "--verbose".to_string(),
                source.display().to_string(),
            ],
            ResticCommand::ForgetPrune { keep_last } => vec![
                "forget".to_string(),
                "--keep-last".to_string(),
                keep_last.to_string(),
                "--prune".to_string(),
                "--verbose".to_string(),
            ],
            ResticCommand::Check => vec!["check".to_string()],
        }
    }
}

/// Type-safe arguments for one restic invocation.
///
/// # Field to Flag/Env Mapping
///
/// | Rust Field   | Mapping                    |
/// |--------------|----------------------------|
/// | `binary`     | program                    |
/// | `command`    | subcommand + flags         |
/// | `repository` | env: `RESTIC_REPOSITORY`   |
/// | `password`   | env: `RESTIC_PASSWORD`     |
#[derive(Debug, Clone)]
pub struct ResticArgs {
    pub binary: String,
    pub repository: String,
    pub password: Secret,
    pub command: ResticCommand,
}

impl ToolArgs for ResticArgs {
    fn program(&self) -> &str {
        &self.binary
    }

    fn to_cli_args(&self) -> Vec<String> {
        self.command.to_args()
    }

    fn get_env_vars(&self) -> Vec<(String, Secret)> {
        vec![
            (REPOSITORY_ENV.to_string(), Secret::new(self.repository.clone())),
            (PASSWORD_ENV.to_string(), self.password.clone()),
        ]
    }

    fn output_mode(&self) -> OutputMode {
        match self.command {
            // The config blob is noise; only its exit status matters
            ResticCommand::CatConfig => OutputMode::Capture,
            _ => OutputMode::Stream,
        }
    }
}
