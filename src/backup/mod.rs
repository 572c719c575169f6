//! restic backup: validate, unlock, then check → backup → prune → verify.
//!
//! The run is strictly linear. Every failure is fatal, reported with a
//! stage-specific message, and maps to exit code 1.

pub mod pipeline;
pub mod prompt;
pub mod state;
pub mod validate;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

pub use pipeline::{BackupContext, BackupPipeline, PipelineStep};
pub use prompt::{SecretPrompt, TerminalPrompt};
pub use state::{BackupStage, PipelineState, TransitionError};
pub use validate::BackupRequest;

use crate::command_runner::CommandRunner;

/// Prompt shown when asking for the repository password.
pub const PASSWORD_PROMPT: &str = "Enter repository password: ";

/// Errors of a backup run.
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Directory {} does not exist", .0.display())]
    SourceMissing(PathBuf),

    #[error("{} is not a directory", .0.display())]
    SourceNotDirectory(PathBuf),

    #[error("Repository identifier must not be empty")]
    EmptyRepository,

    #[error("Root privileges required to back up the whole directory (run with sudo)")]
    NotPrivileged,

    #[error("Failed to read repository password: {0}")]
    Prompt(String),

    /// A restic step exited non-zero or could not be started
    #[error("{message}: {detail}")]
    StageFailed {
        step: PipelineStep,
        message: &'static str,
        detail: String,
    },

    #[error("Pipeline state error: {0}")]
    Transition(#[from] TransitionError),
}

impl BackupError {
    /// The restic step that failed, if the error came from one.
    pub fn failed_step(&self) -> Option<PipelineStep> {
        match self {
            BackupError::StageFailed { step, .. } => Some(*step),
            _ => None,
        }
    }
}

/// Validate, prompt for the password, and run the pipeline.
///
/// Nothing external happens before validation passes; the prompt is only
/// shown to a privileged process with a valid source directory.
pub fn run_backup<P, R>(
    source: &Path,
    repository: &str,
    privileged: bool,
    prompt: &P,
    runner: R,
    restic: &str,
) -> Result<PipelineState, BackupError>
where
    P: SecretPrompt + ?Sized,
    R: CommandRunner,
{
    let mut state = PipelineState::new();

    let request = BackupRequest::validate(source, repository, privileged)?;
    state.transition_to(BackupStage::Validated)?;
    println!(
        "🔒 Backing up {} to repository {}",
        request.source().display(),
        request.repository()
    );

    let password = match prompt.prompt(PASSWORD_PROMPT) {
        Ok(password) => password,
        Err(e) => {
            let _ = state.fail();
            return Err(BackupError::Prompt(format!("{:#}", e)));
        }
    };
    state.transition_to(BackupStage::Unlocked)?;

    let ctx = BackupContext::new(request, password);
    let mut pipeline = BackupPipeline::new(runner, restic, state);
    pipeline.run(&ctx)?;

    info!("all backup stages succeeded");
    println!("✓ Backup completed successfully");
    Ok(pipeline.state().clone())
}
