//! Fixed-order restic pipeline.
//!
//! Four blocking restic calls, each gating the next: repository check,
//! backup, retention pruning, integrity check. The first failure ends the
//! run; nothing is retried or rolled back.

use std::fmt;
use std::path::Path;

use tracing::{error, info};

use super::BackupError;
use super::state::{BackupStage, PipelineState};
use super::validate::BackupRequest;
use crate::command_runner::{CommandRunner, run_tool};
use crate::secret::Secret;
use crate::tools::restic::{KEEP_LAST, ResticArgs, ResticCommand};

/// Everything a run needs, built once and never mutated.
#[derive(Debug)]
pub struct BackupContext {
    request: BackupRequest,
    password: Secret,
}

impl BackupContext {
    pub fn new(request: BackupRequest, password: Secret) -> Self {
        Self { request, password }
    }

    pub fn source(&self) -> &Path {
        self.request.source()
    }

    pub fn repository(&self) -> &str {
        self.request.repository()
    }
}

/// One restic call in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    CheckRepository,
    Backup,
    Prune,
    Verify,
}

impl PipelineStep {
    /// Steps in execution order.
    pub const ALL: [PipelineStep; 4] = [
        PipelineStep::CheckRepository,
        PipelineStep::Backup,
        PipelineStep::Prune,
        PipelineStep::Verify,
    ];

    /// Stage entered when this step succeeds.
    pub const fn completes(self) -> BackupStage {
        match self {
            PipelineStep::CheckRepository => BackupStage::StoreChecked,
            PipelineStep::Backup => BackupStage::BackedUp,
            PipelineStep::Prune => BackupStage::Pruned,
            PipelineStep::Verify => BackupStage::Verified,
        }
    }

    /// Message reported when this step fails.
    pub const fn failure_message(self) -> &'static str {
        match self {
            PipelineStep::CheckRepository => "Repository not found or not initialized",
            PipelineStep::Backup => "Backup failed",
            PipelineStep::Prune => "Pruning old snapshots failed",
            PipelineStep::Verify => "Repository integrity check failed",
        }
    }

    fn command(self, source: &Path) -> ResticCommand {
        match self {
            PipelineStep::CheckRepository => ResticCommand::CatConfig,
            PipelineStep::Backup => ResticCommand::Backup {
                source: source.to_path_buf(),
            },
            PipelineStep::Prune => ResticCommand::ForgetPrune { keep_last: KEEP_LAST },
            PipelineStep::Verify => ResticCommand::Check,
        }
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStep::CheckRepository => f.write_str("Checking repository"),
            PipelineStep::Backup => f.write_str("Creating snapshot"),
            PipelineStep::Prune => write!(f, "Keeping last {} snapshots and pruning", KEEP_LAST),
            PipelineStep::Verify => f.write_str("Checking repository integrity"),
        }
    }
}

/// Runs the four restic steps against one repository.
pub struct BackupPipeline<R: CommandRunner> {
    runner: R,
    restic: String,
    state: PipelineState,
}

impl<R: CommandRunner> BackupPipeline<R> {
    /// Create a pipeline continuing from `state`, which must be `Unlocked`.
    pub fn new(runner: R, restic: impl Into<String>, state: PipelineState) -> Self {
        Self {
            runner,
            restic: restic.into(),
            state,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Run every step in order, stopping at the first failure.
    pub fn run(&mut self, ctx: &BackupContext) -> Result<(), BackupError> {
        if self.state.current_stage() != BackupStage::Unlocked {
            return Err(BackupError::Transition(
                super::state::TransitionError::SkippedStage {
                    from: self.state.current_stage(),
                    to: BackupStage::StoreChecked,
                },
            ));
        }

        for step in PipelineStep::ALL {
            if let Err(err) = self.run_step(step, ctx) {
                // Failed is always reachable from a non-terminal, started run
                let _ = self.state.fail();
                error!("{}", err);
                return Err(err);
            }
            self.state.transition_to(step.completes())?;
            println!("✓ {}", step.completes());
        }

        self.state.transition_to(BackupStage::Done)?;
        info!("backup of {} finished", ctx.source().display());
        Ok(())
    }

    fn run_step(&self, step: PipelineStep, ctx: &BackupContext) -> Result<(), BackupError> {
        println!("→ {}...", step);
        let args = ResticArgs {
            binary: self.restic.clone(),
            repository: ctx.repository().to_string(),
            password: ctx.password.clone(),
            command: step.command(ctx.source()),
        };

        let output = run_tool(&self.runner, &args).map_err(|e| BackupError::StageFailed {
            step,
            message: step.failure_message(),
            detail: format!("{:#}", e),
        })?;

        if output.success {
            Ok(())
        } else {
            Err(BackupError::StageFailed {
                step,
                message: step.failure_message(),
                detail: output.failure_detail(),
            })
        }
    }
}
