//! Backup Pipeline State Machine
//!
//! Authoritative record of how far a backup run has progressed. Only forward
//! transitions to the next stage are allowed, and every run ends in either
//! `Done` or `Failed`.
//!
//! # Stage Flow
//!
//! ```text
//! Start
//!     ↓
//! Validated      (arguments, source directory, privilege)
//!     ↓
//! Unlocked       (repository password collected)
//!     ↓
//! StoreChecked   (restic cat config)
//!     ↓
//! BackedUp       (restic backup)
//!     ↓
//! Pruned         (restic forget --prune)
//!     ↓
//! Verified       (restic check)
//!     ↓
//! Done
//!
//! (Any stage after Start can transition to Failed)
//! ```

use std::fmt;
use thiserror::Error;

/// Backup stages in sequential order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BackupStage {
    /// Nothing checked yet
    Start = 0,
    /// Invocation and preconditions verified
    Validated = 1,
    /// Repository password collected
    Unlocked = 2,
    /// Repository exists and is initialized
    StoreChecked = 3,
    /// Snapshot created
    BackedUp = 4,
    /// Old snapshots forgotten and space reclaimed
    Pruned = 5,
    /// Repository integrity verified
    Verified = 6,
    /// Run completed successfully (terminal state)
    Done = 7,
    /// Run failed (terminal state)
    Failed = 255,
}

impl BackupStage {
    #[inline]
    pub const fn order(self) -> u8 {
        self as u8
    }

    /// Returns true if this is a terminal state (Done or Failed)
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns the next stage in the sequence, or None if at a terminal state
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Start => Some(Self::Validated),
            Self::Validated => Some(Self::Unlocked),
            Self::Unlocked => Some(Self::StoreChecked),
            Self::StoreChecked => Some(Self::BackedUp),
            Self::BackedUp => Some(Self::Pruned),
            Self::Pruned => Some(Self::Verified),
            Self::Verified => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Start => "Not started",
            Self::Validated => "Preconditions validated",
            Self::Unlocked => "Repository unlocked",
            Self::StoreChecked => "Repository found",
            Self::BackedUp => "Snapshot created",
            Self::Pruned => "Old snapshots pruned",
            Self::Verified => "Repository integrity verified",
            Self::Done => "Backup complete",
            Self::Failed => "Backup failed",
        }
    }

    /// Returns all stages in order (excluding Failed)
    pub const fn all_stages() -> &'static [Self] {
        &[
            Self::Start,
            Self::Validated,
            Self::Unlocked,
            Self::StoreChecked,
            Self::BackedUp,
            Self::Pruned,
            Self::Verified,
            Self::Done,
        ]
    }
}

impl fmt::Display for BackupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur during state transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// Attempted to skip one or more stages
    #[error("Cannot skip from {from} to {to}")]
    SkippedStage { from: BackupStage, to: BackupStage },

    /// Attempted to go backwards
    #[error("Cannot go backwards from {from} to {to}")]
    BackwardTransition { from: BackupStage, to: BackupStage },

    /// Attempted to transition out of Done or Failed
    #[error("Cannot transition from terminal state {from}")]
    FromTerminalState { from: BackupStage },

    /// Attempted to fail before anything started
    #[error("Cannot fail before the run has started")]
    FailBeforeStart,

    /// Attempted to transition to the current stage
    #[error("Already at stage {stage}")]
    AlreadyAtStage { stage: BackupStage },
}

/// Tracks the current stage of one backup run.
///
/// # Example
///
/// ```
/// use housekeep::backup::state::{BackupStage, PipelineState};
///
/// let mut state = PipelineState::new();
/// state.advance().unwrap();
/// assert_eq!(state.current_stage(), BackupStage::Validated);
///
/// // Cannot skip stages
/// assert!(state.transition_to(BackupStage::BackedUp).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PipelineState {
    current: BackupStage,
    failed_at: Option<BackupStage>,
    history: Vec<BackupStage>,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineState {
    pub fn new() -> Self {
        Self {
            current: BackupStage::Start,
            failed_at: None,
            history: Vec::with_capacity(BackupStage::all_stages().len()),
        }
    }

    #[inline]
    pub fn current_stage(&self) -> BackupStage {
        self.current
    }

    /// Returns the stage at which failure occurred, if any
    #[inline]
    pub fn failed_at(&self) -> Option<BackupStage> {
        self.failed_at
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.current == BackupStage::Done
    }

    #[inline]
    pub fn is_failed(&self) -> bool {
        self.current == BackupStage::Failed
    }

    /// Stages entered so far, in order
    pub fn history(&self) -> &[BackupStage] {
        &self.history
    }

    /// Advance to the next stage in sequence.
    ///
    /// # Errors
    ///
    /// - `FromTerminalState` if already at Done or Failed
    pub fn advance(&mut self) -> Result<BackupStage, TransitionError> {
        let Some(next_stage) = self.current.next() else {
            return Err(TransitionError::FromTerminalState { from: self.current });
        };
        self.enter(next_stage);
        Ok(next_stage)
    }

    /// Transition to a specific stage (must be the next stage in sequence).
    ///
    /// Stricter than `advance()`: the caller states which stage it expects
    /// to enter, so out-of-order pipeline code fails loudly.
    pub fn transition_to(&mut self, target: BackupStage) -> Result<BackupStage, TransitionError> {
        if self.current.is_terminal() {
            return Err(TransitionError::FromTerminalState { from: self.current });
        }
        if target == self.current {
            return Err(TransitionError::AlreadyAtStage { stage: target });
        }
        // Failed is reachable only through fail()
        if target == BackupStage::Failed {
            return Err(TransitionError::SkippedStage {
                from: self.current,
                to: target,
            });
        }
        if target.order() < self.current.order() {
            return Err(TransitionError::BackwardTransition {
                from: self.current,
                to: target,
            });
        }
        if self.current.next() != Some(target) {
            return Err(TransitionError::SkippedStage {
                from: self.current,
                to: target,
            });
        }

        self.enter(target);
        Ok(target)
    }

    /// Mark the run as failed, recording the stage it failed after.
    ///
    /// # Errors
    ///
    /// - `FailBeforeStart` if nothing has happened yet
    /// - `FromTerminalState` if already at Done or Failed
    pub fn fail(&mut self) -> Result<(), TransitionError> {
        if self.current == BackupStage::Start {
            return Err(TransitionError::FailBeforeStart);
        }
        if self.current.is_terminal() {
            return Err(TransitionError::FromTerminalState { from: self.current });
        }

        self.failed_at = Some(self.current);
        self.enter(BackupStage::Failed);
        Ok(())
    }

    fn enter(&mut self, stage: BackupStage) {
        tracing::debug!("backup stage: {} -> {}", self.current, stage);
        self.history.push(stage);
        self.current = stage;
    }
}
