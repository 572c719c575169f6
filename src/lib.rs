//! housekeep Library
//!
//! Household automation chores behind one CLI: a restic backup pipeline,
//! ffmpeg batch conversion, GPX track cleanup and Immich uploads.

pub mod backup;
pub mod cli;
pub mod command_runner;
pub mod commands;
pub mod config;
pub mod convert;
pub mod error;
pub mod immich;
pub mod sanity;
pub mod secret;
pub mod tool_traits;
pub mod tools;
pub mod tracks;

// Re-export main types for convenience
pub use backup::{
    BackupError, BackupStage, PipelineState, PipelineStep, SecretPrompt, TransitionError,
    run_backup,
};
pub use command_runner::{CommandOutput, CommandRunner, OutputMode, SystemRunner, ToolInvocation};
pub use config::{ImmichCredentials, Settings};
pub use convert::{ConversionSummary, ConvertMode, convert_directory};
pub use error::HousekeepError;
pub use immich::{ImmichApi, ImmichClient, ImmichError, RetryPolicy};
pub use secret::Secret;
pub use tool_traits::ToolArgs;
pub use tools::ffmpeg::FfmpegArgs;
pub use tools::restic::{ResticArgs, ResticCommand};
pub use tracks::{TrackOptions, TrackSummary};
