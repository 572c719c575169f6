//! Type-safe external tool argument modules.
//!
//! Each struct here implements `ToolArgs` and maps Rust fields to the exact
//! CLI flags and environment variables expected by the corresponding tool.

pub mod ffmpeg;
pub mod restic;
