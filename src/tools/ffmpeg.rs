//! Type-safe arguments for ffmpeg transcoding.

use std::path::PathBuf;

use crate::convert::ConvertMode;
use crate::tool_traits::ToolArgs;

/// Type-safe arguments for a single-file ffmpeg conversion.
///
/// Produces `ffmpeg -hide_banner -loglevel error -nostdin -y -i <input>
/// <mode codec args> <output>`. Output is captured so a failing file only
/// contributes its last stderr line to the report.
#[derive(Debug, Clone)]
pub struct FfmpegArgs {
    pub binary: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub mode: ConvertMode,
}

impl ToolArgs for FfmpegArgs {
    fn program(&self) -> &str {
        &self.binary
    }

    fn to_cli_args(&self) -> Vec<String> {
        let mut args: Vec<String> = ["-hide_banner", "-loglevel", "error", "-nostdin", "-y", "-i"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        args.push(self.input.display().to_string());
        args.extend(self.mode.codec_args().iter().map(|s| s.to_string()));
        args.push(self.output.display().to_string());
        args
    }
}
