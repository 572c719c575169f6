//! Pre-flight checks for the runtime environment
//!
//! - Required external binaries are present
//! - Running with root privileges (EUID 0) where a command needs it
//!
//! Binary lookup walks `PATH` directly instead of spawning `which`, so a
//! failed pre-flight never runs an external program.

use std::env;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::error::HousekeepError;

/// Check if running as root (EUID 0)
pub fn is_running_as_root() -> bool {
    nix::unistd::geteuid().is_root()
}

fn is_executable(path: &Path) -> bool {
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Resolve `name` to an executable: used as-is when it contains a path
/// separator, otherwise searched in `PATH`.
pub fn find_binary(name: &str) -> Option<PathBuf> {
    if name.contains('/') {
        let path = PathBuf::from(name);
        return is_executable(&path).then_some(path);
    }
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

/// Map binary names to the package providing them
fn get_package_for_binary(binary: &str) -> &'static str {
    let name = Path::new(binary)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(binary);
    match name {
        "restic" => "restic",
        "ffmpeg" => "ffmpeg",
        _ => "unknown",
    }
}

/// Fail with `MissingTool` unless `binary` is available.
pub fn require_binary(binary: &str) -> Result<PathBuf, HousekeepError> {
    match find_binary(binary) {
        Some(path) => {
            tracing::debug!("found {} at {}", binary, path.display());
            Ok(path)
        }
        None => Err(HousekeepError::MissingTool {
            binary: binary.to_string(),
            package: get_package_for_binary(binary).to_string(),
        }),
    }
}
