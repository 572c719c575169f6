//! End-to-end tests for the `housekeep` binary
//!
//! These tests verify:
//! - Usage errors exit 1, help exits 0
//! - A batch conversion with a failing file still exits 0 and reports per file
//! - Commands that need no configuration ignore a broken config file
//! - A failed command prints one error line carrying its cause

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Output};

/// Run the binary with `config_home` as the XDG config directory so the
/// user's own configuration is never read.
fn housekeep(config_home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_housekeep"))
        .args(args)
        .env("XDG_CONFIG_HOME", config_home)
        .env_remove("RUST_LOG")
        .env_remove("IMMICH_URL")
        .env_remove("IMMICH_API_KEY")
        .output()
        .expect("failed to run housekeep")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Stand-in ffmpeg: creates the output (last argument) unless the input is
/// `corrupt.mp4`.
fn write_fake_ffmpeg(dir: &Path) -> String {
    let path = dir.join("ffmpeg");
    fs::write(
        &path,
        r#"#!/bin/sh
last=""
for arg in "$@"; do
    last="$arg"
    case "$arg" in
        */corrupt.mp4) echo "$arg: Invalid data found when processing input" >&2; exit 1 ;;
    esac
done
: > "$last"
"#,
    )
    .unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}

// =============================================================================
// Argument handling
// =============================================================================

#[test]
fn test_backup_with_one_argument_exits_1() {
    let home = tempfile::tempdir().unwrap();
    let output = housekeep(home.path(), &["backup", "onlyone"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_backup_with_three_arguments_exits_1() {
    let home = tempfile::tempdir().unwrap();
    let output = housekeep(home.path(), &["backup", "a", "b", "c"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_help_exits_0() {
    let home = tempfile::tempdir().unwrap();
    let output = housekeep(home.path(), &["--help"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Usage"));
}

// =============================================================================
// Convert
// =============================================================================

#[test]
fn test_convert_with_one_failing_file_exits_0() {
    let home = tempfile::tempdir().unwrap();
    let tools = tempfile::tempdir().unwrap();
    let videos = tempfile::tempdir().unwrap();
    fs::write(videos.path().join("good.mp4"), b"video").unwrap();
    fs::write(videos.path().join("corrupt.mp4"), b"video").unwrap();
    let config = tools.path().join("config.json");
    fs::write(
        &config,
        serde_json::json!({ "tools": { "ffmpeg": write_fake_ffmpeg(tools.path()) } }).to_string(),
    )
    .unwrap();

    let output = housekeep(
        home.path(),
        &[
            "convert",
            "mp4-to-mov",
            videos.path().to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ],
    );

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    let err = stderr(&output);
    assert_eq!(out.matches("Successfully converted").count(), 1, "{out}");
    assert!(out.contains("✅ Successfully converted good.mp4 -> good.mov"), "{out}");
    assert_eq!(err.matches("Error converting").count(), 1, "{err}");
    assert!(err.contains("❌ Error converting corrupt.mp4:"), "{err}");
    assert!(videos.path().join("good.mov").exists());
    assert!(!videos.path().join("corrupt.mov").exists());
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_gpx_ignores_broken_default_config() {
    let home = tempfile::tempdir().unwrap();
    fs::create_dir(home.path().join("housekeep")).unwrap();
    fs::write(home.path().join("housekeep").join("config.json"), "{bad").unwrap();
    let tracks = tempfile::tempdir().unwrap();

    let output = housekeep(home.path(), &["gpx", tracks.path().to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
}

#[test]
fn test_broken_config_reported_once_with_cause() {
    let home = tempfile::tempdir().unwrap();
    let videos = tempfile::tempdir().unwrap();
    let config = home.path().join("broken.json");
    fs::write(&config, "{bad").unwrap();

    let output = housekeep(
        home.path(),
        &[
            "convert",
            "mp4-to-mov",
            videos.path().to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert_eq!(err.matches('❌').count(), 1, "{err}");
    assert!(err.contains("Failed to parse configuration JSON"), "{err}");
    assert!(err.contains("broken.json"), "{err}");
    assert!(err.contains("key must be a string"), "{err}");
}
