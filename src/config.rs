//! Configuration file handling.
//!
//! Settings come from an optional JSON file, then environment variables on
//! top. The default location is `<config dir>/housekeep/config.json`; a
//! missing default file simply means defaults, while an explicit `--config`
//! path must exist.
//!
//! ```json
//! {
//!   "tools": { "restic": "/usr/bin/restic", "ffmpeg": "ffmpeg" },
//!   "immich": { "url": "https://photos.example.com", "api_key": "...", "device_id": "housekeep" }
//! }
//! ```
//!
//! The backup repository password is never read from configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::error::HousekeepError;
use crate::secret::Secret;

/// Environment variable overriding `immich.url`.
pub const IMMICH_URL_ENV: &str = "IMMICH_URL";
/// Environment variable overriding `immich.api_key`.
pub const IMMICH_API_KEY_ENV: &str = "IMMICH_API_KEY";

/// All settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tools: ToolPaths,
    pub immich: ImmichSettings,
}

/// Binaries used for external tools, by name or path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub restic: String,
    pub ffmpeg: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            restic: "restic".to_string(),
            ffmpeg: "ffmpeg".to_string(),
        }
    }
}

/// Immich server settings as configured (possibly incomplete).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImmichSettings {
    pub url: Option<String>,
    pub api_key: Option<Secret>,
    pub device_id: String,
}

impl Default for ImmichSettings {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            device_id: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

/// Complete Immich credentials.
#[derive(Debug, Clone)]
pub struct ImmichCredentials {
    pub url: String,
    pub api_key: Secret,
    pub device_id: String,
}

impl ImmichSettings {
    /// Require both URL and API key.
    pub fn credentials(&self) -> std::result::Result<ImmichCredentials, HousekeepError> {
        let url = self
            .url
            .as_deref()
            .map(|u| u.trim().trim_end_matches('/'))
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                HousekeepError::config(format!(
                    "{} is not set (environment or immich.url in the config file)",
                    IMMICH_URL_ENV
                ))
            })?;
        let api_key = self
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                HousekeepError::config(format!(
                    "{} is not set (environment or immich.api_key in the config file)",
                    IMMICH_API_KEY_ENV
                ))
            })?;

        Ok(ImmichCredentials {
            url: url.to_string(),
            api_key,
            device_id: self.device_id.clone(),
        })
    }
}

impl Settings {
    /// Default config file location, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("housekeep").join("config.json"))
    }

    /// Load settings from `explicit` or the default location, then apply
    /// environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut settings = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::load_from_file(&path)?,
                _ => {
                    debug!("no config file, using defaults");
                    Self::default()
                }
            },
        };
        settings.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let settings: Self = serde_json::from_str(&content).with_context(|| {
            format!("Failed to parse configuration JSON in {:?}", path.as_ref())
        })?;
        debug!("loaded configuration from {:?}", path.as_ref());
        Ok(settings)
    }

    /// Override file values with non-empty environment values.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(IMMICH_URL_ENV).filter(|v| !v.is_empty()) {
            self.immich.url = Some(url);
        }
        if let Some(key) = lookup(IMMICH_API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.immich.api_key = Some(Secret::new(key));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.tools.restic, "restic");
        assert_eq!(settings.tools.ffmpeg, "ffmpeg");
        assert_eq!(settings.immich.device_id, "housekeep");
        assert!(settings.immich.url.is_none());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"tools": {"restic": "/opt/restic"}}"#).unwrap();

        let settings = Settings::load_from_file(&path).unwrap();
        assert_eq!(settings.tools.restic, "/opt/restic");
        assert_eq!(settings.tools.ffmpeg, "ffmpeg");
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(&dir.path().join("nope.json"))).is_err());
    }

    #[test]
    fn test_invalid_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = Settings::load_from_file(&path).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("config.json"), "{message}");
        assert!(message.contains("key must be a string"), "{message}");
    }

    #[test]
    fn test_env_overrides_file() {
        let mut settings: Settings = serde_json::from_str(
            r#"{"immich": {"url": "http://file", "api_key": "file-key"}}"#,
        )
        .unwrap();
        let env: HashMap<&str, &str> = [(IMMICH_URL_ENV, "http://env/")].into_iter().collect();
        settings.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));

        let creds = settings.immich.credentials().unwrap();
        assert_eq!(creds.url, "http://env");
        assert_eq!(creds.api_key.expose(), "file-key");
    }

    #[test]
    fn test_missing_credentials() {
        let settings = Settings::default();
        let err = settings.immich.credentials().unwrap_err();
        assert!(err.to_string().contains(IMMICH_URL_ENV));

        let mut settings = Settings::default();
        settings.immich.url = Some("http://x".to_string());
        let err = settings.immich.credentials().unwrap_err();
        assert!(err.to_string().contains(IMMICH_API_KEY_ENV));
    }
}
