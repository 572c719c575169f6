//! In-memory secret handling.
//!
//! # Security Model
//!
//! Secrets (the restic repository password, the Immich API key) live only in
//! process memory. They are NEVER written to disk, NEVER passed as CLI
//! arguments (visible in `ps aux`) and NEVER printed through `Debug` or logs.
//! The only way out of the process is the environment of a single child
//! command, set per invocation.

use std::fmt;

use serde::{Deserialize, Deserializer};

/// A string that must not leak.
///
/// `Debug` prints a redacted placeholder and the buffer is overwritten with
/// NUL bytes when the value is dropped.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the secret value.
    ///
    /// Call sites should hand the result straight to the consumer (child
    /// environment, HTTP header) without storing it.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl Drop for Secret {
    /// Overwrite the buffer in place before it is freed.
    fn drop(&mut self) {
        let len = self.0.len();
        self.0.clear();
        // capacity >= len, so this writes over the same allocation
        self.0.extend(std::iter::repeat_n('\0', len));
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Secret)
    }
}
