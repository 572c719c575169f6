//! Repository password prompt.

use anyhow::{Context, Result};

use crate::secret::Secret;

/// Source of the repository password.
pub trait SecretPrompt {
    /// Ask once for a secret. Empty input is returned as-is.
    fn prompt(&self, message: &str) -> Result<Secret>;
}

/// Reads the password from the controlling terminal with echo disabled.
///
/// `rpassword` writes the prompt to the tty and echoes only the final
/// newline, so the cursor ends on a fresh line after input.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl SecretPrompt for TerminalPrompt {
    fn prompt(&self, message: &str) -> Result<Secret> {
        let value =
            rpassword::prompt_password(message).context("Failed to read password from terminal")?;
        tracing::debug!("password read from terminal ({} bytes)", value.len());
        Ok(Secret::from(value))
    }
}
