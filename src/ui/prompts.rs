//! ui::prompts
//!
//! Interactive prompts. Only shown in interactive mode; otherwise callers
//! get [`PromptError::NotInteractive`] and must ask for a flag instead.

use std::io::{self, Write};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Prompt for masked input (tokens). The input is not echoed.
///
/// An empty answer counts as cancelling.
pub fn password(message: &str, interactive: bool) -> Result<String, PromptError> {
    if !interactive {
        return Err(PromptError::NotInteractive);
    }

    print!("{}: ", message);
    io::stdout().flush()?;

    let value = rpassword::read_password()?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(PromptError::Cancelled);
    }
    Ok(value)
}
