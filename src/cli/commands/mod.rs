//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Calls the engine to execute the command
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! `lock` talks to the lock service over HTTP. It builds a tokio runtime
//! and blocks on the orchestrator, keeping dispatch synchronous.

mod auth;
mod completion;
pub mod lock;

pub use auth::auth;
pub use completion::completion;
pub use lock::lock;

use crate::cli::args::Command;
use crate::engine::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Lock {
            paths,
            remote,
            json,
        } => lock::lock(ctx, &paths, remote.as_deref(), json),
        Command::Auth {
            host,
            token,
            status,
            logout,
        } => auth::auth(ctx, host.as_deref(), token.as_deref(), status, logout),
        Command::Completion { shell } => completion::completion(shell),
    }
}
