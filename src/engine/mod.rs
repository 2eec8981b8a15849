//! engine
//!
//! Runs the lock workflow once the CLI has parsed its arguments.
//!
//! # Architecture
//!
//! ```text
//! paths ──> PathResolver ──> LockTarget::resolve ──> LockOrchestrator ──> sink
//! ```
//!
//! Resolution happens first and fails fast: nothing is sent to the lock
//! service unless every path resolved. The orchestrator receives its target
//! as a value and owns the client session for exactly one batch.

pub mod orchestrator;

pub use orchestrator::{LockCommandError, LockOrchestrator, LockSession};

use std::path::PathBuf;

use crate::ui::output::Verbosity;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Interactive mode enabled.
    pub interactive: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            cwd: None,
            debug: false,
            quiet: false,
            interactive: true,
        }
    }
}

impl Context {
    /// Verbosity derived from the quiet and debug flags.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let ctx = Context::default();
        assert!(ctx.cwd.is_none());
        assert!(!ctx.debug);
        assert!(!ctx.quiet);
        assert!(ctx.interactive);
        assert_eq!(ctx.verbosity(), Verbosity::Normal);
    }

    #[test]
    fn verbosity_follows_flags() {
        let ctx = Context {
            debug: true,
            ..Default::default()
        };
        assert_eq!(ctx.verbosity(), Verbosity::Debug);

        let ctx = Context {
            debug: true,
            quiet: true,
            ..Default::default()
        };
        assert_eq!(ctx.verbosity(), Verbosity::Quiet);
    }
}
