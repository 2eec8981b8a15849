//! locksmith binary entry point.
//!
//! Runs the CLI and turns the result into a process exit code. Lock service
//! failures are reported as `Lock failed: <cause>` and exit with 2; every
//! other error exits with 1.

use std::process::ExitCode;

use locksmith::cli::{self, exit_codes};
use locksmith::engine::LockCommandError;
use locksmith::ui::output;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            match err.downcast_ref::<LockCommandError>() {
                Some(lock_err @ LockCommandError::LockFailed { .. }) => eprintln!("{}", lock_err),
                _ => output::error(format!("{:#}", err)),
            }
            ExitCode::from(exit_codes::for_error(&err) as u8)
        }
    }
}
