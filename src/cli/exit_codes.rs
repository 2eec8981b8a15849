//! Exit code constants for the locksmith CLI.
//!
//! - 0: Success
//! - 1: Local error (bad args, path resolution, configuration, connection)
//! - 2: The lock service reported an error, including partial success

use crate::engine::LockCommandError;

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Local error: nothing was locked because of a problem on this machine.
pub const LOCAL_ERROR: i32 = 1;

/// Lock service error, reported after any granted locks were printed.
pub const LOCK_FAILED: i32 = 2;

/// Exit code for an error returned by a command.
pub fn for_error(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<LockCommandError>() {
        Some(LockCommandError::LockFailed { .. }) => LOCK_FAILED,
        _ => LOCAL_ERROR,
    }
}
