//! lockservice::traits
//!
//! Lock service client trait and the result types it produces.
//!
//! # Design
//!
//! [`LockClient::lock_batch`] never returns `Err`. A batch can succeed for
//! some paths and fail for others, so the client always reports what it
//! managed to lock alongside the error (if any) in a [`LockOutcome`].
//! Callers render the records first and act on the error afterwards.
//!
//! # Example
//!
//! ```ignore
//! use locksmith::lockservice::LockClient;
//!
//! async fn lock_all(client: &dyn LockClient, paths: &[CanonicalPath]) {
//!     let outcome = client.lock_batch(paths).await;
//!     for record in &outcome.records {
//!         println!("Locked {}", record.path);
//!     }
//!     if let Some(err) = outcome.error {
//!         eprintln!("Lock failed: {}", err);
//!     }
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use super::target::LockTarget;
use crate::core::types::{CanonicalPath, LockRecord};

/// Errors reported by the lock service or the transport to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// The service wants credentials and none were sent.
    #[error("authentication required")]
    AuthRequired,

    /// Credentials were rejected.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// Someone else already holds the lock.
    #[error("{path} is already locked by {owner}")]
    AlreadyLocked { path: String, owner: String },

    /// The endpoint does not exist or does not serve locks.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The client was used after `close()`.
    #[error("lock client is closed")]
    Closed,

    /// Several paths failed; one entry per failed path, in request order.
    #[error("{} paths could not be locked: {}", .0.len(), summarize(.0))]
    Batch(Vec<PathFailure>),
}

/// A single path that could not be locked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFailure {
    pub path: CanonicalPath,
    pub error: LockError,
}

impl std::fmt::Display for PathFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.error {
            // Already names the path.
            LockError::AlreadyLocked { .. } => write!(f, "{}", self.error),
            other => write!(f, "{}: {}", self.path, other),
        }
    }
}

fn summarize(failures: &[PathFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl LockError {
    /// Fold per-path failures into one error.
    ///
    /// Returns `None` for no failures and the failure's own error when there
    /// is exactly one.
    pub fn from_failures(mut failures: Vec<PathFailure>) -> Option<Self> {
        match failures.len() {
            0 => None,
            1 => failures.pop().map(|f| f.error),
            _ => Some(LockError::Batch(failures)),
        }
    }
}

/// Result of one batched lock request.
///
/// - total failure: no records, `error` set
/// - partial success: some records, `error` set
/// - full success: records, no error
///
/// Every record present is a lock the service actually holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockOutcome {
    /// Locks acquired, in service order
    pub records: Vec<LockRecord>,
    /// Error to report once the records are rendered
    pub error: Option<LockError>,
}

impl LockOutcome {
    /// Outcome where nothing was locked.
    pub fn failure(error: LockError) -> Self {
        Self {
            records: Vec::new(),
            error: Some(error),
        }
    }
}

/// A connection to a lock service, scoped to one remote and ref.
///
/// # Lifecycle
///
/// Obtained from a [`LockClientFactory`], used for one batch, then closed.
/// `close()` must be idempotent; the orchestrator's session guard calls it
/// on every exit path, including after an explicit close.
#[async_trait]
pub trait LockClient: Send + Sync {
    /// Client name for diagnostics (e.g. "lfs", "mock").
    fn name(&self) -> &'static str;

    /// Request locks for every path in `paths`, in order.
    ///
    /// Fewer records than paths is normal when `error` is set.
    async fn lock_batch(&self, paths: &[CanonicalPath]) -> LockOutcome;

    /// Release the connection. Safe to call more than once.
    fn close(&self);
}

/// Produces lock clients for a resolved target.
pub trait LockClientFactory {
    /// Open a client bound to `target`.
    ///
    /// # Errors
    ///
    /// Errors here happen before any lock request is sent.
    fn connect(&self, target: &LockTarget) -> Result<Box<dyn LockClient>, ConnectError>;
}

/// Failure to build a client.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("cannot read credentials: {0}")]
    Credentials(#[from] crate::secrets::SecretError),

    #[error("invalid lock service endpoint '{0}'")]
    InvalidEndpoint(String),

    #[error("cannot create HTTP client: {0}")]
    Http(String),
}
