//! lockservice::target
//!
//! The remote, ref and endpoint a lock request is bound to.

use super::endpoint::{self, EndpointError};
use crate::core::config::Config;
use crate::core::types::RefName;
use crate::git::RepositoryContext;

/// Where lock requests are sent.
///
/// Resolved once, before any client is opened, and then passed by value.
/// Nothing downstream consults ambient state to change it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockTarget {
    /// Remote name the locks belong to
    pub remote: String,
    /// Ref on the remote the locks are scoped to; `None` on a detached HEAD
    pub remote_ref: Option<RefName>,
    /// Lock service base URL
    pub endpoint: String,
}

impl LockTarget {
    /// Resolve the target for this invocation.
    ///
    /// The remote is taken from `remote_override` (the `--remote` flag),
    /// then the repo config, then the repository's push remote.
    pub fn resolve(
        repo: &dyn RepositoryContext,
        config: &Config,
        remote_override: Option<&str>,
    ) -> Result<Self, EndpointError> {
        let remote = match remote_override.or(config.remote()) {
            Some(name) => name.to_string(),
            None => repo.push_remote()?,
        };
        let remote_ref = repo.remote_ref(&remote)?;
        let endpoint = endpoint::discover(repo, config, &remote)?;

        Ok(Self {
            remote,
            remote_ref,
            endpoint,
        })
    }
}
