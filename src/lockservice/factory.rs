//! lockservice::factory
//!
//! Builds HTTP lock clients for a resolved [`LockTarget`].
//!
//! Commands go through [`LockClientFactory`] instead of constructing
//! [`LfsLockClient`] directly, so tests can substitute the mock factory.

use super::endpoint::endpoint_host;
use super::lfs::LfsLockClient;
use super::target::LockTarget;
use super::traits::{ConnectError, LockClient, LockClientFactory};
use crate::secrets::{self, SecretStore};

/// Factory for [`LfsLockClient`], looking tokens up per endpoint host.
pub struct LfsClientFactory {
    store: Box<dyn SecretStore>,
}

impl LfsClientFactory {
    /// Create a factory reading credentials from `store`.
    pub fn new(store: Box<dyn SecretStore>) -> Self {
        Self { store }
    }
}

impl LockClientFactory for LfsClientFactory {
    fn connect(&self, target: &LockTarget) -> Result<Box<dyn LockClient>, ConnectError> {
        if !(target.endpoint.starts_with("https://") || target.endpoint.starts_with("http://")) {
            return Err(ConnectError::InvalidEndpoint(target.endpoint.clone()));
        }
        let host = endpoint_host(&target.endpoint)
            .ok_or_else(|| ConnectError::InvalidEndpoint(target.endpoint.clone()))?;
        let token = secrets::lookup_token(self.store.as_ref(), &host)?;

        Ok(Box::new(LfsLockClient::new(
            target.endpoint.clone(),
            target.remote_ref.clone(),
            token,
        )))
    }
}
