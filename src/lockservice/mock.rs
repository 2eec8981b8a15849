//! lockservice::mock
//!
//! In-memory lock service for deterministic testing.
//!
//! # Example
//!
//! ```
//! use locksmith::core::types::CanonicalPath;
//! use locksmith::lockservice::mock::MockLockClient;
//! use locksmith::lockservice::{LockClient, LockError};
//!
//! # tokio_test::block_on(async {
//! let client = MockLockClient::new().already_locked("b.bin", "alice");
//!
//! let outcome = client
//!     .lock_batch(&[
//!         CanonicalPath::new("a.bin").unwrap(),
//!         CanonicalPath::new("b.bin").unwrap(),
//!     ])
//!     .await;
//!
//! assert_eq!(outcome.records.len(), 1);
//! assert_eq!(outcome.records[0].path, "a.bin");
//! assert!(matches!(outcome.error, Some(LockError::AlreadyLocked { .. })));
//! # });
//! ```

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::target::LockTarget;
use super::traits::{
    ConnectError, LockClient, LockClientFactory, LockError, LockOutcome, PathFailure,
};
use crate::core::types::{CanonicalPath, LockOwner, LockRecord};

/// Mock lock client.
///
/// Clones share state, so a test can keep one handle for inspection while
/// the code under test owns another.
#[derive(Debug, Clone)]
pub struct MockLockClient {
    inner: Arc<Mutex<MockLockInner>>,
}

#[derive(Debug)]
struct MockLockInner {
    /// Locks held by someone else, path -> owner
    foreign: HashMap<String, String>,
    /// Locks granted by this mock, path -> id
    granted: HashMap<String, String>,
    /// Per-path failures to inject
    fail_paths: HashMap<String, LockError>,
    /// Fail the whole batch before locking anything
    fail_batch: Option<LockError>,
    next_id: u64,
    owner: String,
    batches: Vec<Vec<CanonicalPath>>,
    close_calls: usize,
}

impl MockLockClient {
    /// Create a mock where every lock succeeds.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockLockInner {
                foreign: HashMap::new(),
                granted: HashMap::new(),
                fail_paths: HashMap::new(),
                fail_batch: None,
                next_id: 1,
                owner: "mock-user".to_string(),
                batches: Vec::new(),
                close_calls: 0,
            })),
        }
    }

    /// Mark `path` as locked by `owner`; requests for it conflict.
    pub fn already_locked(self, path: &str, owner: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .foreign
            .insert(path.to_string(), owner.to_string());
        self
    }

    /// Fail requests for `path` with `error`.
    pub fn fail_path(self, path: &str, error: LockError) -> Self {
        self.inner
            .lock()
            .unwrap()
            .fail_paths
            .insert(path.to_string(), error);
        self
    }

    /// Fail every batch with `error` without locking anything.
    pub fn fail_batch(self, error: LockError) -> Self {
        self.inner.lock().unwrap().fail_batch = Some(error);
        self
    }

    /// Batches received, in call order.
    pub fn batches(&self) -> Vec<Vec<CanonicalPath>> {
        self.inner.lock().unwrap().batches.clone()
    }

    /// Number of `close()` calls.
    pub fn close_calls(&self) -> usize {
        self.inner.lock().unwrap().close_calls
    }

    /// Whether `close()` has been called at least once.
    pub fn is_closed(&self) -> bool {
        self.close_calls() > 0
    }

    /// Paths this mock has granted locks on.
    pub fn granted(&self) -> Vec<String> {
        let mut paths: Vec<_> = self.inner.lock().unwrap().granted.keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl Default for MockLockClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed timestamp so rendered output is reproducible.
fn mock_timestamp() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

#[async_trait]
impl LockClient for MockLockClient {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn lock_batch(&self, paths: &[CanonicalPath]) -> LockOutcome {
        let mut inner = self.inner.lock().unwrap();
        inner.batches.push(paths.to_vec());

        if inner.close_calls > 0 {
            return LockOutcome::failure(LockError::Closed);
        }
        if let Some(err) = inner.fail_batch.clone() {
            return LockOutcome::failure(err);
        }

        let mut records = Vec::new();
        let mut failures = Vec::new();

        for path in paths {
            let key = path.as_str();
            let failure = inner.fail_paths.get(key).cloned().or_else(|| {
                inner
                    .foreign
                    .get(key)
                    .map(|owner| LockError::AlreadyLocked {
                        path: key.to_string(),
                        owner: owner.clone(),
                    })
            });

            if let Some(error) = failure {
                failures.push(PathFailure {
                    path: path.clone(),
                    error,
                });
                continue;
            }

            let id = if let Some(id) = inner.granted.get(key).cloned() {
                id
            } else {
                let id = inner.next_id.to_string();
                inner.next_id += 1;
                inner.granted.insert(key.to_string(), id.clone());
                id
            };

            records.push(LockRecord {
                id,
                path: key.to_string(),
                owner: Some(LockOwner {
                    name: inner.owner.clone(),
                }),
                locked_at: mock_timestamp(),
            });
        }

        LockOutcome {
            records,
            error: LockError::from_failures(failures),
        }
    }

    fn close(&self) {
        self.inner.lock().unwrap().close_calls += 1;
    }
}

/// Factory handing out clones of one [`MockLockClient`].
#[derive(Debug, Clone, Default)]
pub struct MockLockClientFactory {
    client: MockLockClient,
    fail_connect: Option<String>,
    targets: Arc<Mutex<Vec<LockTarget>>>,
}

impl MockLockClientFactory {
    /// Factory that returns `client` for every target.
    pub fn new(client: MockLockClient) -> Self {
        Self {
            client,
            fail_connect: None,
            targets: Arc::default(),
        }
    }

    /// Make `connect` fail with an invalid-endpoint error.
    pub fn fail_connect(mut self, endpoint: &str) -> Self {
        self.fail_connect = Some(endpoint.to_string());
        self
    }

    /// Targets passed to `connect`, in call order.
    pub fn targets(&self) -> Vec<LockTarget> {
        self.targets.lock().unwrap().clone()
    }
}

impl LockClientFactory for MockLockClientFactory {
    fn connect(&self, target: &LockTarget) -> Result<Box<dyn LockClient>, ConnectError> {
        self.targets.lock().unwrap().push(target.clone());
        if let Some(endpoint) = &self.fail_connect {
            return Err(ConnectError::InvalidEndpoint(endpoint.clone()));
        }
        Ok(Box::new(self.client.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(list: &[&str]) -> Vec<CanonicalPath> {
        list.iter().map(|p| CanonicalPath::new(*p).unwrap()).collect()
    }

    #[tokio::test]
    async fn grants_all_in_order() {
        let client = MockLockClient::new();
        let outcome = client.lock_batch(&paths(&["b.bin", "a.bin"])).await;

        assert!(outcome.error.is_none());
        let got: Vec<_> = outcome.records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(got, vec!["b.bin", "a.bin"]);
        assert_eq!(outcome.records[0].id, "1");
        assert_eq!(outcome.records[1].id, "2");
    }

    #[tokio::test]
    async fn relocking_returns_same_id() {
        let client = MockLockClient::new();
        let first = client.lock_batch(&paths(&["a.bin"])).await;
        let second = client.lock_batch(&paths(&["a.bin"])).await;
        assert_eq!(first.records[0].id, second.records[0].id);
        assert_eq!(client.granted(), vec!["a.bin".to_string()]);
    }

    #[tokio::test]
    async fn several_failures_become_batch_error() {
        let client = MockLockClient::new()
            .already_locked("a.bin", "alice")
            .fail_path("c.bin", LockError::RateLimited);
        let outcome = client
            .lock_batch(&paths(&["a.bin", "b.bin", "c.bin"]))
            .await;

        assert_eq!(outcome.records.len(), 1);
        match outcome.error {
            Some(LockError::Batch(failures)) => {
                assert_eq!(failures.len(), 2);
                assert_eq!(failures[0].path.as_str(), "a.bin");
                assert_eq!(failures[1].error, LockError::RateLimited);
            }
            other => panic!("expected batch error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn batch_failure_locks_nothing() {
        let client = MockLockClient::new().fail_batch(LockError::AuthRequired);
        let outcome = client.lock_batch(&paths(&["a.bin"])).await;
        assert_eq!(outcome, LockOutcome::failure(LockError::AuthRequired));
        assert!(client.granted().is_empty());
    }

    #[tokio::test]
    async fn records_batches_and_closes() {
        let client = MockLockClient::new();
        let handle = client.clone();
        client.lock_batch(&paths(&["a.bin", "a.bin"])).await;
        client.close();
        client.close();

        assert_eq!(handle.batches(), vec![paths(&["a.bin", "a.bin"])]);
        assert_eq!(handle.close_calls(), 2);

        let after = client.lock_batch(&paths(&["b.bin"])).await;
        assert_eq!(after.error, Some(LockError::Closed));
    }

    #[test]
    fn factory_records_targets() {
        let factory = MockLockClientFactory::new(MockLockClient::new());
        let target = LockTarget {
            remote: "origin".into(),
            remote_ref: None,
            endpoint: "https://lfs.example.com".into(),
        };
        assert!(factory.connect(&target).is_ok());
        assert_eq!(factory.targets(), vec![target.clone()]);

        let failing = factory.fail_connect("https://lfs.example.com");
        assert!(failing.connect(&target).is_err());
    }
}
