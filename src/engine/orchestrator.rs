//! engine::orchestrator
//!
//! Drives one lock request from canonical paths to rendered output.
//!
//! # Flow
//!
//! ```text
//! LockTarget ──> LockSession::open ──> lock_batch ──> render records ──> exit disposition
//! ```
//!
//! # Invariants
//!
//! - Exactly one batch request per invocation, covering every path in order
//! - Records the service granted are rendered before any error is surfaced
//! - The client is closed on every path out of the orchestrator
//! - No retries

use std::io::{self, Write};

use thiserror::Error;

use crate::core::types::CanonicalPath;
use crate::lockservice::{
    ConnectError, LockClient, LockClientFactory, LockError, LockOutcome, LockTarget,
};
use crate::ui::output::{self, LockRenderer, Verbosity};

/// Errors from a lock run.
#[derive(Debug, Error)]
pub enum LockCommandError {
    /// No client could be opened; nothing was sent.
    #[error("cannot connect to lock service: {0}")]
    Connect(#[from] ConnectError),

    /// Writing the records failed.
    #[error("cannot write output: {0}")]
    Output(#[from] io::Error),

    /// The lock service reported an error. Any granted records have
    /// already been rendered.
    #[error("Lock failed: {source}")]
    LockFailed {
        locked: usize,
        requested: usize,
        source: LockError,
    },
}

/// Scoped ownership of a lock client.
///
/// The client is closed when the session is closed or dropped, whichever
/// comes first, and never twice through the session.
pub struct LockSession {
    client: Box<dyn LockClient>,
    closed: bool,
}

impl LockSession {
    /// Open a client for `target`.
    pub fn open(
        factory: &dyn LockClientFactory,
        target: &LockTarget,
    ) -> Result<Self, ConnectError> {
        Ok(Self {
            client: factory.connect(target)?,
            closed: false,
        })
    }

    pub fn client(&self) -> &dyn LockClient {
        self.client.as_ref()
    }

    /// Close the client now.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.client.close();
        }
    }
}

impl Drop for LockSession {
    fn drop(&mut self) {
        self.release();
    }
}

/// Acquires locks for a batch of canonical paths against one target.
///
/// # Example
///
/// ```
/// use locksmith::core::types::CanonicalPath;
/// use locksmith::engine::orchestrator::LockOrchestrator;
/// use locksmith::lockservice::mock::{MockLockClient, MockLockClientFactory};
/// use locksmith::lockservice::LockTarget;
/// use locksmith::ui::output::{LockRenderer, OutputMode};
///
/// # tokio_test::block_on(async {
/// let factory = MockLockClientFactory::new(MockLockClient::new());
/// let target = LockTarget {
///     remote: "origin".into(),
///     remote_ref: None,
///     endpoint: "https://lfs.example.com".into(),
/// };
///
/// let mut renderer = LockRenderer::new(Vec::new(), OutputMode::Text);
/// let paths = [CanonicalPath::new("bar/baz").unwrap()];
/// LockOrchestrator::new(target, &factory)
///     .run(&paths, &mut renderer)
///     .await
///     .unwrap();
///
/// assert_eq!(renderer.into_inner(), b"Locked bar/baz\n");
/// # });
/// ```
pub struct LockOrchestrator<'a> {
    target: LockTarget,
    factory: &'a dyn LockClientFactory,
    verbosity: Verbosity,
}

impl<'a> LockOrchestrator<'a> {
    pub fn new(target: LockTarget, factory: &'a dyn LockClientFactory) -> Self {
        Self {
            target,
            factory,
            verbosity: Verbosity::Normal,
        }
    }

    /// Set the verbosity for diagnostics.
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// The target this orchestrator is bound to.
    pub fn target(&self) -> &LockTarget {
        &self.target
    }

    /// Send one batch for `paths` and return what the service reported.
    ///
    /// An empty batch returns an empty outcome without opening a client.
    pub async fn acquire(&self, paths: &[CanonicalPath]) -> Result<LockOutcome, LockCommandError> {
        if paths.is_empty() {
            return Ok(LockOutcome::default());
        }

        output::debug(
            format!(
                "locking {} path(s) on remote '{}' ({}) at {}",
                paths.len(),
                self.target.remote,
                self.target
                    .remote_ref
                    .as_ref()
                    .map(|r| r.as_str())
                    .unwrap_or("no ref"),
                self.target.endpoint
            ),
            self.verbosity,
        );

        let session = LockSession::open(self.factory, &self.target)?;
        output::debug(
            format!("opened {} lock client", session.client().name()),
            self.verbosity,
        );

        let outcome = session.client().lock_batch(paths).await;
        session.close();

        output::debug(
            format!(
                "lock service granted {} of {} lock(s)",
                outcome.records.len(),
                paths.len()
            ),
            self.verbosity,
        );
        Ok(outcome)
    }

    /// Acquire, render every granted record, then report the error if any.
    ///
    /// Returns the number of records rendered.
    pub async fn run<W: Write>(
        &self,
        paths: &[CanonicalPath],
        renderer: &mut LockRenderer<W>,
    ) -> Result<usize, LockCommandError> {
        let outcome = self.acquire(paths).await?;
        let rendered = renderer.render(&outcome.records);
        let locked = outcome.records.len();

        match outcome.error {
            None => {
                rendered?;
                Ok(locked)
            }
            Some(source) => {
                // The lock service error decides the exit status; a write
                // failure on top of it is only reported.
                if let Err(err) = rendered {
                    output::error(format!("cannot write output: {}", err));
                }
                Err(LockCommandError::LockFailed {
                    locked,
                    requested: paths.len(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RefName;
    use crate::lockservice::mock::{MockLockClient, MockLockClientFactory};
    use crate::ui::output::OutputMode;

    fn target() -> LockTarget {
        LockTarget {
            remote: "origin".into(),
            remote_ref: Some(RefName::for_branch("main").unwrap()),
            endpoint: "https://lfs.example.com/assets.git/info/lfs".into(),
        }
    }

    fn paths(list: &[&str]) -> Vec<CanonicalPath> {
        list.iter().map(|p| CanonicalPath::new(*p).unwrap()).collect()
    }

    fn text_renderer() -> LockRenderer<Vec<u8>> {
        LockRenderer::new(Vec::new(), OutputMode::Text)
    }

    /// A sink whose reader has gone away.
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    mod session {
        use super::*;

        #[test]
        fn drop_closes_once() {
            let client = MockLockClient::new();
            let factory = MockLockClientFactory::new(client.clone());
            {
                let _session = LockSession::open(&factory, &target()).unwrap();
                assert!(!client.is_closed());
            }
            assert_eq!(client.close_calls(), 1);
        }

        #[test]
        fn explicit_close_is_not_repeated_on_drop() {
            let client = MockLockClient::new();
            let factory = MockLockClientFactory::new(client.clone());
            LockSession::open(&factory, &target()).unwrap().close();
            assert_eq!(client.close_calls(), 1);
        }
    }

    mod acquire {
        use super::*;

        #[tokio::test]
        async fn single_batch_in_order() {
            let client = MockLockClient::new();
            let factory = MockLockClientFactory::new(client.clone());
            let orchestrator = LockOrchestrator::new(target(), &factory);

            let batch = paths(&["b.bin", "a.bin", "b.bin"]);
            let outcome = orchestrator.acquire(&batch).await.unwrap();

            assert!(outcome.error.is_none());
            assert_eq!(client.batches(), vec![batch]);
            assert_eq!(factory.targets(), vec![target()]);
            assert_eq!(client.close_calls(), 1);
        }

        #[tokio::test]
        async fn empty_batch_does_not_connect() {
            let client = MockLockClient::new();
            let factory = MockLockClientFactory::new(client.clone());
            let outcome = LockOrchestrator::new(target(), &factory)
                .acquire(&[])
                .await
                .unwrap();

            assert_eq!(outcome, LockOutcome::default());
            assert!(factory.targets().is_empty());
            assert!(client.batches().is_empty());
        }

        #[tokio::test]
        async fn connect_failure_is_local() {
            let factory = MockLockClientFactory::new(MockLockClient::new()).fail_connect("bad");
            let err = LockOrchestrator::new(target(), &factory)
                .acquire(&paths(&["a.bin"]))
                .await
                .unwrap_err();
            assert!(matches!(err, LockCommandError::Connect(_)));
        }
    }

    mod run {
        use super::*;

        #[tokio::test]
        async fn full_success_renders_all() {
            let client = MockLockClient::new();
            let factory = MockLockClientFactory::new(client.clone());
            let mut renderer = text_renderer();

            let locked = LockOrchestrator::new(target(), &factory)
                .run(&paths(&["bar/baz", "a.bin"]), &mut renderer)
                .await
                .unwrap();

            assert_eq!(locked, 2);
            assert_eq!(
                String::from_utf8(renderer.into_inner()).unwrap(),
                "Locked bar/baz\nLocked a.bin\n"
            );
            assert_eq!(client.close_calls(), 1);
        }

        #[tokio::test]
        async fn partial_success_renders_then_fails() {
            let client = MockLockClient::new().already_locked("b.bin", "alice");
            let factory = MockLockClientFactory::new(client.clone());
            let mut renderer = text_renderer();

            let err = LockOrchestrator::new(target(), &factory)
                .run(&paths(&["a.bin", "b.bin"]), &mut renderer)
                .await
                .unwrap_err();

            match &err {
                LockCommandError::LockFailed {
                    locked,
                    requested,
                    source,
                } => {
                    assert_eq!(*locked, 1);
                    assert_eq!(*requested, 2);
                    assert!(matches!(source, LockError::AlreadyLocked { owner, .. } if owner == "alice"));
                }
                other => panic!("expected LockFailed, got {:?}", other),
            }
            assert_eq!(err.to_string(), "Lock failed: b.bin is already locked by alice");
            assert_eq!(
                String::from_utf8(renderer.into_inner()).unwrap(),
                "Locked a.bin\n"
            );
            assert_eq!(client.close_calls(), 1);
        }

        #[tokio::test]
        async fn total_failure_renders_nothing() {
            let client = MockLockClient::new().fail_batch(LockError::AuthRequired);
            let factory = MockLockClientFactory::new(client.clone());
            let mut renderer = LockRenderer::new(Vec::new(), OutputMode::Json);

            let err = LockOrchestrator::new(target(), &factory)
                .run(&paths(&["a.bin"]), &mut renderer)
                .await
                .unwrap_err();

            assert!(matches!(
                err,
                LockCommandError::LockFailed {
                    locked: 0,
                    source: LockError::AuthRequired,
                    ..
                }
            ));
            assert!(renderer.into_inner().is_empty());
            assert_eq!(client.close_calls(), 1);
        }

        #[tokio::test]
        async fn write_failure_does_not_hide_lock_error() {
            let client = MockLockClient::new().already_locked("b.bin", "alice");
            let factory = MockLockClientFactory::new(client.clone());
            let mut renderer = LockRenderer::new(BrokenPipe, OutputMode::Text);

            let err = LockOrchestrator::new(target(), &factory)
                .run(&paths(&["a.bin", "b.bin"]), &mut renderer)
                .await
                .unwrap_err();

            assert!(matches!(
                err,
                LockCommandError::LockFailed {
                    locked: 1,
                    source: LockError::AlreadyLocked { .. },
                    ..
                }
            ));
            assert_eq!(client.close_calls(), 1);
        }

        #[tokio::test]
        async fn write_failure_after_full_success_is_output_error() {
            let factory = MockLockClientFactory::new(MockLockClient::new());
            let mut renderer = LockRenderer::new(BrokenPipe, OutputMode::Json);

            let err = LockOrchestrator::new(target(), &factory)
                .run(&paths(&["a.bin"]), &mut renderer)
                .await
                .unwrap_err();

            assert!(matches!(err, LockCommandError::Output(_)));
        }

        #[tokio::test]
        async fn json_records_follow_service_order() {
            let factory = MockLockClientFactory::new(MockLockClient::new());
            let mut renderer = LockRenderer::new(Vec::new(), OutputMode::Json);

            LockOrchestrator::new(target(), &factory)
                .run(&paths(&["z.bin", "a.bin"]), &mut renderer)
                .await
                .unwrap();

            let out = String::from_utf8(renderer.into_inner()).unwrap();
            let records: Vec<crate::core::types::LockRecord> = out
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect();
            let order: Vec<_> = records.iter().map(|r| r.path.as_str()).collect();
            assert_eq!(order, vec!["z.bin", "a.bin"]);
        }
    }
}
