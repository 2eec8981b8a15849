//! git::mock
//!
//! In-memory [`RepositoryContext`] for deterministic testing.
//!
//! # Example
//!
//! ```
//! use locksmith::git::mock::MockRepository;
//! use locksmith::git::RepositoryContext;
//!
//! let repo = MockRepository::new("/code/foo")
//!     .with_branch("main")
//!     .with_remote("origin", "https://example.com/foo.git");
//!
//! assert_eq!(repo.push_remote().unwrap(), "origin");
//! assert_eq!(
//!     repo.current_ref().unwrap().unwrap().as_str(),
//!     "refs/heads/main"
//! );
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use super::context::RepositoryContext;
use super::interface::{GitError, DEFAULT_REMOTE};
use crate::core::types::RefName;

/// Mock repository for testing.
#[derive(Debug, Clone)]
pub struct MockRepository {
    root: Option<PathBuf>,
    current_ref: Option<RefName>,
    push_remote: String,
    remotes: HashMap<String, String>,
    config: HashMap<String, String>,
}

impl MockRepository {
    /// Create a mock repository rooted at `root`, with a detached HEAD and
    /// no remotes.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            current_ref: None,
            push_remote: DEFAULT_REMOTE.to_string(),
            remotes: HashMap::new(),
            config: HashMap::new(),
        }
    }

    /// Create a mock that behaves as if no repository was found.
    pub fn missing() -> Self {
        Self {
            root: None,
            ..Self::new("")
        }
    }

    /// Put HEAD on `refs/heads/<branch>`.
    ///
    /// # Panics
    ///
    /// Panics if `branch` is not a valid branch name.
    pub fn with_branch(mut self, branch: &str) -> Self {
        self.current_ref = Some(RefName::for_branch(branch).expect("valid branch name"));
        self
    }

    /// Set the push remote name.
    pub fn with_push_remote(mut self, name: &str) -> Self {
        self.push_remote = name.to_string();
        self
    }

    /// Add a remote.
    pub fn with_remote(mut self, name: &str, url: &str) -> Self {
        self.remotes.insert(name.to_string(), url.to_string());
        self
    }

    /// Set a git config value.
    pub fn with_config(mut self, key: &str, value: &str) -> Self {
        self.config.insert(key.to_string(), value.to_string());
        self
    }
}

impl RepositoryContext for MockRepository {
    fn root_dir(&self) -> Result<PathBuf, GitError> {
        self.root.clone().ok_or_else(|| GitError::NotARepo {
            path: PathBuf::from("."),
        })
    }

    fn current_ref(&self) -> Result<Option<RefName>, GitError> {
        Ok(self.current_ref.clone())
    }

    fn push_remote(&self) -> Result<String, GitError> {
        Ok(self.push_remote.clone())
    }

    fn remote_url(&self, name: &str) -> Result<Option<String>, GitError> {
        Ok(self.remotes.get(name).cloned())
    }

    fn config_string(&self, key: &str) -> Result<Option<String>, GitError> {
        Ok(self.config.get(key).cloned())
    }
}
