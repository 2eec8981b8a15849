//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module provides the **single doorway** to all Git operations in
//! locksmith. Everything the lock workflow needs from the repository
//! (its root, the current ref, remotes and config values) flows through
//! [`Git`], which normalizes git2 errors into [`GitError`].
//!
//! # Example
//!
//! ```ignore
//! use locksmith::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! println!("repository root: {}", git.work_dir()?.display());
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::{RefName, TypeError};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Invalid ref name format.
    #[error("invalid ref name: {message}")]
    InvalidRefName {
        /// Description of the problem
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        GitError::InvalidRefName {
            message: err.to_string(),
        }
    }
}

/// Read-only handle on the repository a command runs in.
///
/// No other module imports `git2`.
pub struct Git {
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("git_dir", &self.repo.path())
            .field("work_dir", &self.repo.workdir())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Discovery
    // =========================================================================

    /// Find the repository containing `start`, walking up parent directories.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] when no enclosing repository exists
    /// - [`GitError::BareRepo`] when the repository has no work tree to lock files in
    pub fn open(start: &Path) -> Result<Self, GitError> {
        match git2::Repository::discover(start) {
            Ok(repo) if repo.is_bare() => Err(GitError::BareRepo),
            Ok(repo) => Ok(Self { repo }),
            Err(_) => Err(GitError::NotARepo {
                path: start.to_path_buf(),
            }),
        }
    }

    /// The work tree root, as git2 reports it (not canonicalized).
    pub fn work_dir(&self) -> Result<&Path, GitError> {
        self.repo.workdir().ok_or(GitError::BareRepo)
    }

    /// Get direct access to the .git directory path.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    // =========================================================================
    // Refs
    // =========================================================================

    /// Get the ref HEAD points at, if HEAD is on a branch.
    ///
    /// An unborn branch (fresh repository with no commits) still reports
    /// its symbolic target. Returns `None` for a detached HEAD.
    pub fn current_ref(&self) -> Result<Option<RefName>, GitError> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => {
                let head = self.repo.find_reference("HEAD")?;
                return match head.symbolic_target() {
                    Some(target) => Ok(Some(RefName::new(target)?)),
                    None => Ok(None),
                };
            }
            Err(e) => return Err(e.into()),
        };

        if head.is_branch() {
            if let Some(name) = head.name() {
                return Ok(Some(RefName::new(name)?));
            }
        }

        Ok(None) // Detached HEAD
    }

    /// Get the current branch's short name, if on a branch.
    pub fn current_branch(&self) -> Result<Option<String>, GitError> {
        Ok(self
            .current_ref()?
            .and_then(|r| r.strip_prefix("refs/heads/").map(String::from)))
    }

    // =========================================================================
    // Config
    // =========================================================================

    /// Read a string value from the repository's layered git config.
    ///
    /// Returns `None` when the key is not set.
    pub fn config_string(&self, key: &str) -> Result<Option<String>, GitError> {
        let config = self.repo.config()?;
        match config.get_string(key) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::Internal {
                message: format!("{}: {}", key, e.message()),
            }),
        }
    }

    // =========================================================================
    // Remote Operations
    // =========================================================================

    /// Get the URL for a remote.
    ///
    /// Returns `None` if the remote doesn't exist.
    pub fn remote_url(&self, name: &str) -> Result<Option<String>, GitError> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(remote.url().map(String::from)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::Internal {
                message: e.message().to_string(),
            }),
        }
    }

    /// Get the remote that pushes from the current branch go to.
    ///
    /// Resolved the way `git push` does: `branch.<name>.pushRemote`, then
    /// `remote.pushDefault`, then `branch.<name>.remote`, falling back to
    /// `origin`.
    pub fn push_remote(&self) -> Result<String, GitError> {
        let branch = self.current_branch()?;
        let branch_key = |key: &str| match &branch {
            Some(name) => self.config_string(&format!("branch.{name}.{key}")),
            None => Ok(None),
        };

        if let Some(remote) = branch_key("pushRemote")? {
            return Ok(remote);
        }
        if let Some(remote) = self.config_string("remote.pushDefault")? {
            return Ok(remote);
        }
        if let Some(remote) = branch_key("remote")? {
            return Ok(remote);
        }

        Ok(DEFAULT_REMOTE.to_string())
    }
}

/// Remote used when nothing else is configured.
pub const DEFAULT_REMOTE: &str = "origin";
