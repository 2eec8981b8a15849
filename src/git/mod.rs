//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. No other module should
//! import `git2`. The lock workflow only reads from the repository: its
//! working-tree root, the ref HEAD points at, remotes and config values.
//!
//! Consumers take a [`RepositoryContext`] so they can be exercised against
//! a fake repository in tests.
//!
//! # Example
//!
//! ```ignore
//! use locksmith::git::{Git, RepositoryContext};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let remote = git.push_remote()?;
//! let url = git.remote_url(&remote)?;
//! ```

mod context;
mod interface;
pub mod mock;

pub use context::RepositoryContext;
pub use interface::{Git, GitError, DEFAULT_REMOTE};
