//! git::context
//!
//! The repository capabilities the lock workflow consumes.
//!
//! Path resolution and target selection depend on this trait rather than
//! on [`Git`] so tests can describe a repository without creating one.

use std::path::PathBuf;

use super::interface::{Git, GitError};
use crate::core::types::RefName;

/// Read-only view of the repository a lock command runs in.
pub trait RepositoryContext {
    /// Root of the working tree.
    fn root_dir(&self) -> Result<PathBuf, GitError>;

    /// Ref the lock is scoped to; `None` for a detached HEAD.
    fn current_ref(&self) -> Result<Option<RefName>, GitError>;

    /// Remote that pushes from the current branch target.
    fn push_remote(&self) -> Result<String, GitError>;

    /// URL of the named remote, `None` if it doesn't exist.
    fn remote_url(&self, name: &str) -> Result<Option<String>, GitError>;

    /// A git config value, `None` if unset.
    fn config_string(&self, key: &str) -> Result<Option<String>, GitError>;

    /// Ref on `remote` that a push of the current branch would update.
    ///
    /// Follows `push.default`: `upstream`/`tracking` always use
    /// `branch.<b>.merge`, `simple` (the default) uses it only when the
    /// branch tracks `remote`, and every other mode keeps the local name.
    /// Falls back to [`current_ref`](Self::current_ref).
    fn remote_ref(&self, remote: &str) -> Result<Option<RefName>, GitError> {
        let Some(current) = self.current_ref()? else {
            return Ok(None);
        };
        let Some(branch) = current.strip_prefix("refs/heads/").map(String::from) else {
            return Ok(Some(current));
        };

        let use_merge = match self.config_string("push.default")?.as_deref() {
            None | Some("simple") => {
                self.config_string(&format!("branch.{branch}.remote"))?.as_deref() == Some(remote)
            }
            Some("upstream") | Some("tracking") => true,
            Some(_) => false,
        };
        if !use_merge {
            return Ok(Some(current));
        }

        match self.config_string(&format!("branch.{branch}.merge"))? {
            Some(merge) if merge.starts_with("refs/") => Ok(Some(RefName::new(merge)?)),
            Some(merge) => Ok(Some(RefName::for_branch(&merge)?)),
            None => Ok(Some(current)),
        }
    }
}

impl RepositoryContext for Git {
    fn root_dir(&self) -> Result<PathBuf, GitError> {
        Ok(self.work_dir()?.to_path_buf())
    }

    fn current_ref(&self) -> Result<Option<RefName>, GitError> {
        Git::current_ref(self)
    }

    fn push_remote(&self) -> Result<String, GitError> {
        Git::push_remote(self)
    }

    fn remote_url(&self, name: &str) -> Result<Option<String>, GitError> {
        Git::remote_url(self, name)
    }

    fn config_string(&self, key: &str) -> Result<Option<String>, GitError> {
        Git::config_string(self, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::mock::MockRepository;

    fn feature_branch() -> MockRepository {
        MockRepository::new("/work")
            .with_branch("feature")
            .with_config("branch.feature.remote", "origin")
            .with_config("branch.feature.merge", "refs/heads/main")
    }

    fn pushed_ref(repo: &MockRepository, remote: &str) -> Option<String> {
        repo.remote_ref(remote)
            .unwrap()
            .map(|r| r.as_str().to_string())
    }

    mod remote_ref {
        use super::*;

        #[test]
        fn simple_uses_merge_for_tracked_remote() {
            let repo = feature_branch();
            assert_eq!(pushed_ref(&repo, "origin").as_deref(), Some("refs/heads/main"));
        }

        #[test]
        fn simple_keeps_local_name_for_other_remote() {
            let repo = feature_branch();
            assert_eq!(pushed_ref(&repo, "fork").as_deref(), Some("refs/heads/feature"));
        }

        #[test]
        fn upstream_uses_merge_for_any_remote() {
            let repo = feature_branch().with_config("push.default", "upstream");
            assert_eq!(pushed_ref(&repo, "fork").as_deref(), Some("refs/heads/main"));
        }

        #[test]
        fn current_keeps_local_name() {
            let repo = feature_branch().with_config("push.default", "current");
            assert_eq!(pushed_ref(&repo, "origin").as_deref(), Some("refs/heads/feature"));
        }

        #[test]
        fn untracked_branch_keeps_local_name() {
            let repo = MockRepository::new("/work")
                .with_branch("feature")
                .with_config("push.default", "upstream");
            assert_eq!(pushed_ref(&repo, "origin").as_deref(), Some("refs/heads/feature"));
        }

        #[test]
        fn detached_head_has_no_ref() {
            let repo = MockRepository::new("/work").with_config("push.default", "upstream");
            assert_eq!(pushed_ref(&repo, "origin"), None);
        }
    }
}
