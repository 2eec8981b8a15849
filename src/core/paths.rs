//! core::paths
//!
//! Resolution of user-supplied paths into repository-relative lock paths.
//!
//! # Algorithm
//!
//! 1. Take the repository root from the [`RepositoryContext`] and resolve
//!    any symlinks in it.
//! 2. Take the working directory (the `--cwd` override or the process
//!    working directory) and resolve any symlinks in it.
//! 3. Join the working directory with the input. Backslashes in the input
//!    are treated as separators on every platform. `.` and `..` segments
//!    are folded lexically, so intermediate directories need not exist.
//! 4. Make the result relative to the root. An empty result, or one that
//!    leaves the root, is rejected.
//! 5. Refuse directories. A missing file is fine: a lock may be taken on a
//!    file that is about to be created.
//!
//! # Example
//!
//! - Working directory: `/code/foo/bar/`
//! - Repository root: `/code/foo/`
//! - Input: `./baz`
//! - Result: `bar/baz`
//!
//! ```no_run
//! use locksmith::core::paths::PathResolver;
//! use locksmith::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new(".")).unwrap();
//! let resolver = PathResolver::new(&git, None).unwrap();
//! let path = resolver.resolve("./baz").unwrap();
//! println!("{}", path);
//! ```

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::core::types::{CanonicalPath, TypeError};
use crate::git::RepositoryContext;

/// Reasons a path cannot be locked.
///
/// All of these are detected locally, before any request reaches the lock
/// service.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// No repository around the working directory.
    #[error("not in a git repository: {message}")]
    NoRepository { message: String },

    /// The process working directory could not be read.
    #[error("cannot determine working directory: {0}")]
    WorkingDirUnavailable(#[source] io::Error),

    /// Symlinks in a directory path could not be followed.
    #[error("could not follow symlinks for {}", path.display())]
    SymlinkResolutionFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The path is the repository root or lies outside it.
    ///
    /// `relative` is the path as computed against the root, `input` what
    /// the user typed.
    #[error("unable to canonicalize path {relative:?} (from {input:?}): outside of repository")]
    OutsideRepository { input: String, relative: String },

    /// The path names an existing directory.
    #[error("cannot lock directory: {path}")]
    PathIsDirectory { path: String },

    /// The path is not valid UTF-8 once made relative.
    #[error("path is not valid UTF-8: {}", path.display())]
    NonUtf8Path { path: PathBuf },

    #[error(transparent)]
    Invalid(#[from] TypeError),
}

/// Maps input paths to [`CanonicalPath`]s for one invocation.
///
/// The repository root and working directory are captured (and
/// canonicalized) once, when the resolver is built.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    working_dir: PathBuf,
}

impl PathResolver {
    /// Build a resolver for `repo`.
    ///
    /// `working_dir` overrides the process working directory.
    ///
    /// # Errors
    ///
    /// - [`ResolutionError::NoRepository`] if the repository root is unavailable
    /// - [`ResolutionError::WorkingDirUnavailable`] if the working directory can't be read
    /// - [`ResolutionError::SymlinkResolutionFailed`] if either directory can't be canonicalized
    pub fn new(
        repo: &dyn RepositoryContext,
        working_dir: Option<&Path>,
    ) -> Result<Self, ResolutionError> {
        let root = repo
            .root_dir()
            .map_err(|e| ResolutionError::NoRepository {
                message: e.to_string(),
            })?;

        let working_dir = match working_dir {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir().map_err(ResolutionError::WorkingDirUnavailable)?,
        };

        Ok(Self {
            root: canonicalize(&root)?,
            working_dir: canonicalize(&working_dir)?,
        })
    }

    /// Build a resolver from directories that are already canonical.
    ///
    /// No filesystem access happens here; it is the caller's job to pass
    /// symlink-free absolute paths.
    pub fn from_canonical_dirs(root: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            working_dir: working_dir.into(),
        }
    }

    /// The canonical repository root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The canonical working directory.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Resolve one input path.
    ///
    /// # Errors
    ///
    /// - [`ResolutionError::OutsideRepository`] for the root itself or anything outside it
    /// - [`ResolutionError::PathIsDirectory`] if the path names an existing directory
    pub fn resolve(&self, input: &str) -> Result<CanonicalPath, ResolutionError> {
        let absolute = self.absolute(input);

        let outside = || ResolutionError::OutsideRepository {
            input: input.to_string(),
            relative: relative_to(&absolute, &self.root),
        };

        let relative = absolute.strip_prefix(&self.root).map_err(|_| outside())?;

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => {
                    segments.push(segment.to_str().ok_or_else(|| {
                        ResolutionError::NonUtf8Path {
                            path: absolute.clone(),
                        }
                    })?)
                }
                _ => return Err(outside()),
            }
        }

        if segments.is_empty() {
            return Err(outside());
        }

        if fs::metadata(&absolute).is_ok_and(|m| m.is_dir()) {
            return Err(ResolutionError::PathIsDirectory {
                path: input.to_string(),
            });
        }

        Ok(CanonicalPath::new(segments.join("/"))?)
    }

    /// Resolve every input in order, stopping at the first failure.
    pub fn resolve_all<S: AsRef<str>>(
        &self,
        inputs: &[S],
    ) -> Result<Vec<CanonicalPath>, ResolutionError> {
        inputs.iter().map(|input| self.resolve(input.as_ref())).collect()
    }

    /// Join the working directory with `input` and fold `.`/`..` lexically.
    fn absolute(&self, input: &str) -> PathBuf {
        let input = input.replace('\\', "/");
        clean(&self.working_dir.join(input))
    }
}

/// Resolve symlinks along `path`.
fn canonicalize(path: &Path) -> Result<PathBuf, ResolutionError> {
    fs::canonicalize(path).map_err(|source| ResolutionError::SymlinkResolutionFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// `path` relative to `base`, with `..` for each level `path` is above it.
///
/// Both must be absolute and lexically clean. The root itself is `"."`.
fn relative_to(path: &Path, base: &Path) -> String {
    let path: Vec<_> = path.components().collect();
    let base: Vec<_> = base.components().collect();
    let common = path
        .iter()
        .zip(&base)
        .take_while(|(a, b)| a == b)
        .count();

    let parts: Vec<String> = std::iter::repeat("..".to_string())
        .take(base.len() - common)
        .chain(
            path[common..]
                .iter()
                .map(|c| c.as_os_str().to_string_lossy().into_owned()),
        )
        .collect();

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Lexically normalize a path: drop `.`, fold `..` into its parent.
///
/// `..` never climbs above the filesystem root.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
