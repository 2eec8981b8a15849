//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`CanonicalPath`] - Repository-relative, forward-slash file identifier
//! - [`RefName`] - Validated Git reference name
//! - [`LockRecord`] - A lock held by the lock service
//! - [`LockOwner`] - Identity owning a lock
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use locksmith::core::types::{CanonicalPath, RefName};
//!
//! let path = CanonicalPath::new("assets/hero.psd").unwrap();
//! assert_eq!(path.as_str(), "assets/hero.psd");
//!
//! let refname = RefName::for_branch("main").unwrap();
//! assert_eq!(refname.as_str(), "refs/heads/main");
//!
//! assert!(CanonicalPath::new("../outside.bin").is_err());
//! assert!(RefName::new("refs/heads/bad..name").is_err());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid canonical path: {0}")]
    InvalidCanonicalPath(String),

    #[error("invalid ref name: {0}")]
    InvalidRefName(String),
}

/// A file identifier relative to the repository root.
///
/// Canonical paths always use `/` as the separator, never start with `/`,
/// and contain no `.`, `..` or empty segments. The path resolver is the
/// normal way to obtain one; it additionally guarantees the path does not
/// name a directory. The file itself does not have to exist.
///
/// # Example
///
/// ```
/// use locksmith::core::types::CanonicalPath;
///
/// let path = CanonicalPath::new("bar/baz").unwrap();
/// assert_eq!(path.to_string(), "bar/baz");
///
/// assert!(CanonicalPath::new("").is_err());
/// assert!(CanonicalPath::new("/abs/path").is_err());
/// assert!(CanonicalPath::new("bar\\baz").is_err());
/// assert!(CanonicalPath::new("bar/../baz").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalPath(String);

impl CanonicalPath {
    /// Create a new validated canonical path.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidCanonicalPath` if the value is empty,
    /// absolute, uses backslashes, or has `.`, `..` or empty segments.
    pub fn new(path: impl Into<String>) -> Result<Self, TypeError> {
        let path = path.into();
        Self::validate(&path)?;
        Ok(Self(path))
    }

    fn validate(path: &str) -> Result<(), TypeError> {
        if path.is_empty() {
            return Err(TypeError::InvalidCanonicalPath(
                "path cannot be empty".into(),
            ));
        }

        if path.starts_with('/') {
            return Err(TypeError::InvalidCanonicalPath(format!(
                "path must be relative: {path}"
            )));
        }

        if path.contains('\\') {
            return Err(TypeError::InvalidCanonicalPath(format!(
                "path must use '/' separators: {path}"
            )));
        }

        for segment in path.split('/') {
            match segment {
                "" => {
                    return Err(TypeError::InvalidCanonicalPath(format!(
                        "path has an empty segment: {path}"
                    )))
                }
                "." | ".." => {
                    return Err(TypeError::InvalidCanonicalPath(format!(
                        "path has a relative segment: {path}"
                    )))
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Get the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CanonicalPath {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CanonicalPath> for String {
    fn from(path: CanonicalPath) -> Self {
        path.0
    }
}

impl AsRef<str> for CanonicalPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated Git reference name.
///
/// The lock service scopes locks to the ref they were taken on, so the
/// name is sent verbatim (e.g. `refs/heads/main`).
///
/// # Example
///
/// ```
/// use locksmith::core::types::RefName;
///
/// let refname = RefName::new("refs/heads/feature/foo").unwrap();
/// assert_eq!(refname.strip_prefix("refs/heads/"), Some("feature/foo"));
/// assert!(refname.is_branch_ref());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RefName(String);

impl RefName {
    /// Create a new validated ref name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRefName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Create a ref name for a branch (`refs/heads/<branch>`).
    pub fn for_branch(branch: &str) -> Result<Self, TypeError> {
        Self::new(format!("refs/heads/{branch}"))
    }

    /// Strip a prefix from the ref name and return the remainder.
    pub fn strip_prefix(&self, prefix: &str) -> Option<&str> {
        self.0.strip_prefix(prefix)
    }

    /// Check if this ref is a branch ref.
    pub fn is_branch_ref(&self) -> bool {
        self.0.starts_with("refs/heads/")
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidRefName("ref name cannot be empty".into()));
        }

        if name.starts_with('/') || name.ends_with('/') {
            return Err(TypeError::InvalidRefName(
                "ref name cannot start or end with '/'".into(),
            ));
        }
        if name.ends_with(".lock") {
            return Err(TypeError::InvalidRefName(
                "ref name cannot end with '.lock'".into(),
            ));
        }

        for bad in ["..", "@{", "//"] {
            if name.contains(bad) {
                return Err(TypeError::InvalidRefName(format!(
                    "ref name cannot contain '{bad}'"
                )));
            }
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
            return Err(TypeError::InvalidRefName(format!(
                "ref name cannot contain '{c}'"
            )));
        }

        if name.chars().any(|c| c.is_ascii_control()) {
            return Err(TypeError::InvalidRefName(
                "ref name cannot contain control characters".into(),
            ));
        }

        if name
            .split('/')
            .any(|component| component.starts_with('.') || component.ends_with(".lock"))
        {
            return Err(TypeError::InvalidRefName(
                "path component cannot start with '.' or end with '.lock'".into(),
            ));
        }

        Ok(())
    }

    /// Get the ref name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RefName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RefName> for String {
    fn from(name: RefName) -> Self {
        name.0
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity owning a lock, as reported by the lock service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockOwner {
    pub name: String,
}

/// A lock held by the lock service.
///
/// Records only ever come from the service; this crate displays them and
/// drops them. Field names match the service's JSON so a record printed
/// in `--json` mode parses back into the same value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    /// Service-assigned lock id
    pub id: String,
    /// Locked path, relative to the repository root
    pub path: String,
    /// Owner, if the service reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<LockOwner>,
    /// When the lock was created
    pub locked_at: DateTime<Utc>,
}

impl LockRecord {
    /// Owner name, or `"unknown"` when the service omitted it.
    pub fn owner_name(&self) -> &str {
        self.owner
            .as_ref()
            .map(|o| o.name.as_str())
            .unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod canonical_path {
        use super::*;

        #[test]
        fn accepts_nested_relative_paths() {
            assert!(CanonicalPath::new("a").is_ok());
            assert!(CanonicalPath::new("a/b/c.bin").is_ok());
            assert!(CanonicalPath::new(".gitattributes").is_ok());
            assert!(CanonicalPath::new("dir/..hidden").is_ok());
        }

        #[test]
        fn rejects_empty() {
            assert!(CanonicalPath::new("").is_err());
        }

        #[test]
        fn rejects_absolute() {
            assert!(CanonicalPath::new("/etc/passwd").is_err());
        }

        #[test]
        fn rejects_backslashes() {
            assert!(CanonicalPath::new("foo\\bar").is_err());
        }

        #[test]
        fn rejects_relative_segments() {
            assert!(CanonicalPath::new("../x").is_err());
            assert!(CanonicalPath::new("a/./b").is_err());
            assert!(CanonicalPath::new("a/..").is_err());
        }

        #[test]
        fn rejects_empty_segments() {
            assert!(CanonicalPath::new("a//b").is_err());
            assert!(CanonicalPath::new("a/").is_err());
        }

        #[test]
        fn serde_uses_plain_string() {
            let path = CanonicalPath::new("bar/baz").unwrap();
            let json = serde_json::to_string(&path).unwrap();
            assert_eq!(json, "\"bar/baz\"");

            let invalid: Result<CanonicalPath, _> = serde_json::from_str("\"../x\"");
            assert!(invalid.is_err());
        }
    }

    mod ref_name {
        use super::*;

        #[test]
        fn for_branch() {
            let refname = RefName::for_branch("feature/x").unwrap();
            assert_eq!(refname.as_str(), "refs/heads/feature/x");
            assert!(refname.is_branch_ref());
        }

        #[test]
        fn rejects_invalid() {
            assert!(RefName::new("").is_err());
            assert!(RefName::new("refs/heads/a..b").is_err());
            assert!(RefName::new("refs/heads/a b").is_err());
            assert!(RefName::new("refs/heads/x.lock").is_err());
            assert!(RefName::new("refs/heads/.hidden").is_err());
        }

        #[test]
        fn tags_are_not_branch_refs() {
            let refname = RefName::new("refs/tags/v1").unwrap();
            assert!(!refname.is_branch_ref());
            assert_eq!(refname.strip_prefix("refs/heads/"), None);
        }
    }

    mod lock_record {
        use super::*;

        #[test]
        fn parses_service_json() {
            let json = r#"{
                "id": "42",
                "path": "art/hero.psd",
                "owner": { "name": "Jane Doe" },
                "locked_at": "2016-05-17T15:49:06Z"
            }"#;

            let record: LockRecord = serde_json::from_str(json).unwrap();
            assert_eq!(record.id, "42");
            assert_eq!(record.path, "art/hero.psd");
            assert_eq!(record.owner_name(), "Jane Doe");
        }

        #[test]
        fn owner_is_optional() {
            let json = r#"{"id":"1","path":"a.bin","locked_at":"2020-01-01T00:00:00Z"}"#;
            let record: LockRecord = serde_json::from_str(json).unwrap();
            assert!(record.owner.is_none());
            assert_eq!(record.owner_name(), "unknown");

            let back = serde_json::to_string(&record).unwrap();
            assert!(!back.contains("owner"));
        }
    }
}
