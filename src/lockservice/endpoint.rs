//! lockservice::endpoint
//!
//! Lock service endpoint discovery.
//!
//! # Precedence
//!
//! 1. Repo config `lfs_url`
//! 2. Git config `remote.<name>.lfsurl`
//! 3. Git config `lfs.url`
//! 4. Derived from the remote URL
//!
//! # Derivation
//!
//! | Remote URL                          | Endpoint                                   |
//! |-------------------------------------|--------------------------------------------|
//! | `https://host/team/repo`            | `https://host/team/repo.git/info/lfs`      |
//! | `https://host/team/repo.git`        | `https://host/team/repo.git/info/lfs`      |
//! | `git@host:team/repo.git`            | `https://host/team/repo.git/info/lfs`      |
//! | `ssh://git@host:2222/team/repo.git` | `https://host/team/repo.git/info/lfs`      |
//!
//! Local and `file://` remotes have no lock service.

use reqwest::Url;
use thiserror::Error;

use crate::core::config::Config;
use crate::git::{GitError, RepositoryContext};

/// Errors from endpoint discovery.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("remote '{remote}' is not configured")]
    UnknownRemote { remote: String },

    #[error("cannot determine lock service for remote URL '{url}'")]
    UnsupportedUrl { url: String },

    #[error(transparent)]
    Git(#[from] GitError),
}

/// Find the lock service endpoint for `remote`.
pub fn discover(
    repo: &dyn RepositoryContext,
    config: &Config,
    remote: &str,
) -> Result<String, EndpointError> {
    if let Some(url) = config.lfs_url() {
        return Ok(trim_endpoint(url));
    }

    for key in [format!("remote.{}.lfsurl", remote), "lfs.url".to_string()] {
        if let Some(url) = repo.config_string(&key)? {
            if !url.trim().is_empty() {
                return Ok(trim_endpoint(&url));
            }
        }
    }

    let url = repo
        .remote_url(remote)?
        .ok_or_else(|| EndpointError::UnknownRemote {
            remote: remote.to_string(),
        })?;

    derive_from_remote_url(&url).ok_or(EndpointError::UnsupportedUrl { url })
}

fn trim_endpoint(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Derive the lock service endpoint from a git remote URL.
///
/// # Example
///
/// ```
/// use locksmith::lockservice::endpoint::derive_from_remote_url;
///
/// assert_eq!(
///     derive_from_remote_url("git@example.com:team/assets.git").as_deref(),
///     Some("https://example.com/team/assets.git/info/lfs")
/// );
/// assert_eq!(derive_from_remote_url("/srv/git/assets.git"), None);
/// ```
pub fn derive_from_remote_url(url: &str) -> Option<String> {
    let url = url.trim();
    let base = match Url::parse(url) {
        Ok(parsed) => match parsed.scheme() {
            "http" | "https" => {
                let host = parsed.host_str()?;
                let authority = match parsed.port() {
                    Some(port) => format!("{}:{}", host, port),
                    None => host.to_string(),
                };
                format!("{}://{}{}", parsed.scheme(), authority, parsed.path())
            }
            "ssh" | "git+ssh" | "ssh+git" => {
                format!("https://{}{}", parsed.host_str()?, parsed.path())
            }
            "file" => return None,
            // `host:path` parses as a URL whose scheme is the host.
            _ => scp_to_https(url)?,
        },
        Err(_) => scp_to_https(url)?,
    };

    let base = base.trim_end_matches('/');
    if base.ends_with(".git") {
        Some(format!("{}/info/lfs", base))
    } else {
        Some(format!("{}.git/info/lfs", base))
    }
}

/// `[user@]host:path` to `https://host/path`.
fn scp_to_https(url: &str) -> Option<String> {
    let (authority, path) = url.split_once(':')?;
    let host = authority.rsplit('@').next()?;

    // Single letters are Windows drives, slashes mean a local path.
    if host.len() < 2 || host.contains('/') || path.is_empty() || path.starts_with('\\') {
        return None;
    }

    Some(format!("https://{}/{}", host, path.trim_start_matches('/')))
}

/// Host name of an endpoint URL, used to key stored credentials.
pub fn endpoint_host(endpoint: &str) -> Option<String> {
    Url::parse(endpoint)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}
