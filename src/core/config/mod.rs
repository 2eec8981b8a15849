//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! locksmith has two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level settings
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$LOCKSMITH_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/locksmith/config.toml`
//! 3. `~/.locksmith/config.toml`
//!
//! # Repo Config Location
//!
//! `<git_dir>/locksmith/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use locksmith::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/repo/.git"))).unwrap();
//! if let Some(remote) = config.remote() {
//!     println!("Locks go to remote: {}", remote);
//! }
//! ```

pub mod schema;

pub use schema::{GlobalConfig, RepoConfig, SecretsConfig};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::secrets;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Merged configuration from all sources.
///
/// Accessor methods apply precedence rules automatically.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Repository configuration (if in a repo and present)
    pub repo: Option<RepoConfig>,
    global_path: Option<PathBuf>,
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `git_dir` is provided, also loads the repo config stored under it.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or
    /// hold invalid values. Missing files are not an error.
    pub fn load(git_dir: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(Self::find_global(), git_dir)
    }

    /// Load configuration from an explicit global config path.
    pub fn load_from(
        global_path: Option<PathBuf>,
        git_dir: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let global = match &global_path {
            Some(path) if path.exists() => read_toml::<GlobalConfig>(path)?,
            _ => GlobalConfig::default(),
        };

        let repo_path = git_dir
            .map(Self::repo_config_path)
            .filter(|path| path.exists());
        let repo = match &repo_path {
            Some(path) => Some(read_toml::<RepoConfig>(path)?),
            None => None,
        };

        global.validate()?;
        if let Some(ref r) = repo {
            r.validate()?;
        }

        Ok(Config {
            global,
            repo,
            global_path: global_path.filter(|p| p.exists()),
            repo_path,
        })
    }

    /// Build a config holding only repo-scoped values.
    pub fn from_repo(repo: RepoConfig) -> Self {
        Config {
            repo: Some(repo),
            ..Default::default()
        }
    }

    /// Find the global config file, if any exists.
    fn find_global() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("LOCKSMITH_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("locksmith/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".locksmith/config.toml"))
            .filter(|path| path.exists())
    }

    /// Get the canonical path for repo config under a `.git` directory.
    pub fn repo_config_path(git_dir: &Path) -> PathBuf {
        git_dir.join("locksmith/config.toml")
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Remote configured for this repository, if any.
    pub fn remote(&self) -> Option<&str> {
        self.repo.as_ref().and_then(|r| r.remote.as_deref())
    }

    /// Lock service endpoint configured for this repository, if any.
    pub fn lfs_url(&self) -> Option<&str> {
        self.repo.as_ref().and_then(|r| r.lfs_url.as_deref())
    }

    /// Whether JSON output is the default.
    ///
    /// Defaults to `false`.
    pub fn json(&self) -> bool {
        self.global.json.unwrap_or(false)
    }

    /// Get the secrets provider.
    ///
    /// Defaults to [`secrets::DEFAULT_PROVIDER`] if not configured.
    pub fn secrets_provider(&self) -> &str {
        self.global
            .secrets
            .as_ref()
            .and_then(|s| s.provider.as_deref())
            .unwrap_or(secrets::DEFAULT_PROVIDER)
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded repo config file.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
