//! secrets
//!
//! Credential storage for lock service tokens.
//!
//! # Architecture
//!
//! Secrets go through the [`SecretStore`] trait. The only provider today is
//! [`FileSecretStore`], which keeps tokens in `~/.locksmith/secrets.toml`.
//!
//! Tokens are keyed per lock service host (`lfs.<host>`, see
//! [`secret_key`]). The `LOCKSMITH_TOKEN` environment variable takes
//! precedence over anything stored.
//!
//! # Example
//!
//! ```ignore
//! use locksmith::secrets::{create_store, secret_key, SecretStore};
//!
//! let store = create_store("file")?;
//! store.set(&secret_key("lfs.example.com"), "token")?;
//! ```

mod file_store;
mod traits;

pub use file_store::FileSecretStore;
pub use traits::{SecretError, SecretStore};

/// The default secret store provider name.
pub const DEFAULT_PROVIDER: &str = "file";

/// Environment variable that overrides the stored token.
pub const TOKEN_ENV: &str = "LOCKSMITH_TOKEN";

/// Create a secret store based on the provider name.
///
/// # Errors
///
/// Returns `ProviderNotAvailable` for unknown providers, or the store's
/// own initialization error.
pub fn create_store(provider: &str) -> Result<Box<dyn SecretStore>, SecretError> {
    match provider {
        "file" => Ok(Box::new(FileSecretStore::new()?)),
        other => Err(SecretError::ProviderNotAvailable(format!(
            "unknown secret provider: '{}' (valid: file)",
            other
        ))),
    }
}

/// Store key for the token of a lock service host.
pub fn secret_key(host: &str) -> String {
    format!("lfs.{}", host.to_ascii_lowercase())
}

/// Look up the token for `host`.
///
/// A non-empty `LOCKSMITH_TOKEN` wins over the store.
pub fn lookup_token(store: &dyn SecretStore, host: &str) -> Result<Option<String>, SecretError> {
    if let Ok(token) = std::env::var(TOKEN_ENV) {
        if !token.is_empty() {
            return Ok(Some(token));
        }
    }
    store.get(&secret_key(host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider() {
        match create_store("keychain") {
            Err(SecretError::ProviderNotAvailable(msg)) => assert!(msg.contains("keychain")),
            Err(e) => panic!("unexpected error type: {:?}", e),
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn secret_key_is_namespaced_and_lowercased() {
        assert_eq!(secret_key("LFS.Example.com"), "lfs.lfs.example.com");
        assert_eq!(secret_key("git.example.org"), "lfs.git.example.org");
    }

    #[test]
    fn lookup_reads_store() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = FileSecretStore::with_path(temp.path().join("secrets.toml"));
        store.set(&secret_key("git.example.org"), "stored").unwrap();

        // Only meaningful when the override is not set in the test environment.
        if std::env::var(TOKEN_ENV).is_err() {
            assert_eq!(
                lookup_token(&store, "git.example.org").unwrap().as_deref(),
                Some("stored")
            );
            assert!(lookup_token(&store, "other.example.org").unwrap().is_none());
        }
    }
}
