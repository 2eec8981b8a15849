//! secrets::file_store
//!
//! File-based secret storage in `~/.locksmith/secrets.toml`.
//!
//! The file is created with 0600 permissions on Unix and every write goes
//! through a temp file followed by a rename.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use super::traits::{SecretError, SecretStore};

/// Secret store backed by a TOML table of `key = "value"` pairs.
#[derive(Debug)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    /// Open the store at `~/.locksmith/secrets.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, SecretError> {
        let home = dirs::home_dir()
            .ok_or_else(|| SecretError::ReadError("cannot determine home directory".into()))?;
        Ok(Self::with_path(home.join(".locksmith").join("secrets.toml")))
    }

    /// Open a store at a custom path.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path to the secrets file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, SecretError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| SecretError::ReadError(format!("cannot read secrets file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SecretError::ReadError(format!("cannot parse secrets file: {}", e)))
    }

    fn save(&self, secrets: &BTreeMap<String, String>) -> Result<(), SecretError> {
        let write_err = |what: &str, e: std::io::Error| {
            SecretError::WriteError(format!("cannot {}: {}", what, e))
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| write_err("create directory", e))?;
        }

        let content = toml::to_string_pretty(secrets)
            .map_err(|e| SecretError::WriteError(format!("cannot serialize secrets: {}", e)))?;

        let temp_path = self.path.with_extension("tmp");
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&temp_path)
            .map_err(|e| write_err("create temp file", e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| write_err("write secrets", e))?;
        file.sync_all().map_err(|e| write_err("sync to disk", e))?;
        drop(file);

        fs::rename(&temp_path, &self.path).map_err(|e| write_err("rename temp file", e))
    }
}

impl SecretStore for FileSecretStore {
    fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SecretError> {
        let mut secrets = self.load()?;
        secrets.insert(key.to_string(), value.to_string());
        self.save(&secrets)
    }

    fn delete(&self, key: &str) -> Result<(), SecretError> {
        let mut secrets = self.load()?;
        if secrets.remove(key).is_none() {
            return Ok(());
        }
        self.save(&secrets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileSecretStore) {
        let temp = TempDir::new().expect("create temp dir");
        let store = FileSecretStore::with_path(temp.path().join("secrets.toml"));
        (temp, store)
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let (_temp, store) = store();
        assert!(store.get("lfs.example.com").unwrap().is_none());
        assert!(!store.exists("lfs.example.com").unwrap());
    }

    #[test]
    fn set_get_overwrite() {
        let (_temp, store) = store();
        store.set("lfs.example.com", "one").unwrap();
        store.set("lfs.example.com", "two").unwrap();
        store.set("lfs.other.org", "three").unwrap();

        assert_eq!(store.get("lfs.example.com").unwrap().as_deref(), Some("two"));
        assert_eq!(store.get("lfs.other.org").unwrap().as_deref(), Some("three"));
    }

    #[test]
    fn delete_is_idempotent() {
        let (_temp, store) = store();
        store.set("lfs.example.com", "token").unwrap();
        store.delete("lfs.example.com").unwrap();
        store.delete("lfs.example.com").unwrap();
        assert!(store.get("lfs.example.com").unwrap().is_none());
    }

    #[test]
    fn creates_parent_directory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("secrets.toml");
        let store = FileSecretStore::with_path(path.clone());

        store.set("k", "v").unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp, store) = store();
        store.set("k", "v").unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn corrupt_file_is_a_read_error() {
        let (_temp, store) = store();
        fs::write(store.path(), "token = [unclosed").unwrap();
        assert!(matches!(
            store.get("token").unwrap_err(),
            SecretError::ReadError(_)
        ));
    }

    #[test]
    fn values_with_special_characters_survive() {
        let (_temp, store) = store();
        let value = "tok\"en = with\nnewline";
        store.set("lfs.example.com", value).unwrap();
        assert_eq!(store.get("lfs.example.com").unwrap().as_deref(), Some(value));
    }
}
