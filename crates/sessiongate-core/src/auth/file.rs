use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use super::store::{TokenStore, TOKEN_KEY};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Token store backed by a small JSON key-value file.
///
/// The file is re-read on every `get`, so a logout performed by another
/// process sharing the directory is observed on the next call. Writers are
/// not coordinated: the last one wins.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store the token in `session.json` under `cache_dir`
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            path: cache_dir.join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .context("Failed to read session file")?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).context("Failed to parse session file")
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create session directory")?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        let mut file = open_private(&self.path).context("Failed to open session file")?;
        file.write_all(contents.as_bytes())
            .context("Failed to write session file")?;
        Ok(())
    }
}

/// Open for writing, readable by the owner only on unix
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    std::os::unix::fs::OpenOptionsExt::mode(&mut options, 0o600);

    let file = options.open(path)?;
    // `mode` only applies on creation; tighten files written by older versions
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(file)
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Result<Option<String>> {
        Ok(self.read_entries()?.remove(TOKEN_KEY))
    }

    fn set(&mut self, token: &str) -> Result<()> {
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(TOKEN_KEY.to_string(), token.to_string());
        self.write_entries(&entries)?;
        debug!(path = ?self.path, "Token saved");
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        // A corrupt file cannot hold a usable token; drop it entirely
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(_) => {
                std::fs::remove_file(&self.path)?;
                return Ok(());
            }
        };
        entries.remove(TOKEN_KEY);
        if entries.is_empty() {
            std::fs::remove_file(&self.path)?;
        } else {
            self.write_entries(&entries)?;
        }
        debug!(path = ?self.path, "Token cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileTokenStore::new(dir.path());
        assert_eq!(store.get().unwrap(), None);

        store.set("tok-1").unwrap();
        let reopened = FileTokenStore::new(dir.path());
        assert_eq!(reopened.get().unwrap().as_deref(), Some("tok-1"));

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"auth_token\""));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SESSION_FILE);
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let mut store = FileTokenStore::new(dir.path());
        store.set("tok").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_file_store_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileTokenStore::new(dir.path());
        store.clear().unwrap();

        store.set("tok").unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.get().unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_observes_other_writer() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = FileTokenStore::new(dir.path());
        let mut b = FileTokenStore::new(dir.path());

        a.set("tok").unwrap();
        b.clear().unwrap();
        assert_eq!(a.get().unwrap(), None);
    }

    #[test]
    fn test_file_store_keeps_unrelated_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SESSION_FILE);
        std::fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let mut store = FileTokenStore::new(dir.path());
        store.set("tok").unwrap();
        store.clear().unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("theme"));
        assert!(!raw.contains("auth_token"));
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "{not json").unwrap();

        let mut store = FileTokenStore::new(dir.path());
        assert!(store.get().is_err());
        store.clear().unwrap();
        assert_eq!(store.get().unwrap(), None);
    }
}
