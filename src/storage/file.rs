//! File-backed storage: one `<key>.json` file per key in a data directory.

use std::{fs, io, path::PathBuf};

use tracing::debug;

use crate::storage::{KeyValueStore, StorageError};

/// Durable store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Store files under `root`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();

        fs::create_dir_all(&root).map_err(|err| StorageError::Io(root.display().to_string(), err))?;

        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Io(key.to_string(), err)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let staging = path.with_extension("json.tmp");

        // Write then rename so a crash never leaves a half-written slot.
        fs::write(&staging, value).map_err(|err| StorageError::Io(key.to_string(), err))?;
        fs::rename(&staging, &path).map_err(|err| StorageError::Io(key.to_string(), err))?;

        debug!(key, bytes = value.len(), "slot written");

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Io(key.to_string(), err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn values_survive_reopening() -> TestResult {
        let dir = tempfile::tempdir()?;

        FileStore::open(dir.path())?.set("cart", "[]")?;

        let reopened = FileStore::open(dir.path())?;

        assert_eq!(reopened.get("cart")?, Some("[]".to_string()));
        assert!(dir.path().join("cart.json").exists());

        Ok(())
    }

    #[test]
    fn missing_key_reads_as_none_and_removes_cleanly() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileStore::open(dir.path().join("nested"))?;

        assert_eq!(store.get("user")?, None);
        store.remove("user")?;

        Ok(())
    }

    #[test]
    fn rejects_path_like_keys() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileStore::open(dir.path())?;

        assert!(matches!(
            store.set("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));

        Ok(())
    }
}
