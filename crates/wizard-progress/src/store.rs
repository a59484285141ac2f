//! Key-value persistence media
//!
//! The adapter only needs synchronous `get`/`set` with a quota failure mode,
//! the contract of browser session storage.

use crate::error::StoreError;
use dashmap::DashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Synchronous string key-value store
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `Ok(None)` when absent
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Delete a value; absent keys are not an error
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// In-process store with an optional byte quota
///
/// Usage is counted as key plus value bytes across all entries.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// Unbounded store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store refusing writes beyond `quota` bytes
    #[inline]
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: DashMap::new(),
            quota: Some(quota),
        }
    }

    /// Bytes currently used
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.key().len() + e.value().len())
            .sum()
    }

    /// Number of keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        if let Some(quota) = self.quota {
            let replaced = self
                .entries
                .get(key)
                .map_or(0, |v| key.len() + v.value().len());
            let required = self.used_bytes().saturating_sub(replaced) + key.len() + value.len();
            if required > quota {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    required,
                    quota,
                });
            }
        }
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Directory-backed store, one `<key>.json` file per entry
///
/// Bytes of the key outside `[A-Za-z0-9_-]` are percent-encoded in the file
/// name, so any non-empty key maps to a single file directly under the root.
/// Survives process restarts. Writes go to a temporary file that is renamed
/// into place, so a reader never sees a half-written entry.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Store rooted at `root`; the directory is created on first write
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.json", encode_key(key))))
    }
}

fn encode_key(key: &str) -> String {
    use std::fmt::Write;

    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-') {
            encoded.push(char::from(byte));
        } else {
            let _ = write!(encoded, "%{byte:02X}");
        }
    }
    encoded
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io_error(path, e)),
        }
    }

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root).map_err(|e| StoreError::io_error(&self.root, e))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| StoreError::io_error(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::io_error(&path, e))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io_error(path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v".to_string()).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn memory_store_quota() {
        let store = MemoryStore::with_quota(10);
        store.set("ab", "12345678".to_string()).unwrap();
        assert_eq!(store.used_bytes(), 10);

        let err = store.set("c", "x".to_string()).unwrap_err();
        assert!(err.is_quota_exceeded());

        // Replacing an entry only counts the difference
        store.set("ab", "1234".to_string()).unwrap();
        store.set("c", "x".to_string()).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("progress"));

        assert_eq!(store.get("dealwizard_progress_1").unwrap(), None);
        store.set("dealwizard_progress_1", "{}".to_string()).unwrap();
        assert_eq!(store.get("dealwizard_progress_1").unwrap().as_deref(), Some("{}"));

        // Survives a fresh handle over the same directory
        let reopened = FileStore::new(store.root());
        assert!(reopened.get("dealwizard_progress_1").unwrap().is_some());

        reopened.remove("dealwizard_progress_1").unwrap();
        reopened.remove("dealwizard_progress_1").unwrap();
        assert_eq!(store.get("dealwizard_progress_1").unwrap(), None);
    }

    #[test]
    fn file_store_encodes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("progress"));

        for key in ["dealwizard_progress_deal 42", "../escape", ".hidden", "deal/é"] {
            store.set(key, key.to_string()).unwrap();
            assert_eq!(store.get(key).unwrap().as_deref(), Some(key));
        }

        let mut names: Vec<_> = fs::read_dir(store.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(
            names,
            [
                "%2E%2E%2Fescape.json",
                "%2Ehidden.json",
                "deal%2F%C3%A9.json",
                "dealwizard_progress_deal%2042.json",
            ]
        );
        assert!(!dir.path().join("escape.json").exists());
    }

    #[test]
    fn file_store_rejects_empty_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(store.get(""), Err(StoreError::InvalidKey(_))));
        assert!(matches!(store.set("", "x".into()), Err(StoreError::InvalidKey(_))));
    }

    #[test]
    fn memory_store_quota_counts_after_concurrent_remove() {
        let store = Arc::new(MemoryStore::with_quota(16));
        store.set("a", "1234".to_string()).unwrap();

        let writers: Vec<_> = (0..4)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        if i % 2 == 0 {
                            store.remove("a").unwrap();
                        } else {
                            let _ = store.set("a", "1234".to_string());
                        }
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }
        assert!(store.used_bytes() <= 16);
    }
}
