//! Key/value backends
//!
//! A [`KeyValueStore`] is a synchronous, capacity-limited string store in
//! the shape of a browser's local storage. Capacity is measured in
//! characters of key plus value, summed over every stored entry.
//!
//! Two backends are provided:
//! - [`MemoryStore`]: in-process map, used for tests and as a fallback
//! - [`FileStore`]: one file per key under a directory, written atomically

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;

use super::error::{BackendError, BackendResult};

/// Synchronous key/value store with an optional capacity limit
pub trait KeyValueStore: Send {
    /// Read the value stored under `key`
    fn get_item(&self, key: &str) -> BackendResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// Fails with [`BackendError::QuotaExceeded`] if the store would grow
    /// past its capacity. A failed write leaves the previous value intact.
    fn set_item(&mut self, key: &str, value: &str) -> BackendResult<()>;

    /// Remove `key`. Removing a missing key succeeds.
    fn remove_item(&mut self, key: &str) -> BackendResult<()>;

    /// All keys currently held by the store
    fn keys(&self) -> BackendResult<Vec<String>>;
}

/// Size of one entry as counted against a store's capacity
pub fn entry_size(key: &str, value: &str) -> usize {
    key.chars().count() + value.chars().count()
}

fn check_capacity(
    capacity: Option<usize>,
    used_elsewhere: usize,
    key: &str,
    value: &str,
) -> BackendResult<()> {
    let Some(capacity) = capacity else {
        return Ok(());
    };
    let required = entry_size(key, value);
    let available = capacity.saturating_sub(used_elsewhere);
    if required > available {
        return Err(BackendError::QuotaExceeded {
            key: key.to_string(),
            required,
            available,
        });
    }
    Ok(())
}

// ==================== MemoryStore ====================

/// In-memory key/value store
///
/// All data is lost when the store is dropped. A store can be switched
/// off with [`MemoryStore::set_available`] to mimic a host that refuses
/// storage access.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    capacity: Option<usize>,
    available: bool,
}

impl MemoryStore {
    /// Create an unbounded store
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            capacity: None,
            available: true,
        }
    }

    /// Create a store holding at most `capacity` characters
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::new()
        }
    }

    /// Enable or disable every operation on the store
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Characters currently in use
    pub fn used(&self) -> usize {
        self.entries.iter().map(|(k, v)| entry_size(k, v)).sum()
    }

    fn ensure_available(&self) -> BackendResult<()> {
        if self.available {
            Ok(())
        } else {
            Err(BackendError::Unavailable {
                reason: "storage access is disabled".to_string(),
            })
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> BackendResult<Option<String>> {
        self.ensure_available()?;
        Ok(self.entries.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> BackendResult<()> {
        self.ensure_available()?;
        let existing = self.entries.get(key).map_or(0, |v| entry_size(key, v));
        check_capacity(self.capacity, self.used() - existing, key, value)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> BackendResult<()> {
        self.ensure_available()?;
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> BackendResult<Vec<String>> {
        self.ensure_available()?;
        Ok(self.entries.keys().cloned().collect())
    }
}

// ==================== FileStore ====================

/// Directory-backed key/value store
///
/// Each key is a file named after the key. Writes go to a hidden temp file
/// and are renamed into place, so a value is never left half-written.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    capacity: Option<usize>,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>, capacity: Option<usize>) -> BackendResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| BackendError::from_io(e, dir.clone()))?;
        Ok(Self { dir, capacity })
    }

    /// Open the store described by the configuration
    pub fn from_config(config: &Config) -> BackendResult<Self> {
        Self::open(config.store_dir(), Some(config.quota))
    }

    /// Directory the store lives in
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> BackendResult<PathBuf> {
        if !is_valid_key(key) {
            return Err(BackendError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.dir.join(key))
    }

    fn used_except(&self, skip: &str) -> BackendResult<usize> {
        let mut total = 0;
        for key in self.keys()? {
            if key == skip {
                continue;
            }
            if let Some(value) = self.get_item(&key)? {
                total += entry_size(&key, &value);
            }
        }
        Ok(total)
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> BackendResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BackendError::ReadError { path, source: e }),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> BackendResult<()> {
        let path = self.path_for(key)?;
        if self.capacity.is_some() {
            let used = self.used_except(key)?;
            check_capacity(self.capacity, used, key, value)?;
        }
        atomic_write(&path, value.as_bytes())
    }

    fn remove_item(&mut self, key: &str) -> BackendResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BackendError::from_io(e, path)),
        }
    }

    fn keys(&self) -> BackendResult<Vec<String>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| BackendError::ReadError {
            path: self.dir.clone(),
            source: e,
        })?;

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| BackendError::ReadError {
                path: self.dir.clone(),
                source: e,
            })?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                // Temp files are hidden and fail validation
                if is_valid_key(name) {
                    keys.push(name.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Write data to a file atomically
///
/// 1. Write to a hidden temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> BackendResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BackendError::from_io(e, parent.to_path_buf()))?;
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("value");
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let result = (|| -> io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(BackendError::from_io(e, path.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_entry_size_counts_characters() {
        assert_eq!(entry_size("ab", "cde"), 5);
        // Multi-byte characters count once
        assert_eq!(entry_size("k", "दिल"), 4);
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get_item("a").unwrap(), None);

        store.set_item("a", "one").unwrap();
        assert_eq!(store.get_item("a").unwrap(), Some("one".to_string()));

        store.set_item("a", "two").unwrap();
        assert_eq!(store.get_item("a").unwrap(), Some("two".to_string()));
        assert_eq!(store.keys().unwrap(), vec!["a".to_string()]);
    }

    #[test]
    fn test_memory_store_remove_is_idempotent() {
        let mut store = MemoryStore::new();
        store.set_item("a", "one").unwrap();
        store.remove_item("a").unwrap();
        store.remove_item("a").unwrap();
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_memory_store_quota() {
        let mut store = MemoryStore::with_capacity(10);
        store.set_item("k", "12345").unwrap();
        assert_eq!(store.used(), 6);

        let err = store.set_item("x", "123456").unwrap_err();
        assert!(matches!(err, BackendError::QuotaExceeded { .. }));
        assert!(store.get_item("x").unwrap().is_none());

        // Replacing an entry only counts the difference
        store.set_item("k", "123456789").unwrap();
        assert_eq!(store.used(), 10);
    }

    #[test]
    fn test_memory_store_unavailable() {
        let mut store = MemoryStore::new();
        store.set_available(false);

        assert!(matches!(
            store.set_item("a", "b"),
            Err(BackendError::Unavailable { .. })
        ));
        assert!(store.get_item("a").is_err());
        assert!(store.keys().is_err());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileStore::open(temp_dir.path().join("store"), None).unwrap();

        assert_eq!(store.get_item("shayari_theme").unwrap(), None);
        store.set_item("shayari_theme", "\"dark\"").unwrap();
        assert_eq!(
            store.get_item("shayari_theme").unwrap(),
            Some("\"dark\"".to_string())
        );

        // Survives reopening
        let reopened = FileStore::open(temp_dir.path().join("store"), None).unwrap();
        assert_eq!(reopened.keys().unwrap(), vec!["shayari_theme".to_string()]);
    }

    #[test]
    fn test_file_store_remove_missing_key() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileStore::open(temp_dir.path(), None).unwrap();
        store.remove_item("never_written").unwrap();
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileStore::open(temp_dir.path(), None).unwrap();

        for key in ["../escape", ".hidden", "", "a/b"] {
            assert!(matches!(
                store.set_item(key, "v"),
                Err(BackendError::InvalidKey { .. })
            ));
        }
    }

    #[test]
    fn test_file_store_quota_keeps_previous_value() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileStore::open(temp_dir.path(), Some(20)).unwrap();

        store.set_item("key", "small").unwrap();
        let err = store.set_item("key", "x".repeat(30).as_str()).unwrap_err();
        assert!(err.is_capacity_exhausted());
        assert_eq!(store.get_item("key").unwrap(), Some("small".to_string()));
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileStore::open(temp_dir.path(), None).unwrap();
        store.set_item("a", "1").unwrap();

        let names: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["a".to_string()]);
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("a").join("b").join("file.txt");

        atomic_write(&nested_path, b"test data").unwrap();

        let content = fs::read_to_string(&nested_path).unwrap();
        assert_eq!(content, "test data");
    }
}
