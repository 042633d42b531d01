//! Typed persistence over a key/value backend
//!
//! Every value is stored as JSON text. Failures never propagate: writes
//! report `false`, reads fall back to the caller's default. The store is a
//! convenience, and the application keeps working in memory without it.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::config::Config;

use super::backend::{entry_size, FileStore, KeyValueStore, MemoryStore};
use super::error::{BackendError, BackendResult};
use super::quota::{QuotaGuard, StorageFullWarning};

/// Key holding the ordered collection
pub const COLLECTION_KEY: &str = "shayari_collection";
/// Key holding the active category filter
pub const FILTER_KEY: &str = "shayari_filter";
/// Key holding the theme preference
pub const THEME_KEY: &str = "shayari_theme";

const PROBE_KEY: &str = "__storage_test__";

/// JSON persistence with availability probing and quota reporting
pub struct PersistentStore {
    backend: Box<dyn KeyValueStore>,
    quota: QuotaGuard,
}

impl PersistentStore {
    /// Wrap an existing backend
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            quota: QuotaGuard::new(),
        }
    }

    /// Unbounded in-memory store
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Open the file-backed store described by the configuration
    pub fn open(config: &Config) -> BackendResult<Self> {
        let backend = FileStore::from_config(config)?;
        debug!("Opened file store at {:?}", backend.dir());
        Ok(Self::new(backend))
    }

    /// Register a handler for rejected writes caused by a full store
    pub fn on_storage_full(&mut self, handler: impl Fn(&StorageFullWarning) + Send + Sync + 'static) {
        self.quota.on_storage_full(handler);
    }

    /// Probe the backend by writing and removing a sentinel key
    ///
    /// A store that rejects the probe only because it is full still counts
    /// as available.
    pub fn is_available(&mut self) -> bool {
        match self.backend.set_item(PROBE_KEY, PROBE_KEY) {
            Ok(()) => self.backend.remove_item(PROBE_KEY).is_ok(),
            Err(e) if e.is_capacity_exhausted() => true,
            Err(e) => {
                debug!("Storage probe failed: {}", e);
                false
            }
        }
    }

    /// Serialize `value` and store it under `key`
    ///
    /// Returns `false` on any failure. When the failure is capacity
    /// exhaustion, the storage-full observers are notified once.
    pub fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> bool {
        if !self.is_available() {
            warn!("Storage is not available. '{}' will not persist.", key);
            return false;
        }

        let serialized = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to serialize '{}': {}", key, e);
                return false;
            }
        };

        match self.backend.set_item(key, &serialized) {
            Ok(()) => true,
            Err(e) => {
                self.report_write_failure(key, &e);
                false
            }
        }
    }

    /// Load and deserialize the value under `key`
    ///
    /// Missing keys, an unavailable backend, and corrupt stored text all
    /// yield `default`.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let text = match self.backend.get_item(key) {
            Ok(Some(text)) => text,
            Ok(None) => return default,
            Err(e) => {
                warn!("Failed to read '{}' from storage: {}", key, e);
                return default;
            }
        };

        match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                error!("Stored value for '{}' is corrupt, using default: {}", key, e);
                default
            }
        }
    }

    /// Delete `key`. Deleting a missing key succeeds.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.backend.remove_item(key) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to remove '{}' from storage: {}", key, e);
                false
            }
        }
    }

    /// Characters used by every stored key and value
    pub fn size(&self) -> usize {
        let keys = match self.backend.keys() {
            Ok(keys) => keys,
            Err(e) => {
                debug!("Cannot measure storage: {}", e);
                return 0;
            }
        };

        keys.iter()
            .filter_map(|key| match self.backend.get_item(key) {
                Ok(Some(value)) => Some(entry_size(key, &value)),
                _ => None,
            })
            .sum()
    }

    fn report_write_failure(&self, key: &str, error: &BackendError) {
        if error.is_capacity_exhausted() {
            self.quota.report(key, error);
        } else {
            error!("Error saving '{}' to storage: {}", key, error);
        }
    }
}

impl std::fmt::Debug for PersistentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentStore")
            .field("quota", &self.quota)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        count: u32,
    }

    fn unavailable_store() -> PersistentStore {
        let mut backend = MemoryStore::new();
        backend.set_available(false);
        PersistentStore::new(backend)
    }

    #[test]
    fn test_save_and_load() {
        let mut store = PersistentStore::in_memory();
        let sample = Sample {
            name: "ghazal".to_string(),
            count: 3,
        };

        assert!(store.save("sample", &sample));
        let loaded: Option<Sample> = store.load("sample", None);
        assert_eq!(loaded, Some(sample));
    }

    #[test]
    fn test_load_missing_returns_default() {
        let store = PersistentStore::in_memory();
        assert_eq!(store.load(FILTER_KEY, "all".to_string()), "all");
    }

    #[test]
    fn test_load_corrupt_returns_default() {
        let mut backend = MemoryStore::new();
        backend.set_item(FILTER_KEY, "{not json").unwrap();
        let store = PersistentStore::new(backend);

        assert_eq!(store.load(FILTER_KEY, "all".to_string()), "all");
    }

    #[test]
    fn test_probe_leaves_no_trace() {
        let mut store = PersistentStore::in_memory();
        assert!(store.is_available());
        assert_eq!(store.size(), 0);
    }

    #[test]
    fn test_unavailable_store_never_panics() {
        let mut store = unavailable_store();

        assert!(!store.is_available());
        assert!(!store.save("key", &1));
        assert_eq!(store.load("key", 42), 42);
        assert!(!store.remove("key"));
        assert_eq!(store.size(), 0);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = PersistentStore::in_memory();
        assert!(store.save(THEME_KEY, "dark"));
        assert!(store.remove(THEME_KEY));
        assert!(store.remove(THEME_KEY));
        assert_eq!(store.load(THEME_KEY, "light".to_string()), "light");
    }

    #[test]
    fn test_size_counts_keys_and_values() {
        let mut store = PersistentStore::in_memory();
        // Stored as "\"dark\"" (6 characters) under a 13-character key
        assert!(store.save(THEME_KEY, "dark"));
        assert_eq!(store.size(), THEME_KEY.len() + 6);
    }

    #[test]
    fn test_quota_exceeded_returns_false_and_warns_once() {
        let mut store = PersistentStore::new(MemoryStore::with_capacity(64));
        let warnings = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&warnings);
        store.on_storage_full(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(store.save("small", "ok"));
        assert!(!store.save("big", &"x".repeat(200)));
        assert_eq!(warnings.load(Ordering::SeqCst), 1);

        assert!(!store.save("big", &"y".repeat(200)));
        assert_eq!(warnings.load(Ordering::SeqCst), 2);

        // The earlier value is untouched
        assert_eq!(store.load("small", String::new()), "ok");
    }

    #[test]
    fn test_full_store_is_still_available() {
        let mut store = PersistentStore::new(MemoryStore::with_capacity(8));
        assert!(store.save("k", "abcd"));
        assert!(store.is_available());
    }

    #[test]
    fn test_unavailable_store_does_not_signal_storage_full() {
        let mut store = unavailable_store();
        let warnings = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&warnings);
        store.on_storage_full(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!store.save("key", "value"));
        assert_eq!(warnings.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_file_backed_store() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            quota: 1024,
        };

        {
            let mut store = PersistentStore::open(&config).unwrap();
            assert!(store.save(FILTER_KEY, "love"));
        }

        let store = PersistentStore::open(&config).unwrap();
        assert_eq!(store.load(FILTER_KEY, "all".to_string()), "love");
        assert!(config.store_dir().join(FILTER_KEY).exists());
    }
}
