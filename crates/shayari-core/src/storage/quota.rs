//! Store-full detection
//!
//! The guard only reports. It never evicts or deletes anything to make
//! room; the user is expected to export and prune the collection.

use tracing::warn;

use crate::signal::Observers;

use super::error::BackendError;

/// Message shown to users when the store runs out of room
pub const STORAGE_FULL_MESSAGE: &str = "Storage full! Please export your data to free up space.";

/// Advisory signal emitted when a write was rejected for lack of space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageFullWarning {
    /// Key whose write was rejected
    pub key: String,
    /// Backend's description of the failure
    pub detail: String,
}

impl StorageFullWarning {
    pub fn message(&self) -> &'static str {
        STORAGE_FULL_MESSAGE
    }
}

/// Notifies registered observers about capacity exhaustion
#[derive(Debug, Default)]
pub struct QuotaGuard {
    observers: Observers<StorageFullWarning>,
}

impl QuotaGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for [`StorageFullWarning`]
    pub fn on_storage_full(&mut self, handler: impl Fn(&StorageFullWarning) + Send + Sync + 'static) {
        self.observers.subscribe(handler);
    }

    /// Emit exactly one warning for a rejected write of `key`
    pub fn report(&self, key: &str, error: &BackendError) {
        warn!("Storage quota exceeded while saving '{}': {}", key, error);
        let warning = StorageFullWarning {
            key: key.to_string(),
            detail: error.to_string(),
        };
        self.observers.emit(&warning);
    }
}
