//! Storage layer
//!
//! Persists the collection and settings in a synchronous, quota-limited
//! key/value store.
//!
//! ## Architecture
//!
//! - **Backend**: raw string store ([`MemoryStore`] or [`FileStore`])
//! - **PersistentStore**: JSON values on top of a backend, with failure
//!   collapsed into boolean/default results
//! - **QuotaGuard**: tells observers when a write hit the capacity limit

pub mod backend;
pub mod error;
pub mod persistent;
pub mod quota;

pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use error::{BackendError, BackendResult};
pub use persistent::{PersistentStore, COLLECTION_KEY, FILTER_KEY, THEME_KEY};
pub use quota::{QuotaGuard, StorageFullWarning, STORAGE_FULL_MESSAGE};
