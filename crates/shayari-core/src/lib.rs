//! Shayari Core Library
//!
//! This crate provides the local persistence layer for Shayari, a personal
//! collection of short poems (shayari) kept on the user's own machine.
//!
//! # Architecture
//!
//! - **Storage**: a quota-limited key/value store holding JSON values
//! - **Repository**: the in-memory collection, mirrored to storage after
//!   every mutation
//!
//! Queries are served from memory; storage is read only on load.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut repo = CollectionRepository::open(PersistentStore::open(&config)?);
//!
//! // Add an item
//! repo.create(&ItemDraft::new("Dawn", "Wait for the light", "hope"))?;
//!
//! // Back up and restore
//! let json = ExportService::new(&repo).export_json()?;
//! let report = ImportService::new(&mut repo).import(&json)?;
//! ```
//!
//! # Modules
//!
//! - `repository`: collection CRUD, filtering, settings (main entry point)
//! - `models`: items, drafts and the theme preference
//! - `import` / `export`: portable JSON snapshots
//! - `storage`: key/value backends and the quota guard
//! - `signal`: observer lists for warnings
//! - `config`: application configuration

pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod repository;
pub mod signal;
pub mod storage;

pub use config::Config;
pub use error::{Result, ShayariError};
pub use export::{ExportService, ExportSnapshot, FORMAT_VERSION};
pub use import::{ImportService, MergeReport};
pub use models::{CollectionStats, Item, ItemDraft, Theme, ALL_CATEGORIES};
pub use repository::{CollectionRepository, Outcome, PersistenceWarning, StorageInfo};
pub use storage::{
    BackendError, FileStore, KeyValueStore, MemoryStore, PersistentStore, StorageFullWarning,
};
