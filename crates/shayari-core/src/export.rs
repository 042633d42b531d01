//! Snapshot export
//!
//! Produces a portable JSON snapshot of the collection plus the theme.
//! Field order is fixed by the struct definitions, so two exports of the
//! same state differ only in `exportDate` and `storageSize`.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, ShayariError};
use crate::models::{Item, Theme};
use crate::repository::CollectionRepository;

/// Snapshot format version written by this crate
pub const FORMAT_VERSION: &str = "1.0";

/// Portable copy of a collection and its settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    pub items: Vec<Item>,
    pub theme: Theme,
    pub export_date: DateTime<Utc>,
    pub version: String,
    pub storage_size: usize,
}

impl ExportSnapshot {
    /// Pretty-printed JSON with two-space indentation
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(ShayariError::Encode)
    }

    /// File name for saving this snapshot, e.g. `shayari-collection-2026-10-18.json`
    pub fn suggested_file_name(&self) -> String {
        format!(
            "shayari-collection-{}.json",
            self.export_date.format("%Y-%m-%d")
        )
    }
}

/// Builds snapshots from a repository without modifying it
pub struct ExportService<'a> {
    repo: &'a CollectionRepository,
}

impl<'a> ExportService<'a> {
    pub fn new(repo: &'a CollectionRepository) -> Self {
        Self { repo }
    }

    /// Capture the persisted collection, theme and store size
    ///
    /// Reads the store rather than the in-memory collection, so changes
    /// whose save failed are not exported.
    pub fn snapshot(&self) -> ExportSnapshot {
        ExportSnapshot {
            items: self.repo.stored_items(),
            theme: self.repo.stored_theme(),
            export_date: Utc::now(),
            version: FORMAT_VERSION.to_string(),
            storage_size: self.repo.store().size(),
        }
    }

    /// Snapshot encoded as pretty JSON
    pub fn export_json(&self) -> Result<String> {
        self.snapshot().to_json()
    }

    /// Write a snapshot to `path`, returning the snapshot written
    pub fn write_to(&self, path: &Path) -> Result<ExportSnapshot> {
        let snapshot = self.snapshot();
        let json = snapshot.to_json()?;
        std::fs::write(path, json).map_err(|source| ShayariError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Exported {} items to {:?}", snapshot.items.len(), path);
        Ok(snapshot)
    }
}
