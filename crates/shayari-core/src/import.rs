//! Snapshot import
//!
//! Merges an externally supplied snapshot into the collection.
//!
//! ## Algorithm
//!
//! 1. Decode the text as JSON (`Parse` error otherwise)
//! 2. Require a top-level `items` array (`Format` error otherwise); the
//!    older `shayaris` key is accepted when `items` is absent
//! 3. Keep entries whose `title`, `content` and `category` are non-blank
//!    strings; others are dropped silently (`EmptyImport` if none remain)
//! 4. Skip entries whose trimmed content equals the trimmed content of an
//!    item already in the collection
//! 5. Give the rest fresh IDs and import metadata, prepend them one by one
//!    and save the collection once (`Persistence` error if that fails)
//! 6. Apply the snapshot's theme, whatever the outcome of step 5
//!
//! Nothing is modified before step 5.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, ShayariError};
use crate::models::{DateLocale, Item, Theme};
use crate::repository::CollectionRepository;
use crate::storage::COLLECTION_KEY;

/// Top-level key for the item list
const ITEMS_FIELD: &str = "items";
/// Item list key used by older snapshots
const LEGACY_ITEMS_FIELD: &str = "shayaris";

/// Summary of a completed import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    pub imported_count: usize,
    pub total_after_merge: usize,
    pub duplicates_skipped: usize,
}

/// Why a snapshot entry was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NotAnObject,
    Missing(&'static str),
    NotAString(&'static str),
    Blank(&'static str),
}

/// A snapshot entry that passed the schema check
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub title: String,
    pub content: String,
    pub category: String,
    pub author: String,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

impl Candidate {
    /// Check one snapshot entry against the item schema
    ///
    /// Text is kept exactly as given; only the blank check trims it.
    /// `author`, `created` and `modified` are optional; values of the wrong
    /// type are ignored rather than rejecting the entry.
    pub fn from_value(value: &Value) -> std::result::Result<Self, Rejection> {
        let fields = value.as_object().ok_or(Rejection::NotAnObject)?;

        Ok(Self {
            title: required_string(fields, "title")?,
            content: required_string(fields, "content")?,
            category: required_string(fields, "category")?,
            author: fields
                .get("author")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_default(),
            created: timestamp(fields, "created"),
            modified: timestamp(fields, "modified"),
        })
    }

    fn into_item(self, now: DateTime<Utc>, date: &str) -> Item {
        let created = self.created.unwrap_or(now);
        Item {
            id: Uuid::new_v4(),
            title: self.title,
            content: self.content,
            category: self.category,
            author: self.author,
            date: date.to_string(),
            created,
            modified: self.modified.unwrap_or(created),
            imported: true,
            import_date: Some(now),
        }
    }
}

fn required_string(
    fields: &Map<String, Value>,
    name: &'static str,
) -> std::result::Result<String, Rejection> {
    let value = fields.get(name).ok_or(Rejection::Missing(name))?;
    let text = value.as_str().ok_or(Rejection::NotAString(name))?;
    if text.trim().is_empty() {
        return Err(Rejection::Blank(name));
    }
    Ok(text.to_string())
}

fn timestamp(fields: &Map<String, Value>, name: &str) -> Option<DateTime<Utc>> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

struct DecodedSnapshot {
    entries: Vec<Value>,
    theme: Option<Value>,
}

fn decode_snapshot(raw: &str) -> Result<DecodedSnapshot> {
    let value: Value = serde_json::from_str(raw).map_err(ShayariError::Parse)?;
    let Value::Object(mut root) = value else {
        return Err(ShayariError::Format(
            "snapshot must be a JSON object".to_string(),
        ));
    };

    let entries = match root
        .remove(ITEMS_FIELD)
        .or_else(|| root.remove(LEGACY_ITEMS_FIELD))
    {
        Some(Value::Array(entries)) => entries,
        _ => {
            return Err(ShayariError::Format(
                "missing or invalid items array".to_string(),
            ))
        }
    };

    Ok(DecodedSnapshot {
        entries,
        theme: root.remove("theme"),
    })
}

/// Merges snapshots into a repository
///
/// Holds the repository mutably for its whole lifetime, so no other
/// mutation can interleave with an import in progress.
pub struct ImportService<'a> {
    repo: &'a mut CollectionRepository,
}

impl<'a> ImportService<'a> {
    pub fn new(repo: &'a mut CollectionRepository) -> Self {
        Self { repo }
    }

    /// Merge the snapshot in `raw` into the collection
    pub fn import(&mut self, raw: &str) -> Result<MergeReport> {
        let snapshot = decode_snapshot(raw)?;

        let total = snapshot.entries.len();
        let candidates: Vec<Candidate> = snapshot
            .entries
            .iter()
            .filter_map(|entry| match Candidate::from_value(entry) {
                Ok(candidate) => Some(candidate),
                Err(rejection) => {
                    debug!("Dropping import entry: {:?}", rejection);
                    None
                }
            })
            .collect();

        if candidates.is_empty() {
            warn!("Import rejected: none of {} entries were valid", total);
            return Err(ShayariError::EmptyImport);
        }
        let valid = candidates.len();

        let existing: HashSet<&str> = self
            .repo
            .items()
            .iter()
            .map(|item| item.content.trim())
            .collect();
        let fresh: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| !existing.contains(candidate.content.trim()))
            .collect();

        let now = Utc::now();
        let date = DateLocale::HiIn.today();
        let imported: Vec<Item> = fresh
            .into_iter()
            .map(|candidate| candidate.into_item(now, &date))
            .collect();
        let imported_count = imported.len();

        let saved = self.repo.merge_imported(imported);

        if let Some(theme) = snapshot.theme {
            self.apply_theme(theme);
        }

        if !saved {
            warn!("Imported items are in memory but could not be saved");
            return Err(ShayariError::Persistence {
                key: COLLECTION_KEY.to_string(),
            });
        }

        let report = MergeReport {
            imported_count,
            total_after_merge: self.repo.len(),
            duplicates_skipped: valid - imported_count,
        };
        info!(
            "Imported {} items ({} duplicates skipped, {} invalid entries dropped)",
            report.imported_count,
            report.duplicates_skipped,
            total - valid
        );
        Ok(report)
    }

    /// Read a snapshot file and merge it
    ///
    /// A read failure leaves the collection untouched.
    pub async fn import_file(&mut self, path: impl AsRef<Path>) -> Result<MergeReport> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ShayariError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        self.import(&raw)
    }

    fn apply_theme(&mut self, theme: Value) {
        match theme {
            Value::String(name) => match name.parse::<Theme>() {
                Ok(theme) => {
                    let _ = self.repo.set_theme(theme);
                }
                Err(e) => warn!("Ignoring imported theme: {}", e),
            },
            Value::Null => {}
            other => warn!("Ignoring imported theme of unexpected shape: {}", other),
        }
    }
}
