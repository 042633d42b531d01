//! Collection repository
//!
//! The `CollectionRepository` owns the in-memory collection and keeps it
//! mirrored in a [`PersistentStore`]:
//! - every mutation is applied in memory first, then the whole collection
//!   is saved under one key
//! - a failed save does not roll the mutation back; the caller gets a
//!   [`PersistenceWarning`] alongside the result instead
//!
//! ## Usage
//!
//! ```ignore
//! let mut repo = CollectionRepository::open(PersistentStore::open(&config)?);
//!
//! let created = repo.create(&ItemDraft::new("Title", "Lines", "love"))?;
//! if let Some(warning) = created.warning {
//!     eprintln!("{}", warning);
//! }
//!
//! let love = repo.filter("love");
//! let hits = CollectionRepository::search("dawn", love);
//! ```

use std::collections::HashSet;
use std::fmt;

use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, ShayariError};
use crate::models::{default_items, CollectionStats, Item, ItemDraft, Theme, ALL_CATEGORIES};
use crate::signal::Observers;
use crate::storage::{PersistentStore, StorageFullWarning, COLLECTION_KEY, FILTER_KEY, THEME_KEY};

/// Signal that a mutation was applied in memory but not persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceWarning {
    /// Store key that failed to save
    pub key: String,
    /// Operation that triggered the save
    pub operation: &'static str,
}

impl fmt::Display for PersistenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to save data to storage after {}! Changes are kept for this session only.",
            self.operation
        )
    }
}

/// Result of a mutating operation
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    /// Present when the mutation could not be persisted
    pub warning: Option<PersistenceWarning>,
}

impl<T> Outcome<T> {
    fn new(value: T, warning: Option<PersistenceWarning>) -> Self {
        Self { value, warning }
    }

    /// Whether the mutation reached the store
    pub fn is_persisted(&self) -> bool {
        self.warning.is_none()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Storage usage summary
#[derive(Debug, Clone, PartialEq)]
pub struct StorageInfo {
    pub available: bool,
    /// Characters used by all stored keys and values
    pub used: usize,
}

impl StorageInfo {
    /// Usage in KiB, rounded to two decimals
    pub fn used_kib(&self) -> f64 {
        (self.used as f64 / 1024.0 * 100.0).round() / 100.0
    }
}

/// Owner of the in-memory collection and its settings
pub struct CollectionRepository {
    store: PersistentStore,
    items: Vec<Item>,
    filter: String,
    search: String,
    theme: Theme,
    warnings: Observers<PersistenceWarning>,
}

impl CollectionRepository {
    /// Create an empty repository on top of `store` without loading it
    pub fn new(store: PersistentStore) -> Self {
        Self {
            store,
            items: Vec::new(),
            filter: ALL_CATEGORIES.to_string(),
            search: String::new(),
            theme: Theme::default(),
            warnings: Observers::new(),
        }
    }

    /// Create a repository and load its state from `store`
    pub fn open(store: PersistentStore) -> Self {
        let mut repo = Self::new(store);
        // A failed seed save has already been reported to the log
        let _ = repo.load();
        repo
    }

    /// Register a handler for failed saves
    pub fn on_persistence_warning(
        &mut self,
        handler: impl Fn(&PersistenceWarning) + Send + Sync + 'static,
    ) {
        self.warnings.subscribe(handler);
    }

    /// Register a handler for saves rejected by a full store
    pub fn on_storage_full(&mut self, handler: impl Fn(&StorageFullWarning) + Send + Sync + 'static) {
        self.store.on_storage_full(handler);
    }

    // ==================== Loading ====================

    /// Re-read the collection and settings from the store
    ///
    /// An absent, corrupt or empty collection is replaced by the default
    /// demonstration items, which are saved immediately. Returns the number
    /// of items loaded.
    pub fn load(&mut self) -> Outcome<usize> {
        self.items = self.stored_items();

        self.filter = self.store.load(FILTER_KEY, ALL_CATEGORIES.to_string());
        self.theme = self.stored_theme();

        let warning = if self.items.is_empty() {
            info!("No saved collection found, seeding default items");
            self.items = default_items();
            self.persist("seeding the default collection")
        } else {
            debug!("Loaded {} items from storage", self.items.len());
            None
        };

        Outcome::new(self.items.len(), warning)
    }

    /// The collection as it currently exists in the store
    ///
    /// Differs from [`items`](Self::items) after a save has failed. Empty
    /// when nothing readable is stored; no default items are seeded.
    pub fn stored_items(&self) -> Vec<Item> {
        let stored: Vec<Value> = self.store.load(COLLECTION_KEY, Vec::new());
        decode_items(stored)
    }

    /// The theme as it currently exists in the store, light if unset
    pub fn stored_theme(&self) -> Theme {
        let raw: Value = self.store.load(THEME_KEY, Value::Null);
        match raw {
            Value::Null => Theme::default(),
            Value::String(name) => name.parse().unwrap_or_else(|e| {
                warn!("{}", e);
                Theme::default()
            }),
            other => {
                warn!("Ignoring stored theme of unexpected shape: {}", other);
                Theme::default()
            }
        }
    }

    // ==================== Queries ====================

    /// The full collection, newest first
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by ID
    pub fn get(&self, id: Uuid) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Items in `category`, or every item for `"all"`
    ///
    /// Categories match exactly, including case.
    pub fn filter(&self, category: &str) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| category == ALL_CATEGORIES || item.category == category)
            .collect()
    }

    /// Case-insensitive substring search over title, content and author
    ///
    /// An empty query returns `within` unchanged.
    pub fn search<'a>(query: &str, within: impl IntoIterator<Item = &'a Item>) -> Vec<&'a Item> {
        if query.is_empty() {
            return within.into_iter().collect();
        }
        let needle = query.to_lowercase();
        within
            .into_iter()
            .filter(|item| item.matches(&needle))
            .collect()
    }

    /// Items passing the active filter and the active search query
    pub fn visible(&self) -> Vec<&Item> {
        Self::search(&self.search, self.filter(&self.filter))
    }

    pub fn stats(&self) -> CollectionStats {
        CollectionStats::from_items(&self.items)
    }

    pub fn storage_info(&mut self) -> StorageInfo {
        StorageInfo {
            available: self.store.is_available(),
            used: self.store.size(),
        }
    }

    // ==================== Mutations ====================

    /// Validate `draft` and insert it as a new item at the front
    pub fn create(&mut self, draft: &ItemDraft) -> Result<Outcome<Item>> {
        let fields = draft.validate()?;
        let item = Item::new(fields);
        self.items.insert(0, item.clone());
        debug!("Created item {}", item.id);

        let warning = self.persist("adding an item");
        Ok(Outcome::new(item, warning))
    }

    /// Replace the editable fields of item `id`, keeping its position
    pub fn update(&mut self, id: Uuid, draft: &ItemDraft) -> Result<Outcome<Item>> {
        let index = self.position(id)?;
        let fields = draft.validate()?;

        let item = &mut self.items[index];
        item.apply(fields);
        let updated = item.clone();
        debug!("Updated item {}", id);

        let warning = self.persist("updating an item");
        Ok(Outcome::new(updated, warning))
    }

    /// Remove item `id`. Returns whether anything was removed.
    pub fn delete(&mut self, id: Uuid) -> Outcome<bool> {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        let removed = self.items.len() != before;
        if !removed {
            debug!("Delete of unknown item {} ignored", id);
        }

        let warning = self.persist("deleting an item");
        Outcome::new(removed, warning)
    }

    /// Insert a marked copy of item `id` at the front
    pub fn duplicate(&mut self, id: Uuid) -> Result<Outcome<Item>> {
        let index = self.position(id)?;
        let copy = self.items[index].duplicate();
        self.items.insert(0, copy.clone());
        debug!("Duplicated item {} as {}", id, copy.id);

        let warning = self.persist("duplicating an item");
        Ok(Outcome::new(copy, warning))
    }

    /// Empty the collection and reset the filter; the theme is kept
    pub fn clear_all(&mut self) -> Outcome<()> {
        self.items.clear();
        self.filter = ALL_CATEGORIES.to_string();

        let removed = self.store.remove(COLLECTION_KEY) & self.store.remove(FILTER_KEY);
        let warning = if removed {
            info!("Cleared all items");
            None
        } else {
            self.warn(COLLECTION_KEY, "clearing all data")
        };
        Outcome::new((), warning)
    }

    // ==================== Settings ====================

    pub fn active_filter(&self) -> &str {
        &self.filter
    }

    /// Change and persist the active category filter
    pub fn set_filter(&mut self, category: impl Into<String>) -> Outcome<()> {
        self.filter = category.into();
        let warning = if self.store.save(FILTER_KEY, &self.filter) {
            None
        } else {
            self.warn(FILTER_KEY, "changing the filter")
        };
        Outcome::new((), warning)
    }

    pub fn search_query(&self) -> &str {
        &self.search
    }

    /// Set the transient search query used by [`visible`](Self::visible)
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Change and persist the theme
    pub fn set_theme(&mut self, theme: Theme) -> Outcome<Theme> {
        self.theme = theme;
        let warning = if self.store.save(THEME_KEY, &theme) {
            None
        } else {
            self.warn(THEME_KEY, "saving the theme preference")
        };
        Outcome::new(theme, warning)
    }

    pub fn toggle_theme(&mut self) -> Outcome<Theme> {
        self.set_theme(self.theme.toggled())
    }

    // ==================== Storage access ====================

    pub fn store(&self) -> &PersistentStore {
        &self.store
    }

    /// Prepend imported items one at a time and save the result
    ///
    /// Each item is inserted at the front, so the last one ends up first.
    /// Returns whether the save succeeded.
    pub(crate) fn merge_imported(&mut self, imported: Vec<Item>) -> bool {
        for item in imported {
            self.items.insert(0, item);
        }
        self.store.save(COLLECTION_KEY, &self.items)
    }

    fn position(&self, id: Uuid) -> Result<usize> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or(ShayariError::NotFound { id })
    }

    fn persist(&mut self, operation: &'static str) -> Option<PersistenceWarning> {
        if self.store.save(COLLECTION_KEY, &self.items) {
            None
        } else {
            self.warn(COLLECTION_KEY, operation)
        }
    }

    fn warn(&self, key: &str, operation: &'static str) -> Option<PersistenceWarning> {
        let warning = PersistenceWarning {
            key: key.to_string(),
            operation,
        };
        warn!("{}", warning);
        self.warnings.emit(&warning);
        Some(warning)
    }
}

impl fmt::Debug for CollectionRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionRepository")
            .field("items", &self.items.len())
            .field("filter", &self.filter)
            .field("theme", &self.theme)
            .finish_non_exhaustive()
    }
}

/// Decode stored entries one by one
///
/// Entries that fail to decode or have blank required fields are dropped.
/// A repeated ID gets a fresh one so that IDs stay unique.
fn decode_items(stored: Vec<Value>) -> Vec<Item> {
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(stored.len());

    for value in stored {
        let mut item: Item = match serde_json::from_value(value) {
            Ok(item) => item,
            Err(e) => {
                warn!("Skipping unreadable stored item: {}", e);
                continue;
            }
        };
        if !item.is_valid() {
            warn!("Skipping stored item {} with blank required fields", item.id);
            continue;
        }
        if !seen.insert(item.id) {
            let fresh = Uuid::new_v4();
            warn!("Duplicate stored ID {}, reassigned to {}", item.id, fresh);
            item.id = fresh;
            seen.insert(fresh);
        }
        items.push(item);
    }

    items
}
