//! End-to-end behaviour of the repository, import and export against real
//! and simulated stores.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use shayari_core::storage::{BackendError, BackendResult, COLLECTION_KEY};
use shayari_core::{
    CollectionRepository, ExportService, FileStore, ImportService, ItemDraft, KeyValueStore,
    MemoryStore, PersistentStore, ShayariError, Theme,
};
use tempfile::TempDir;

/// Backend that refuses every operation
struct RefusingStore;

impl KeyValueStore for RefusingStore {
    fn get_item(&self, _key: &str) -> BackendResult<Option<String>> {
        Err(refused())
    }

    fn set_item(&mut self, _key: &str, _value: &str) -> BackendResult<()> {
        Err(refused())
    }

    fn remove_item(&mut self, _key: &str) -> BackendResult<()> {
        Err(refused())
    }

    fn keys(&self) -> BackendResult<Vec<String>> {
        Err(refused())
    }
}

fn refused() -> BackendError {
    BackendError::Unavailable {
        reason: "private browsing".to_string(),
    }
}

fn file_repo(dir: &TempDir) -> CollectionRepository {
    let store = FileStore::open(dir.path().join("store"), None).unwrap();
    CollectionRepository::open(PersistentStore::new(store))
}

fn empty_memory_repo() -> CollectionRepository {
    let mut repo = CollectionRepository::open(PersistentStore::in_memory());
    let _ = repo.clear_all();
    repo
}

#[test]
fn test_created_item_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let created = {
        let mut repo = file_repo(&temp_dir);
        let draft = ItemDraft::new(" Chaand ", "Raat bhar jaaga", "love").with_author("Gulzar");
        repo.create(&draft).unwrap().value
    };

    let reopened = file_repo(&temp_dir);
    let loaded = reopened.get(created.id).unwrap();

    assert_eq!(loaded.title, "Chaand");
    assert_eq!(loaded.content, created.content);
    assert_eq!(loaded.category, created.category);
    assert_eq!(loaded.author, "Gulzar");
    assert_eq!(reopened.items()[0].id, created.id);
}

#[test]
fn test_update_preserves_identity_and_bumps_modified() {
    let temp_dir = TempDir::new().unwrap();
    let mut repo = file_repo(&temp_dir);
    let original = repo.items()[1].clone();
    std::thread::sleep(std::time::Duration::from_millis(5));

    let updated = repo
        .update(original.id, &ItemDraft::new("Renamed", "New lines", "hope"))
        .unwrap()
        .value;

    assert_eq!(updated.id, original.id);
    assert_eq!(updated.created, original.created);
    assert!(updated.modified > original.modified);
    assert_eq!(file_repo(&temp_dir).items()[1].title, "Renamed");
}

#[test]
fn test_delete_unknown_id_changes_nothing() {
    let mut repo = CollectionRepository::open(PersistentStore::in_memory());
    let before = repo.items().to_vec();

    let outcome = repo.delete(uuid::Uuid::new_v4());

    assert!(!outcome.value);
    assert!(outcome.is_persisted());
    assert_eq!(repo.items(), before.as_slice());
}

#[test]
fn test_duplicate_leaves_original_alone() {
    let mut repo = CollectionRepository::open(PersistentStore::in_memory());
    let original = repo.items()[0].clone();

    let copy = repo.duplicate(original.id).unwrap().value;

    assert_ne!(copy.id, original.id);
    assert_eq!(copy.title, format!("{} (Copy)", original.title));
    assert_eq!(repo.get(original.id), Some(&original));
    assert_eq!(repo.len(), 3);
}

#[test]
fn test_import_skips_existing_content() {
    let mut repo = empty_memory_repo();
    repo.create(&ItemDraft::new("One", "A", "c")).unwrap();

    let report = ImportService::new(&mut repo)
        .import(
            r#"{"items":[{"title":"T","content":"A","category":"c"},{"title":"T2","content":"B","category":"c"}]}"#,
        )
        .unwrap();

    assert_eq!(report.imported_count, 1);
    assert_eq!(report.duplicates_skipped, 1);
    assert_eq!(report.total_after_merge, 2);
}

#[test]
fn test_import_without_valid_items_is_rejected() {
    let mut repo = CollectionRepository::open(PersistentStore::in_memory());
    let before = repo.items().to_vec();

    let err = ImportService::new(&mut repo)
        .import(r#"{"items":[{"title":"","content":"x","category":"c"},{}]}"#)
        .unwrap_err();

    assert!(matches!(err, ShayariError::EmptyImport));
    assert_eq!(repo.items(), before.as_slice());
}

#[test]
fn test_export_then_import_round_trip() {
    let mut source = CollectionRepository::open(PersistentStore::in_memory());
    source
        .create(&ItemDraft::new("Third", "One more", "sad"))
        .unwrap();
    let _ = source.set_theme(Theme::Dark);
    let json = ExportService::new(&source).export_json().unwrap();

    let mut target = empty_memory_repo();
    let report = ImportService::new(&mut target).import(&json).unwrap();

    assert_eq!(report.imported_count, source.len());
    assert_eq!(report.duplicates_skipped, 0);
    assert_eq!(target.theme(), Theme::Dark);

    let mut contents: Vec<&str> = target.items().iter().map(|i| i.content.as_str()).collect();
    let mut expected: Vec<&str> = source.items().iter().map(|i| i.content.as_str()).collect();
    contents.sort();
    expected.sort();
    assert_eq!(contents, expected);
    assert!(target.items().iter().all(|i| i.imported));
}

#[test]
fn test_capacity_failure_warns_once_per_failed_save() {
    let mut repo = CollectionRepository::open(PersistentStore::new(MemoryStore::with_capacity(4096)));
    let full = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&full);
    repo.on_storage_full(move |warning| {
        assert_eq!(warning.key, COLLECTION_KEY);
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let big = "ghazal ".repeat(1000);
    let first = repo.create(&ItemDraft::new("Long", big.as_str(), "love")).unwrap();
    assert!(!first.is_persisted());
    assert_eq!(full.load(Ordering::SeqCst), 1);

    let second = repo.create(&ItemDraft::new("Longer", big.as_str(), "love")).unwrap();
    assert!(!second.is_persisted());
    assert_eq!(full.load(Ordering::SeqCst), 2);

    // Both items stay in memory even though neither was saved
    assert_eq!(repo.len(), 4);
}

#[test]
fn test_unavailable_store_keeps_working_in_memory() {
    let mut repo = CollectionRepository::open(PersistentStore::new(RefusingStore));
    let warnings = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&warnings);
    repo.on_persistence_warning(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(repo.len(), 2);
    assert!(!repo.storage_info().available);
    assert_eq!(repo.storage_info().used, 0);

    let created = repo.create(&ItemDraft::new("Offline", "Still here", "hope")).unwrap();
    assert!(!created.is_persisted());
    assert_eq!(repo.len(), 3);
    assert_eq!(warnings.load(Ordering::SeqCst), 1);
}
