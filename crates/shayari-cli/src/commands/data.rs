//! Collection-wide command handlers: stats, export, import, clear

use std::path::PathBuf;

use anyhow::{Context, Result};

use shayari_core::{CollectionRepository, ExportService, ImportService};

use crate::editor::confirm;
use crate::output::{warn, Output};

/// Show collection statistics and storage usage
pub fn stats(repo: &mut CollectionRepository, output: &Output) -> Result<()> {
    let stats = repo.stats();
    let storage = repo.storage_info();
    output.print_stats(&stats, &storage);
    Ok(())
}

/// Write a snapshot of the collection
///
/// Without a path, the snapshot goes to a dated file in the current
/// directory. A path of `-` writes to stdout.
pub fn export(repo: &CollectionRepository, path: Option<PathBuf>, output: &Output) -> Result<()> {
    let service = ExportService::new(repo);

    if path.as_deref() == Some(std::path::Path::new("-")) {
        println!("{}", service.export_json()?);
        return Ok(());
    }

    let path = match path {
        Some(path) => path,
        None => PathBuf::from(service.snapshot().suggested_file_name()),
    };

    let snapshot = service
        .write_to(&path)
        .with_context(|| format!("Failed to export collection to {:?}", path))?;

    output.success(&format!(
        "Exported {} shayari to {}",
        snapshot.items.len(),
        path.display()
    ));
    Ok(())
}

/// Merge a snapshot file into the collection
pub async fn import(repo: &mut CollectionRepository, path: PathBuf, output: &Output) -> Result<()> {
    let result = ImportService::new(repo).import_file(&path).await;

    match result {
        Ok(report) => {
            output.print_report(&report);
            Ok(())
        }
        Err(e) if e.requires_reload() => {
            // Memory holds the merge but storage does not; go back to what was saved
            let _ = repo.load();
            warn(
                "The collection was reloaded from storage. Export your data to free up space, then import again.",
            );
            Err(e.into())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to import {:?}", path)),
    }
}

/// Remove every item and the saved filter
pub fn clear(repo: &mut CollectionRepository, yes: bool, output: &Output) -> Result<()> {
    if !yes {
        if !output.should_prompt() {
            anyhow::bail!("Refusing to clear without confirmation. Pass --yes to proceed.");
        }
        println!("This will delete all {} shayari.", repo.len());
        if !confirm("Are you sure you want to delete ALL shayari? This cannot be undone!")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let outcome = repo.clear_all();
    if outcome.is_persisted() {
        output.success("All data cleared");
    }
    Ok(())
}
