//! Item command handlers

use anyhow::{bail, Context, Result};
use uuid::Uuid;

use shayari_core::{CollectionRepository, ItemDraft};

use crate::editor::{confirm, edit_text, prompt_with_default};
use crate::output::{short_id, Output};

/// Fields supplied on the command line for add/edit
#[derive(Debug, Default)]
pub struct ItemFields {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
}

impl ItemFields {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.category.is_none()
            && self.author.is_none()
    }
}

/// Create a new item
pub fn create(repo: &mut CollectionRepository, fields: ItemFields, output: &Output) -> Result<()> {
    let content = match fields.content {
        Some(content) => content,
        None => {
            let initial = format!(
                "# Write your shayari below. Lines starting with '#' are ignored.\n# Title: {}\n\n",
                fields.title.as_deref().unwrap_or("")
            );
            edit_text(&initial).context("Failed to edit content")?
        }
    };

    let mut draft = ItemDraft::new(
        fields.title.unwrap_or_default(),
        content,
        fields.category.unwrap_or_default(),
    );
    if let Some(author) = fields.author {
        draft = draft.with_author(author);
    }

    let created = repo.create(&draft)?.into_value();

    output.success(&format!("Added shayari: {}", short_id(&created)));
    output.print_item(&created);
    Ok(())
}

/// Edit an existing item
///
/// Fields not given on the command line keep their value. With no fields
/// at all, each one is prompted for interactively.
pub fn edit(
    repo: &mut CollectionRepository,
    id: String,
    fields: ItemFields,
    output: &Output,
) -> Result<()> {
    let uuid = parse_item_id(&id, repo)?;
    let current = repo
        .get(uuid)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Shayari not found: {}", id))?;

    let fields = if fields.is_empty() {
        println!("Editing shayari: {}", current.id);
        println!("Press Enter to keep current value, or type new value.\n");
        let edit_content = confirm("Edit content in your editor?")?;
        ItemFields {
            title: prompt_with_default("Title", &current.title)?,
            category: prompt_with_default("Category", &current.category)?,
            author: prompt_with_default("Author", &current.author)?,
            content: if edit_content {
                Some(edit_text(&current.content).context("Failed to edit content")?)
            } else {
                None
            },
        }
    } else {
        fields
    };

    let draft = ItemDraft::new(
        fields.title.unwrap_or(current.title),
        fields.content.unwrap_or(current.content),
        fields.category.unwrap_or(current.category),
    )
    .with_author(fields.author.unwrap_or(current.author));

    let updated = repo.update(uuid, &draft)?.into_value();

    output.success("Shayari updated");
    output.print_item(&updated);
    Ok(())
}

/// Delete an item
pub fn delete(repo: &mut CollectionRepository, id: String, output: &Output) -> Result<()> {
    let uuid = parse_item_id(&id, repo)?;

    if output.should_prompt() {
        if let Some(item) = repo.get(uuid) {
            println!("Delete shayari: {} - {}", short_id(item), item.title);
            if !confirm("Are you sure you want to delete this shayari?")? {
                println!("Cancelled.");
                return Ok(());
            }
        }
    }

    if repo.delete(uuid).into_value() {
        output.success(&format!("Deleted shayari: {}", uuid));
    } else {
        output.message(&format!("Nothing to delete for {}", uuid));
    }
    Ok(())
}

/// Duplicate an item
pub fn duplicate(repo: &mut CollectionRepository, id: String, output: &Output) -> Result<()> {
    let uuid = parse_item_id(&id, repo)?;
    let copy = repo.duplicate(uuid)?.into_value();

    output.success(&format!("Duplicated as {}", short_id(&copy)));
    output.print_item(&copy);
    Ok(())
}

/// List items
///
/// Without `--category` the saved filter applies. The search query is
/// never saved.
pub fn list(
    repo: &CollectionRepository,
    category: Option<String>,
    search: Option<String>,
    output: &Output,
) -> Result<()> {
    let category = category.unwrap_or_else(|| repo.active_filter().to_string());
    let filtered = repo.filter(&category);
    let items = CollectionRepository::search(search.as_deref().unwrap_or(""), filtered);

    output.print_items(&items);
    Ok(())
}

/// Show a single item
pub fn show(repo: &CollectionRepository, id: String, output: &Output) -> Result<()> {
    let uuid = parse_item_id(&id, repo)?;
    let item = repo
        .get(uuid)
        .ok_or_else(|| anyhow::anyhow!("Shayari not found: {}", id))?;

    output.print_item(item);
    Ok(())
}

/// Parse an item ID (supports full UUID or prefix)
fn parse_item_id(id: &str, repo: &CollectionRepository) -> Result<Uuid> {
    if let Ok(uuid) = Uuid::parse_str(id) {
        return Ok(uuid);
    }

    let matches: Vec<_> = repo
        .items()
        .iter()
        .filter(|item| item.id.to_string().starts_with(id))
        .collect();

    match matches.len() {
        0 => bail!("No shayari found matching: {}", id),
        1 => Ok(matches[0].id),
        _ => {
            eprintln!("Multiple shayari match '{}':", id);
            for item in &matches {
                eprintln!("  {} - {}", item.id, item.title);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shayari_core::PersistentStore;

    #[test]
    fn test_parse_item_id_prefix() {
        let repo = CollectionRepository::open(PersistentStore::in_memory());
        let target = repo.items()[0].id;
        let full = target.to_string();

        assert_eq!(parse_item_id(&full, &repo).unwrap(), target);
        assert_eq!(parse_item_id(&full[..13], &repo).unwrap(), target);
        assert!(parse_item_id("zzzz", &repo).is_err());
    }

    #[test]
    fn test_parse_item_id_ambiguous() {
        let repo = CollectionRepository::open(PersistentStore::in_memory());
        // The empty prefix matches every seeded item
        assert!(parse_item_id("", &repo).is_err());
    }
}
