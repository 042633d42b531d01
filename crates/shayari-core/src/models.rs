//! Data models for Shayari
//!
//! Defines the stored entry ([`Item`]), the user-supplied form data
//! ([`ItemDraft`]) and the theme preference.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ShayariError};

/// Filter value that matches every category
pub const ALL_CATEGORIES: &str = "all";

/// Suffix appended to the title of a duplicated item
pub const COPY_MARKER: &str = " (Copy)";

/// A stored poetic entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier, never reassigned
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub author: String,
    /// Human-readable date, fixed when the item was created or imported
    pub date: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    /// Set only on entries brought in by an import
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub imported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_date: Option<DateTime<Utc>>,
}

impl Item {
    /// Create a native item from validated fields
    pub fn new(fields: ValidDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: fields.title,
            content: fields.content,
            category: fields.category,
            author: fields.author,
            date: DateLocale::EnUs.today(),
            created: now,
            modified: now,
            imported: false,
            import_date: None,
        }
    }

    /// Replace the editable fields, keeping `id` and `created`
    pub fn apply(&mut self, fields: ValidDraft) {
        self.title = fields.title;
        self.content = fields.content;
        self.category = fields.category;
        self.author = fields.author;
        self.modified = Utc::now();
    }

    /// Fresh copy with a new ID and a marked title
    pub fn duplicate(&self) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: format!("{}{}", self.title, COPY_MARKER),
            date: DateLocale::EnUs.today(),
            created: now,
            modified: now,
            ..self.clone()
        }
    }

    /// Whether the required fields are all non-blank
    pub fn is_valid(&self) -> bool {
        [&self.title, &self.content, &self.category]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    /// Case-insensitive match against title, content and author
    ///
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.content.to_lowercase().contains(needle)
            || (!self.author.is_empty() && self.author.to_lowercase().contains(needle))
    }
}

/// Unvalidated form data for creating or editing an item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDraft {
    pub title: String,
    pub content: String,
    pub category: String,
    pub author: Option<String>,
}

impl ItemDraft {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            category: category.into(),
            author: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Trim every field and reject blank required fields
    pub fn validate(&self) -> Result<ValidDraft> {
        let title = required("title", &self.title)?;
        let content = required("content", &self.content)?;
        let category = required("category", &self.category)?;
        let author = self
            .author
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        Ok(ValidDraft {
            title,
            content,
            category,
            author,
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ShayariError::Validation { field });
    }
    Ok(trimmed.to_string())
}

/// Draft fields that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft {
    pub title: String,
    pub content: String,
    pub category: String,
    pub author: String,
}

/// Locale conventions used for the human-readable `date` field
///
/// Native entries use US ordering and imported entries use Indian
/// ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLocale {
    /// `10/18/2026`
    EnUs,
    /// `18/10/2026`
    HiIn,
}

impl DateLocale {
    pub fn format(self, date: NaiveDate) -> String {
        match self {
            DateLocale::EnUs => date.format("%-m/%-d/%Y").to_string(),
            DateLocale::HiIn => date.format("%-d/%-m/%Y").to_string(),
        }
    }

    /// Today's date in this locale
    pub fn today(self) -> String {
        self.format(Local::now().date_naive())
    }
}

/// Appearance preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("Unknown theme '{}'. Expected light or dark.", other)),
        }
    }
}

/// Item counts for the whole collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionStats {
    pub total: usize,
    /// Per-category counts in order of first appearance
    pub categories: Vec<(String, usize)>,
}

impl CollectionStats {
    pub fn from_items(items: &[Item]) -> Self {
        let mut categories: Vec<(String, usize)> = Vec::new();
        for item in items {
            match categories.iter_mut().find(|(name, _)| *name == item.category) {
                Some((_, count)) => *count += 1,
                None => categories.push((item.category.clone(), 1)),
            }
        }
        Self {
            total: items.len(),
            categories,
        }
    }
}

/// The two entries a first-time user starts with
pub fn default_items() -> Vec<Item> {
    let seeds = [
        ItemDraft::new(
            "Heart's Voice",
            "Love knows no victory or defeat,\nOnly the depth of emotions so sweet.\nWho loves from the heart true,\nHas loyalty in every breath they breathe through.",
            "love",
        )
        .with_author("Unknown"),
        ItemDraft::new(
            "Ray of Hope",
            "Learn to keep courage even in defeat,\nLearn to bring joy back into life's beat.\nNo matter how dark the night may be,\nLearn to wait for the dawn you'll see.",
            "motivational",
        ),
    ];

    seeds
        .iter()
        .filter_map(|draft| draft.validate().ok())
        .map(Item::new)
        .collect()
}
