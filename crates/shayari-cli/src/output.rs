//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)
//!
//! Warnings always go to stderr so they never mix with JSON on stdout.

use serde::Serialize;

use shayari_core::{CollectionStats, Item, MergeReport, StorageInfo};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single item in full
    pub fn print_item(&self, item: &Item) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", item.id);
                println!("Title:    {}", item.title);
                println!("Category: {}", item.category);
                if !item.author.is_empty() {
                    println!("Author:   {}", item.author);
                }
                println!("Date:     {}", item.date);
                println!("Modified: {}", item.modified.format("%Y-%m-%d %H:%M"));
                if let Some(imported) = item.import_date {
                    println!("Imported: {}", imported.format("%Y-%m-%d %H:%M"));
                }
                println!();
                println!("{}", item.content);
            }
            OutputFormat::Json => print_json(item),
            OutputFormat::Quiet => {
                println!("{}", item.id);
            }
        }
    }

    /// Print a list of items
    pub fn print_items(&self, items: &[&Item]) {
        match self.format {
            OutputFormat::Human => {
                if items.is_empty() {
                    println!("No shayari found.");
                    return;
                }
                for item in items {
                    let imported = if item.imported { " [imported]" } else { "" };
                    println!(
                        "{} | {}{} | {} | {}",
                        short_id(item),
                        truncate(&item.title, 30),
                        imported,
                        truncate(&item.category, 15),
                        truncate_line(&item.content, 40)
                    );
                }
                println!("\n{} shayari", items.len());
            }
            OutputFormat::Json => print_json(&items),
            OutputFormat::Quiet => {
                for item in items {
                    println!("{}", item.id);
                }
            }
        }
    }

    /// Print collection statistics and storage usage
    pub fn print_stats(&self, stats: &CollectionStats, storage: &StorageInfo) {
        match self.format {
            OutputFormat::Human => {
                println!("Shayari Collection");
                println!("==================");
                println!();
                println!("Total: {}", stats.total);
                for (category, count) in &stats.categories {
                    println!("  {}: {}", category, count);
                }
                println!();
                println!("Storage:");
                println!(
                    "  Status: {}",
                    if storage.available {
                        "available"
                    } else {
                        "unavailable"
                    }
                );
                println!("  Used:   {:.2} KB", storage.used_kib());
            }
            OutputFormat::Json => {
                let categories: Vec<_> = stats
                    .categories
                    .iter()
                    .map(|(name, count)| serde_json::json!({"name": name, "count": count}))
                    .collect();
                println!(
                    "{}",
                    serde_json::json!({
                        "total": stats.total,
                        "categories": categories,
                        "storage": {
                            "available": storage.available,
                            "used": storage.used,
                            "usedKib": storage.used_kib()
                        }
                    })
                );
            }
            OutputFormat::Quiet => {
                println!("{}", stats.total);
            }
        }
    }

    /// Print the outcome of an import
    pub fn print_report(&self, report: &MergeReport) {
        match self.format {
            OutputFormat::Human => {
                println!("✓ Imported {} new shayari", report.imported_count);
                if report.duplicates_skipped > 0 {
                    println!("  Skipped {} duplicates", report.duplicates_skipped);
                }
                println!("  Collection now holds {}", report.total_after_merge);
            }
            OutputFormat::Json => print_json(report),
            OutputFormat::Quiet => {
                println!("{}", report.imported_count);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Print a warning on stderr, in every output mode
pub fn warn(message: &str) {
    eprintln!("⚠ {}", message);
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode output: {}", e),
    }
}

/// First eight characters of an item's ID
pub fn short_id(item: &Item) -> String {
    item.id.to_string().chars().take(8).collect()
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("दिल की बात", 10), "दिल की बात");
        assert_eq!(truncate("दिल की बात है", 8), "दिल क...");
    }

    #[test]
    fn test_truncate_line() {
        assert_eq!(truncate_line("single line", 20), "single line");
        assert_eq!(truncate_line("line one\nline two", 20), "line one");
        assert_eq!(
            truncate_line("very long single line here", 10),
            "very lo..."
        );
    }
}
