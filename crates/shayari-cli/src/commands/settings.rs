//! Filter and theme command handlers

use anyhow::Result;
use clap::ValueEnum;

use shayari_core::{CollectionRepository, Theme};

use crate::output::{Output, OutputFormat};

/// Theme argument accepted by `shayari theme`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeChoice {
    Light,
    Dark,
    Toggle,
}

/// Show or change the saved category filter
pub fn filter(repo: &mut CollectionRepository, category: Option<String>, output: &Output) -> Result<()> {
    if let Some(category) = category {
        let _ = repo.set_filter(category);
    }

    let active = repo.active_filter();
    match output.format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "filter": active })),
        OutputFormat::Quiet => println!("{}", active),
        OutputFormat::Human => {
            println!("Filter: {}", active);
            println!("{} shayari shown by `shayari list`", repo.filter(active).len());
        }
    }
    Ok(())
}

/// Show or change the theme preference
pub fn theme(repo: &mut CollectionRepository, choice: Option<ThemeChoice>, output: &Output) -> Result<()> {
    let theme = match choice {
        Some(ThemeChoice::Light) => repo.set_theme(Theme::Light).into_value(),
        Some(ThemeChoice::Dark) => repo.set_theme(Theme::Dark).into_value(),
        Some(ThemeChoice::Toggle) => repo.toggle_theme().into_value(),
        None => repo.theme(),
    };

    match output.format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "theme": theme })),
        OutputFormat::Quiet => println!("{}", theme),
        OutputFormat::Human => {
            let mode = match theme {
                Theme::Light => "☀️ light",
                Theme::Dark => "🌙 dark",
            };
            println!("Theme: {}", mode);
        }
    }
    Ok(())
}
