//! Shayari CLI
//!
//! Command-line interface for Shayari - a local collection of poetry.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use shayari_core::{CollectionRepository, Config, PersistentStore};

mod commands;
mod editor;
mod output;

use commands::item::ItemFields;
use commands::settings::ThemeChoice;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "shayari")]
#[command(about = "Shayari - Keep your poetry collection on your own machine")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new shayari
    #[command(alias = "create")]
    Add {
        /// Title
        #[arg(short = 'T', long)]
        title: String,
        /// Category, e.g. love, sad, motivational
        #[arg(short, long)]
        category: String,
        /// The verse itself (opens editor if not provided)
        #[arg(short = 'b', long)]
        content: Option<String>,
        /// Poet
        #[arg(short, long)]
        author: Option<String>,
    },
    /// Edit a shayari (prompts for each field if none are given)
    Edit {
        /// Shayari ID (full UUID or prefix)
        id: String,
        #[arg(short = 'T', long)]
        title: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short = 'b', long)]
        content: Option<String>,
        #[arg(short, long)]
        author: Option<String>,
    },
    /// Delete a shayari
    #[command(alias = "delete")]
    Rm {
        /// Shayari ID (full UUID or prefix)
        id: String,
    },
    /// Duplicate a shayari
    Dup {
        /// Shayari ID (full UUID or prefix)
        id: String,
    },
    /// List shayari
    #[command(alias = "ls")]
    List {
        /// Only this category ("all" for every category)
        #[arg(short, long)]
        category: Option<String>,
        /// Case-insensitive search over title, content and author
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show a shayari in full
    Show {
        /// Shayari ID (full UUID or prefix)
        id: String,
    },
    /// Show or set the saved category filter
    Filter {
        /// Category to filter by ("all" to clear)
        category: Option<String>,
    },
    /// Show or set the theme
    Theme {
        #[arg(value_enum)]
        choice: Option<ThemeChoice>,
    },
    /// Show collection statistics and storage usage
    Stats,
    /// Export the collection to a JSON file
    Export {
        /// Output file ("-" for stdout; defaults to a dated file name)
        path: Option<PathBuf>,
    },
    /// Import shayari from an exported JSON file
    Import {
        /// File to import
        path: PathBuf,
    },
    /// Delete all shayari (the theme is kept)
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, quota)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Commands that don't need the store
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), &output);
    }

    let config = Config::load()?;
    let mut repo = open_repository(&config);

    match cli.command {
        Commands::Add {
            title,
            category,
            content,
            author,
        } => {
            let fields = ItemFields {
                title: Some(title),
                content,
                category: Some(category),
                author,
            };
            commands::item::create(&mut repo, fields, &output)
        }
        Commands::Edit {
            id,
            title,
            category,
            content,
            author,
        } => {
            let fields = ItemFields {
                title,
                content,
                category,
                author,
            };
            commands::item::edit(&mut repo, id, fields, &output)
        }
        Commands::Rm { id } => commands::item::delete(&mut repo, id, &output),
        Commands::Dup { id } => commands::item::duplicate(&mut repo, id, &output),
        Commands::List { category, search } => {
            commands::item::list(&repo, category, search, &output)
        }
        Commands::Show { id } => commands::item::show(&repo, id, &output),
        Commands::Filter { category } => commands::settings::filter(&mut repo, category, &output),
        Commands::Theme { choice } => commands::settings::theme(&mut repo, choice, &output),
        Commands::Stats => commands::data::stats(&mut repo, &output),
        Commands::Export { path } => commands::data::export(&repo, path, &output),
        Commands::Import { path } => commands::data::import(&mut repo, path, &output).await,
        Commands::Clear { yes } => commands::data::clear(&mut repo, yes, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(command: Option<ConfigCommands>, output: &Output) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(output),
        Some(ConfigCommands::Set { key, value }) => commands::config::set(key, value, output),
    }
}

/// Open the configured store and load the collection
///
/// If the store cannot be opened the collection lives in memory for this
/// run only. Storage warnings are printed on stderr.
fn open_repository(config: &Config) -> CollectionRepository {
    let store = match PersistentStore::open(config) {
        Ok(store) => store,
        Err(e) => {
            warn!("Falling back to in-memory storage: {}", e);
            output::warn(&format!("{}. Changes will not be saved.", e));
            if let Some(suggestion) = e.recovery_suggestion() {
                output::warn(suggestion);
            }
            PersistentStore::in_memory()
        }
    };

    let mut repo = CollectionRepository::new(store);
    repo.on_storage_full(|warning| output::warn(warning.message()));
    repo.on_persistence_warning(|warning| output::warn(&warning.to_string()));

    let loaded = repo.load();
    debug!("Loaded {} shayari", loaded.value);
    repo
}

/// Log to stderr
///
/// SHAYARI_LOG sets the level for both crates. Otherwise only errors are
/// logged, or everything from debug up with --verbose; warnings already
/// reach the user through the repository's signal handlers.
fn init_logging(verbose: bool) {
    let level = std::env::var("SHAYARI_LOG")
        .unwrap_or_else(|_| if verbose { "debug" } else { "error" }.to_string());
    let env_filter = EnvFilter::new(format!("shayari_core={},shayari_cli={}", level, level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
