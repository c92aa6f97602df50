//! CLI adapter for scholar-search
//!
//! Provides a command-line front end to search sessions and the
//! institution catalog. Depends on `core/` only.
//!
//! ```text
//! +------------------+      +------------------+
//! |      cli/        | ---> |     core/        |
//! | (clap adapter)   |      |  (domain logic)  |
//! +------------------+      +------------------+
//! ```

pub mod commands;
pub mod output;

use crate::core::config::Config;
use crate::core::index::openalex;
use crate::core::services::Services;
use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;

/// scholar - search scholarly works page by page
///
/// Filter OpenAlex works by abstract text, author and institution, and
/// walk the ranked results with stable keyset pagination.
#[derive(Parser, Debug)]
#[command(name = "scholar")]
#[command(version)]
#[command(about = "Paginated search over scholarly works", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search works and print one or more result pages
    Search(commands::SearchArgs),

    /// List institution names usable with `search --institution`
    Institutions(commands::InstitutionsArgs),

    /// Show current configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  scholar completions bash > ~/.local/share/bash-completion/completions/scholar
    ///   zsh:   scholar completions zsh > ~/.zfunc/_scholar
    ///   fish:  scholar completions fish > ~/.config/fish/completions/scholar.fish
    Completions(commands::CompletionsArgs),
}

impl Commands {
    /// Local works file requested instead of Elasticsearch
    fn fixture(&self) -> Option<&Path> {
        match self {
            Commands::Search(args) => args.fixture.as_deref(),
            Commands::Institutions(args) => args.fixture.as_deref(),
            _ => None,
        }
    }
}

/// Build services for `config`, over a local works file when given
pub fn create_services(config: Config, fixture: Option<&Path>) -> crate::Result<Services> {
    match fixture {
        Some(path) => {
            let works = openalex::load_works(path)?;
            Services::with_local(config, &works)
        }
        None => Services::new(config),
    }
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // Handle completions command early (doesn't need services)
    if let Commands::Completions(args) = cli.command {
        return commands::completions::execute(args);
    }

    let config = Config::load()?;
    config.log_config();

    let services = Arc::new(create_services(config, cli.command.fixture())?);

    match cli.command {
        Commands::Search(args) => commands::search::execute(args, &services, cli.format).await,
        Commands::Institutions(args) => {
            commands::institutions::execute(args, &services, cli.format).await
        }
        Commands::ShowConfig(args) => commands::config::execute(args, &services, cli.format).await,
        Commands::Completions(_) => unreachable!(), // Handled above
    }
}
