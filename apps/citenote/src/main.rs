//! Citenote - literature notes from BibTeX citations
//!
//! Reads a pasted BibTeX entry and turns it into a Markdown note with a
//! YAML header, or merges it into an existing note. Optionally mirrors the
//! whole collection into a `.bib` file.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use citenote_core::CitenoteConfig;

#[derive(Parser, Debug)]
#[command(name = "citenote")]
#[command(about = "Create literature notes from BibTeX citations", version)]
struct Cli {
    /// Configuration file (defaults to <config dir>/citenote/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Vault directory (defaults to the configured vault, then the current directory)
    #[arg(long, global = true)]
    vault: Option<PathBuf>,

    /// Literature folder inside the vault
    #[arg(long, global = true)]
    folder: Option<String>,

    /// Mirrored bibliography file inside the vault; enables syncing
    #[arg(long, global = true)]
    bib: Option<String>,

    /// Do not add a link to the entry's URL in new notes
    #[arg(long, global = true)]
    no_url: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a literature note from a BibTeX entry
    New {
        /// Read the entry from a file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Add BibTeX metadata to an existing note
    Attach {
        /// Vault-relative path of the note
        note: String,

        /// Read the entry from a file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Regenerate the mirrored bibliography file
    Sync,

    /// Print the citation key for author, year and title
    Key {
        #[arg(long)]
        author: Option<String>,

        #[arg(long)]
        year: Option<String>,

        #[arg(long)]
        title: Option<String>,

        /// Resolve collisions against the literature folder
        #[arg(long)]
        unique: bool,
    },

    /// Print the note name for a title
    Sanitize {
        title: String,
    },

    /// Parse a BibTeX file and report its entries and errors
    Check {
        /// File to check (stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = CitenoteConfig::load(cli.config.as_deref())?;
    apply_overrides(&cli, &mut config);
    config.validate()?;

    match cli.command {
        Commands::New { file } => commands::new_note(config, file.as_deref()),
        Commands::Attach { note, file } => commands::attach(config, &note, file.as_deref()),
        Commands::Sync => commands::sync(config),
        Commands::Key {
            author,
            year,
            title,
            unique,
        } => commands::key(
            config,
            author.as_deref(),
            year.as_deref(),
            title.as_deref(),
            unique,
        ),
        Commands::Sanitize { title } => {
            commands::sanitize(&title);
            Ok(())
        }
        Commands::Check { file } => commands::check(file.as_deref()),
        Commands::Config => commands::show_config(&config),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Command-line flags take precedence over the configuration file
fn apply_overrides(cli: &Cli, config: &mut CitenoteConfig) {
    if let Some(vault) = &cli.vault {
        config.vault_path = Some(vault.clone());
    }
    if let Some(folder) = &cli.folder {
        config.literature_folder = folder.clone();
    }
    if let Some(bib) = &cli.bib {
        config.bib_file_path = bib.clone();
        config.enable_bib_sync = true;
    }
    if cli.no_url {
        config.add_url_to_content = false;
    }
}
