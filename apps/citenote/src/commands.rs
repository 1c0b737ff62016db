//! Command implementations

use std::io::Read;
use std::path::Path;

use citenote_bibtex::parse;
use citenote_core::{CitenoteConfig, CitenoteError, FsStore, Librarian, NoteOutcome};
use citenote_identifiers::{find_unique_cite_key, generate_cite_key, sanitize_filename};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

pub fn new_note(config: CitenoteConfig, file: Option<&Path>) -> CommandResult {
    let bibtex = read_input(file)?;
    let librarian = open_vault(config)?;

    match librarian.create_note(&bibtex) {
        Ok(outcome) => {
            report_outcome("Created literature note", &outcome);
            Ok(())
        }
        Err(CitenoteError::AlreadyExists(path)) => {
            println!("Note \"{path}\" already exists. Skipping.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn attach(config: CitenoteConfig, note: &str, file: Option<&Path>) -> CommandResult {
    let bibtex = read_input(file)?;
    let librarian = open_vault(config)?;
    let outcome = librarian.attach_to_note(note, &bibtex)?;
    report_outcome("Added BibTeX metadata to", &outcome);
    Ok(())
}

pub fn sync(config: CitenoteConfig) -> CommandResult {
    let librarian = open_vault(config)?;
    let outcome = librarian.sync_bibliography()?;
    println!("Wrote {} entries to {}", outcome.entries, outcome.path);
    Ok(())
}

pub fn key(
    config: CitenoteConfig,
    author: Option<&str>,
    year: Option<&str>,
    title: Option<&str>,
    unique: bool,
) -> CommandResult {
    let base = generate_cite_key(author, year, title);
    if !unique {
        println!("{base}");
        return Ok(());
    }

    let librarian = open_vault(config)?;
    let (key, collided) = find_unique_cite_key(&base, &librarian.existing_keys()?);
    if collided {
        eprintln!("Citation key collision detected. Using \"{key}\" instead.");
    }
    println!("{key}");
    Ok(())
}

pub fn sanitize(title: &str) {
    println!("{}", sanitize_filename(title));
}

pub fn check(file: Option<&Path>) -> CommandResult {
    let text = read_input(file)?;
    let result = parse(&text)?;

    for record in &result.entries {
        println!(
            "@{}{{{}}} {} fields",
            record.entry_type,
            record.citation_key.as_deref().unwrap_or_default(),
            record.fields().len()
        );
    }
    if !result.strings.is_empty() {
        println!("{} string macros", result.strings.len());
    }
    for error in &result.errors {
        eprintln!("line {}:{}: {}", error.line, error.column, error.message);
    }

    if result.errors.is_empty() {
        Ok(())
    } else {
        Err(format!("{} entries could not be parsed", result.errors.len()).into())
    }
}

pub fn show_config(config: &CitenoteConfig) -> CommandResult {
    if let Some(path) = CitenoteConfig::default_path() {
        println!("# default location: {}", path.display());
    }
    print!("{}", config.to_toml()?);
    Ok(())
}

fn open_vault(config: CitenoteConfig) -> Result<Librarian<FsStore>, Box<dyn std::error::Error>> {
    let root = match &config.vault_path {
        Some(path) => path.clone(),
        None => std::env::current_dir()?,
    };
    tracing::debug!("Opening vault at {:?}", root);
    let store = FsStore::open(&root)?;
    Ok(Librarian::new(store, config))
}

fn read_input(file: Option<&Path>) -> std::io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

fn report_outcome(action: &str, outcome: &NoteOutcome) {
    if outcome.key_collision {
        println!(
            "Citation key collision detected. Using \"{}\" instead.",
            outcome.citation_key
        );
    }
    println!("{action}: {} ({})", outcome.path, outcome.citation_key);
    if let Some(sync) = &outcome.bibliography {
        println!("Wrote {} entries to {}", sync.entries, sync.path);
    }
}
