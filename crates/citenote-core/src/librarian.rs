//! Literature note operations
//!
//! The [`Librarian`] turns pasted BibTeX into literature notes, attaches
//! BibTeX metadata to existing notes and keeps the mirrored bibliography
//! file in step with the collection.

use std::collections::HashSet;

use citenote_bibtex::{
    format_collection, parse_entry, BibRecord, Header, CITATION_KEY, ENTRY_TYPE,
};
use citenote_identifiers::{collect_citation_keys, generate_unique_cite_key, sanitize_filename};
use serde_json::Value;

use crate::config::CitenoteConfig;
use crate::error::{CitenoteError, Result};
use crate::frontmatter::{render_note, split_frontmatter};
use crate::mirror::collection_records;
use crate::store::{NoteStore, NOTE_EXTENSION};

/// Note name used when an entry has no title
pub const UNTITLED: &str = "Untitled";

/// Header key holding a note's display titles
pub const ALIASES: &str = "aliases";

/// Header key added by some editors that never belongs in a stored header
const POSITION: &str = "position";

/// Result of creating or updating a literature note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteOutcome {
    /// Vault-relative path of the note
    pub path: String,
    /// Citation key stored in the note's header
    pub citation_key: String,
    /// The generated key was taken and a suffixed one was used
    pub key_collision: bool,
    /// Mirror update, when bibliography sync is enabled
    pub bibliography: Option<SyncOutcome>,
}

/// Result of regenerating the mirrored bibliography file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub path: String,
    pub entries: usize,
    /// The file did not exist before
    pub created: bool,
}

/// Creates and updates literature notes in a [`NoteStore`]
pub struct Librarian<S: NoteStore> {
    store: S,
    config: CitenoteConfig,
}

impl<S: NoteStore> Librarian<S> {
    pub fn new(store: S, config: CitenoteConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &CitenoteConfig {
        &self.config
    }

    /// Create a literature note from a pasted BibTeX entry.
    ///
    /// The note is named after the sanitized title and lands in the
    /// literature folder. An existing note is never overwritten; that case
    /// is reported as [`CitenoteError::AlreadyExists`].
    pub fn create_note(&self, bibtex: &str) -> Result<NoteOutcome> {
        let folder = self.config.literature_folder();
        if folder.is_empty() {
            return Err(CitenoteError::MissingConfiguration("literature_folder"));
        }
        self.check_sync_config()?;
        if !self.store.exists(folder) {
            return Err(CitenoteError::DestinationMissing(folder.to_string()));
        }

        let record = parse_entry(bibtex)?;
        tracing::debug!(
            "Parsed {} entry with {} fields",
            record.entry_type,
            record.fields().len()
        );

        let title = record.title().filter(|t| !t.is_empty());
        let name = sanitize_filename(title.unwrap_or(UNTITLED));
        let path = format!("{folder}/{name}.{NOTE_EXTENSION}");
        if self.store.exists(&path) {
            tracing::info!("Note {} already exists, skipping", path);
            return Err(CitenoteError::AlreadyExists(path));
        }

        let (citation_key, key_collision) = self.assign_key(&record)?;

        let mut header = Header::new();
        header.insert(CITATION_KEY.to_string(), Value::String(citation_key.clone()));
        insert_fields(&mut header, &record);
        if let Some(title) = title.filter(|t| *t != name) {
            header.insert(ALIASES.to_string(), Value::Array(vec![title.into()]));
        }
        if !header.contains_key(ENTRY_TYPE) {
            header.insert(ENTRY_TYPE.to_string(), record.entry_type.clone().into());
        }

        let mut content = render_note(&header, "")?;
        if self.config.add_url_to_content {
            if let Some(url) = record.url().filter(|u| !u.is_empty()) {
                content.push_str(&format!("\n- [{url}]({url})\n"));
            }
        }

        self.store.create(&path, &content)?;
        tracing::info!("Created literature note {} ({})", path, citation_key);

        Ok(NoteOutcome {
            path,
            citation_key,
            key_collision,
            bibliography: self.sync_if_enabled()?,
        })
    }

    /// Merge a pasted BibTeX entry into an existing note's header.
    ///
    /// An existing `citationKey` is kept. BibTeX fields overwrite header
    /// values of the same name in place; new fields are appended. The note
    /// body is preserved.
    pub fn attach_to_note(&self, path: &str, bibtex: &str) -> Result<NoteOutcome> {
        self.check_sync_config()?;
        let record = parse_entry(bibtex)?;

        if !self.store.exists(path) {
            return Err(CitenoteError::NoteNotFound(path.to_string()));
        }
        let content = self.store.read(path)?;
        let (header, body) = split_frontmatter(&content)?;
        let mut header = header.unwrap_or_default();
        header.shift_remove(POSITION);

        let existing_key = header
            .get(CITATION_KEY)
            .and_then(Value::as_str)
            .filter(|key| !key.is_empty())
            .map(str::to_string);
        let (citation_key, key_collision) = match existing_key {
            Some(key) => (key, false),
            None => self.assign_key(&record)?,
        };

        header.insert(CITATION_KEY.to_string(), Value::String(citation_key.clone()));
        insert_fields(&mut header, &record);
        let has_entry_type = header
            .get(ENTRY_TYPE)
            .is_some_and(|value| !matches!(value, Value::Null) && value.as_str() != Some(""));
        if !has_entry_type {
            header.insert(ENTRY_TYPE.to_string(), record.entry_type.clone().into());
        }

        self.store.modify(path, &render_note(&header, body)?)?;
        tracing::info!("Added BibTeX metadata to {} ({})", path, citation_key);

        Ok(NoteOutcome {
            path: path.to_string(),
            citation_key,
            key_collision,
            bibliography: self.sync_if_enabled()?,
        })
    }

    /// Regenerate the mirrored bibliography file from the collection.
    ///
    /// The file is created when missing and overwritten otherwise.
    pub fn sync_bibliography(&self) -> Result<SyncOutcome> {
        let path = self.config.bib_file_path();
        if path.is_empty() {
            return Err(CitenoteError::MissingConfiguration("bib_file_path"));
        }

        let headers = self.store.list_headers(self.config.literature_folder())?;
        let records = collection_records(headers.iter().map(|(_, header)| header));
        let text = format_collection(&records);

        let created = !self.store.exists(path);
        if created {
            self.store.create(path, &text)?;
        } else {
            self.store.modify(path, &text)?;
        }
        tracing::info!("Wrote {} entries to {}", records.len(), path);

        Ok(SyncOutcome {
            path: path.to_string(),
            entries: records.len(),
            created,
        })
    }

    /// Citation keys already used in the literature folder
    pub fn existing_keys(&self) -> Result<HashSet<String>> {
        let folder = self.config.literature_folder();
        let headers = self.store.list_headers(folder)?;
        Ok(collect_citation_keys(headers, folder))
    }

    fn assign_key(&self, record: &BibRecord) -> Result<(String, bool)> {
        let existing = self.existing_keys()?;
        let (key, collided) =
            generate_unique_cite_key(record.author(), record.year(), record.title(), &existing);
        if collided {
            tracing::warn!("Citation key collision detected, using {}", key);
        }
        Ok((key, collided))
    }

    /// Sync needs a target; fail before any note is written
    fn check_sync_config(&self) -> Result<()> {
        if self.config.enable_bib_sync && self.config.bib_file_path().is_empty() {
            return Err(CitenoteError::MissingConfiguration("bib_file_path"));
        }
        Ok(())
    }

    fn sync_if_enabled(&self) -> Result<Option<SyncOutcome>> {
        if !self.config.enable_bib_sync {
            return Ok(None);
        }
        self.sync_bibliography().map(Some)
    }
}

fn insert_fields(header: &mut Header, record: &BibRecord) {
    for field in record.fields() {
        header.insert(field.key.clone(), Value::String(field.value.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn librarian() -> Librarian<MemoryStore> {
        let store = MemoryStore::new();
        store.create_folder("Literature");
        let config = CitenoteConfig {
            literature_folder: "Literature".to_string(),
            ..Default::default()
        };
        Librarian::new(store, config)
    }

    #[test]
    fn test_create_note_path_and_key() {
        let librarian = librarian();
        let outcome = librarian
            .create_note("@article{x, author = {Smith, John}, title = {Quantum}, year = {2023}}")
            .unwrap();
        assert_eq!(outcome.path, "Literature/Quantum.md");
        assert_eq!(outcome.citation_key, "smith2023quantum");
        assert!(!outcome.key_collision);
        assert!(outcome.bibliography.is_none());
    }

    #[test]
    fn test_untitled_entry() {
        let librarian = librarian();
        let outcome = librarian.create_note("@misc{x, year = {1999}}").unwrap();
        assert_eq!(outcome.path, "Literature/Untitled.md");
        assert_eq!(outcome.citation_key, "unknown1999");

        let content = librarian.store().read(&outcome.path).unwrap();
        assert!(!content.contains("aliases"));
    }

    #[test]
    fn test_missing_folder_setting() {
        let librarian = Librarian::new(MemoryStore::new(), CitenoteConfig::default());
        let err = librarian.create_note("@misc{x, title = {T}}").unwrap_err();
        assert!(matches!(err, CitenoteError::MissingConfiguration("literature_folder")));
    }

    #[test]
    fn test_attach_checks_sync_before_writing() {
        let store = MemoryStore::new();
        store.create("Literature/Note.md", "Body").unwrap();
        let config = CitenoteConfig {
            literature_folder: "Literature".to_string(),
            enable_bib_sync: true,
            ..Default::default()
        };
        let librarian = Librarian::new(store, config);

        let err = librarian
            .attach_to_note("Literature/Note.md", "@misc{x, title = {T}}")
            .unwrap_err();
        assert!(matches!(err, CitenoteError::MissingConfiguration("bib_file_path")));
        assert_eq!(librarian.store().read("Literature/Note.md").unwrap(), "Body");
    }

    #[test]
    fn test_sync_requires_path() {
        let librarian = librarian();
        let err = librarian.sync_bibliography().unwrap_err();
        assert!(matches!(err, CitenoteError::MissingConfiguration("bib_file_path")));
    }
}
