//! Note storage
//!
//! Paths are vault-relative strings using `/` separators, e.g.
//! `Literature/Attention Is All You Need.md`.

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use citenote_bibtex::Header;

use crate::error::StoreError;

/// Extension of Markdown notes
pub const NOTE_EXTENSION: &str = "md";

/// The trait that all note stores implement.
pub trait NoteStore: Send + Sync {
    /// Whether a note, file or folder exists at `path`.
    fn exists(&self, path: &str) -> bool;

    /// Read a file's full content.
    fn read(&self, path: &str) -> Result<String, StoreError>;

    /// Create a new file. Fails if something is already there.
    fn create(&self, path: &str, content: &str) -> Result<(), StoreError>;

    /// Replace the content of an existing file.
    fn modify(&self, path: &str, content: &str) -> Result<(), StoreError>;

    /// Front matter headers of all notes under `prefix`, sorted by path.
    ///
    /// An empty prefix covers the whole store. Notes without front matter
    /// are left out, as are notes that cannot be read or whose front
    /// matter cannot be parsed.
    fn list_headers(&self, prefix: &str) -> Result<Vec<(String, Header)>, StoreError>;
}

/// Parse the header of a listed note, logging and skipping bad ones
pub(crate) fn listed_header(path: &str, content: &str) -> Option<Header> {
    match crate::frontmatter::split_frontmatter(content) {
        Ok((header, _)) => header,
        Err(e) => {
            tracing::warn!("Skipping {}: unreadable front matter: {}", path, e);
            None
        }
    }
}

pub(crate) fn is_note(path: &str) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && ext == NOTE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_note() {
        assert!(is_note("Literature/Paper.md"));
        assert!(is_note("Paper.md"));
        assert!(!is_note("library.bib"));
        assert!(!is_note("Literature/README"));
        assert!(!is_note(".md"));
    }

    #[test]
    fn test_listed_header_skips_bad_front_matter() {
        assert!(listed_header("a.md", "---\nkey: [oops\n---\n").is_none());
        assert!(listed_header("b.md", "no header").is_none());
        assert!(listed_header("c.md", "---\ncitationKey: c\n---\n").is_some());
    }
}
