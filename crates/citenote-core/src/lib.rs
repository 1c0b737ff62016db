//! Citenote Core - literature notes from BibTeX citations
//!
//! - **Config**: user settings loaded from TOML
//! - **Frontmatter**: YAML headers of Markdown notes
//! - **Store**: the [`NoteStore`] trait with on-disk and in-memory stores
//! - **Librarian**: note creation, metadata attachment and mirror sync
//! - **Mirror**: `.bib` rendering from note headers

pub mod config;
pub mod error;
pub mod frontmatter;
pub mod librarian;
pub mod mirror;
pub mod store;

pub use config::CitenoteConfig;
pub use error::{CitenoteError, ConfigError, FrontmatterError, Result, StoreError};
pub use librarian::{Librarian, NoteOutcome, SyncOutcome};
pub use store::{FsStore, MemoryStore, NoteStore};
