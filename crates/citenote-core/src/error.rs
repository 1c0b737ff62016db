//! Error types for citenote-core

use std::path::PathBuf;

use citenote_bibtex::ParseError;
use thiserror::Error;

/// Result type alias for citenote operations
pub type Result<T> = std::result::Result<T, CitenoteError>;

/// Main error type for note operations
#[derive(Error, Debug)]
pub enum CitenoteError {
    /// The pasted citation could not be parsed
    #[error("Failed to parse BibTeX entry: {0}")]
    Parse(#[from] ParseError),

    /// A required setting is empty
    #[error("Missing configuration: {0} is not set")]
    MissingConfiguration(&'static str),

    /// The literature folder does not exist in the store
    #[error("Literature folder \"{0}\" does not exist")]
    DestinationMissing(String),

    /// The note to be created is already there
    #[error("Note \"{0}\" already exists")]
    AlreadyExists(String),

    /// The note to attach metadata to is not there
    #[error("Note not found: {0}")]
    NoteNotFound(String),

    /// A note's front matter could not be read or written
    #[error("Front matter error: {0}")]
    Frontmatter(#[from] FrontmatterError),

    /// Store-related errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors from a note store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Absolute paths and `..` components are refused
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Front matter errors
#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported value: {0}")]
    Value(#[from] serde_json::Error),

    /// The block parsed, but not to a key/value mapping
    #[error("Front matter is not a mapping")]
    NotAMapping,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Cannot serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
