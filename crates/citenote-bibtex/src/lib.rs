//! BibTeX parsing and formatting
//!
//! This crate provides the record pipeline shared by every citenote tool:
//! a BibTeX parser and a formatter that keep round-trip fidelity with each
//! other, plus extraction of records from structured note headers.
//!
//! Features:
//! - Nom-based parser for robust BibTeX parsing
//! - LaTeX special character decoding
//! - Escaping formatter with deterministic collection output
//! - Note header to record conversion

mod entry;
mod extract;
mod formatter;
mod latex_decoder;
pub mod parser;

pub use entry::{
    is_reserved_key, BibField, BibRecord, CITATION_KEY, DEFAULT_ENTRY_TYPE, ENTRY_TYPE,
    MULTI_VALUE_SEPARATOR,
};
pub use extract::{extract_record, Header, EXCLUDED_HEADER_KEYS};
pub use formatter::{escape_value, format_collection, format_entry};
pub use parser::{parse, parse_entry, BibTeXParseError, BibTeXParseResult, ParseError};

pub use latex_decoder::decode_latex;
