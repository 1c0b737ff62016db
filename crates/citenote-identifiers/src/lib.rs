//! Identifier derivation for literature notes
//!
//! This crate provides the two names every literature note carries:
//! - Cite key generation, uniquification and collection scanning
//! - Note filename sanitizing with smart truncation

pub mod cite_key;
pub mod filename;

pub use cite_key::*;
pub use filename::*;
