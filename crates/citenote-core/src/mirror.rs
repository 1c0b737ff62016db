//! Bibliography mirror
//!
//! The mirror is a `.bib` file regenerated from the headers of every note
//! in the literature folder.

use std::borrow::Borrow;

use citenote_bibtex::{extract_record, format_collection, BibRecord, Header};

/// Records for every header that carries a citation key
pub fn collection_records<I, H>(headers: I) -> Vec<BibRecord>
where
    I: IntoIterator<Item = H>,
    H: Borrow<Header>,
{
    headers
        .into_iter()
        .filter_map(|header| extract_record(header.borrow()))
        .collect()
}

/// Render the mirrored bibliography for a set of note headers
pub fn render_bibliography<I, H>(headers: I) -> String
where
    I: IntoIterator<Item = H>,
    H: Borrow<Header>,
{
    format_collection(&collection_records(headers))
}
