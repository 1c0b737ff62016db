//! BibTeX formatting module
//!
//! Converts BibRecord structures back to BibTeX string format.

use super::entry::{BibRecord, DEFAULT_ENTRY_TYPE};

/// Characters that must be escaped in BibTeX field values, in the order the
/// substitutions are applied.
const SPECIAL_CHARS: &[(char, &str)] = &[
    ('&', "\\&"),
    ('%', "\\%"),
    ('$', "\\$"),
    ('#', "\\#"),
    ('_', "\\_"),
    ('{', "\\{"),
    ('}', "\\}"),
    ('~', "\\textasciitilde{}"),
    ('^', "\\textasciicircum{}"),
    ('\\', "\\textbackslash{}"),
];

/// Format a single record:
///
/// ```text
/// @article{smith2023quantum,
///   author = {Smith, John},
///   year = {2023}
/// }
/// ```
pub fn format_entry(record: &BibRecord) -> String {
    let entry_type = if record.entry_type.is_empty() {
        DEFAULT_ENTRY_TYPE
    } else {
        record.entry_type.as_str()
    };

    let mut result = String::new();
    result.push('@');
    result.push_str(entry_type);
    result.push('{');
    result.push_str(record.citation_key.as_deref().unwrap_or_default());
    result.push(',');
    result.push('\n');

    let fields = record.fields();
    for (i, field) in fields.iter().enumerate() {
        result.push_str("  ");
        result.push_str(&field.key);
        result.push_str(" = {");
        result.push_str(&escape_value(&field.value));
        result.push('}');
        if i + 1 < fields.len() {
            result.push(',');
        }
        result.push('\n');
    }

    result.push('}');
    result
}

/// Format the records of a mirrored bibliography file.
///
/// Records are sorted by citation key (byte order) so regenerating the file
/// from the same collection always yields the same text. Entries are
/// separated by one blank line and the file ends with a single newline.
pub fn format_collection(records: &[BibRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let mut sorted: Vec<&BibRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.citation_key.cmp(&b.citation_key));

    let mut result = sorted
        .into_iter()
        .map(format_entry)
        .collect::<Vec<_>>()
        .join("\n\n");
    result.push('\n');
    result
}

/// Escape special BibTeX characters in a value
pub fn escape_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match SPECIAL_CHARS.iter().find(|(special, _)| *special == c) {
            Some((_, escaped)) => result.push_str(escaped),
            None => result.push(c),
        }
    }
    result
}
