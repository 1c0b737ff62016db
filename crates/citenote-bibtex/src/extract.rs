//! Record extraction from structured note headers

use serde_json::{Map, Value};

use crate::entry::{
    is_reserved_key, BibRecord, CITATION_KEY, DEFAULT_ENTRY_TYPE, ENTRY_TYPE,
    MULTI_VALUE_SEPARATOR,
};

/// A note's structured header: the key/value block stored ahead of the
/// note body. Key order is preserved.
pub type Header = Map<String, Value>;

/// Header keys that describe the note rather than the publication
pub const EXCLUDED_HEADER_KEYS: &[&str] = &["aliases", "cssclass", "cssclasses", "tags", "position"];

/// Build a record from a note header.
///
/// Returns `None` when the header has no non-empty string `citationKey`.
/// Sequences are joined with `" and "`; nulls, nested mappings, excluded
/// keys and values that are empty after conversion are dropped. Inside a
/// sequence only scalar elements are joined: null, sequence and mapping
/// elements are skipped.
pub fn extract_record(header: &Header) -> Option<BibRecord> {
    let citation_key = match header.get(CITATION_KEY) {
        Some(Value::String(key)) if !key.is_empty() => key.clone(),
        _ => return None,
    };

    let entry_type = match header.get(ENTRY_TYPE) {
        Some(Value::String(entry_type)) => entry_type.clone(),
        _ => DEFAULT_ENTRY_TYPE.to_string(),
    };

    let mut record = BibRecord::with_key(entry_type, citation_key);
    for (key, value) in header {
        if is_reserved_key(key) || EXCLUDED_HEADER_KEYS.contains(&key.as_str()) {
            continue;
        }
        if let Some(text) = value_to_field(value).filter(|text| !text.is_empty()) {
            record.set_field(key.clone(), text);
        }
    }

    Some(record)
}

/// Convert a header value to a flat field string
fn value_to_field(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Object(_) => None,
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(scalar_to_string)
                .collect::<Vec<_>>()
                .join(MULTI_VALUE_SEPARATOR),
        ),
        scalar => scalar_to_string(scalar),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn header(value: Value) -> Header {
        match value {
            Value::Object(map) => map,
            _ => panic!("header fixture must be an object"),
        }
    }

    #[test]
    fn test_exclusions_and_reserved_keys() {
        let record = extract_record(&header(json!({
            "tags": ["x"],
            "citationKey": "k1",
            "entryType": "book",
            "author": "A",
        })))
        .unwrap();

        assert_eq!(record.citation_key.as_deref(), Some("k1"));
        assert_eq!(record.entry_type, "book");
        assert_eq!(record.fields().len(), 1);
        assert_eq!(record.field("author"), Some("A"));
    }

    #[test]
    fn test_missing_or_empty_key() {
        assert!(extract_record(&header(json!({"author": "A"}))).is_none());
        assert!(extract_record(&header(json!({"citationKey": ""}))).is_none());
        assert!(extract_record(&header(json!({"citationKey": 42}))).is_none());
    }

    #[test]
    fn test_entry_type_defaults_to_misc() {
        let record = extract_record(&header(json!({"citationKey": "k", "entryType": 3}))).unwrap();
        assert_eq!(record.entry_type, "misc");

        let record = extract_record(&header(json!({"citationKey": "k"}))).unwrap();
        assert_eq!(record.entry_type, "misc");
    }

    #[test]
    fn test_value_flattening() {
        let record = extract_record(&header(json!({
            "citationKey": "k",
            "author": ["Jane Doe", "John Roe"],
            "year": 2021,
            "peerReviewed": true,
            "extra": {"nested": "dropped"},
            "note": null,
            "abstract": "",
            "aliases": ["Display Title"],
            "cssclasses": ["wide"],
            "position": {"start": 0},
        })))
        .unwrap();

        let keys: Vec<&str> = record.fields().iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["author", "year", "peerReviewed"]);
        assert_eq!(record.field("author"), Some("Jane Doe and John Roe"));
        assert_eq!(record.field("year"), Some("2021"));
        assert_eq!(record.field("peerReviewed"), Some("true"));
    }

    #[test]
    fn test_sequence_skips_non_scalar_elements() {
        let record = extract_record(&header(json!({
            "citationKey": "k",
            "keywords": ["optics", null, {"a": 1}, ["nested"], 7, false],
            "empty": [null],
        })))
        .unwrap();

        assert_eq!(record.field("keywords"), Some("optics and 7 and false"));
        assert_eq!(record.field("empty"), None);
    }
}
