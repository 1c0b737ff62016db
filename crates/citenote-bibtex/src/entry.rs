//! BibTeX record data structures

use serde::{Deserialize, Serialize};

/// Header key holding the citation key of a note
pub const CITATION_KEY: &str = "citationKey";

/// Header key holding the entry type of a note
pub const ENTRY_TYPE: &str = "entryType";

/// Entry type used when a record does not carry one
pub const DEFAULT_ENTRY_TYPE: &str = "misc";

/// Separator used to flatten multi-valued fields into one string
pub const MULTI_VALUE_SEPARATOR: &str = " and ";

/// Returns true for the two names that live on the record itself
/// rather than in its field map.
pub fn is_reserved_key(key: &str) -> bool {
    key == CITATION_KEY || key == ENTRY_TYPE
}

/// A single BibTeX field (key-value pair)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibField {
    pub key: String,
    pub value: String,
}

/// One bibliographic entry: entry type, optional citation key and an
/// ordered field map with unique keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibRecord {
    pub entry_type: String,
    pub citation_key: Option<String>,
    fields: Vec<BibField>,
}

impl BibRecord {
    /// Create an empty record of the given type
    pub fn new(entry_type: impl Into<String>) -> Self {
        Self {
            entry_type: entry_type.into(),
            citation_key: None,
            fields: Vec::new(),
        }
    }

    /// Create an empty record with a citation key already assigned
    pub fn with_key(entry_type: impl Into<String>, citation_key: impl Into<String>) -> Self {
        Self {
            citation_key: Some(citation_key.into()),
            ..Self::new(entry_type)
        }
    }

    /// Set a field, replacing the value in place if the key already exists.
    ///
    /// Reserved keys (`citationKey`, `entryType`) are ignored and `false` is
    /// returned.
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if is_reserved_key(&key) {
            return false;
        }
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.key == key) {
            Some(field) => field.value = value,
            None => self.fields.push(BibField { key, value }),
        }
        true
    }

    /// Append a value to a field, joining with `" and "` when the field is
    /// already present. Keys match exactly, as in [`BibRecord::set_field`].
    pub fn append_field(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        let value = value.into();
        let joined = match self.field(&key) {
            Some(existing) => format!("{existing}{MULTI_VALUE_SEPARATOR}{value}"),
            None => value,
        };
        self.set_field(key, joined)
    }

    /// Get a field value by exact key
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
    }

    /// Get a field value by key (case-insensitive)
    pub fn get_field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key.eq_ignore_ascii_case(key))
            .map(|f| f.value.as_str())
    }

    /// Fields in insertion order
    pub fn fields(&self) -> &[BibField] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get the title field
    pub fn title(&self) -> Option<&str> {
        self.get_field("title")
    }

    /// Get the author field
    pub fn author(&self) -> Option<&str> {
        self.get_field("author")
    }

    /// Get the year field
    pub fn year(&self) -> Option<&str> {
        self.get_field("year")
    }

    /// Get the URL field
    pub fn url(&self) -> Option<&str> {
        self.get_field("url")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_field_replaces_in_place() {
        let mut record = BibRecord::new("article");
        record.set_field("title", "First");
        record.set_field("year", "2024");
        record.set_field("title", "Second");

        let keys: Vec<&str> = record.fields().iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["title", "year"]);
        assert_eq!(record.title(), Some("Second"));
    }

    #[test]
    fn test_reserved_keys_never_enter_fields() {
        let mut record = BibRecord::new("book");
        assert!(!record.set_field(CITATION_KEY, "smith2024"));
        assert!(!record.set_field(ENTRY_TYPE, "article"));
        assert!(record.is_empty());
        assert_eq!(record.entry_type, "book");
    }

    #[test]
    fn test_append_field_joins_with_and() {
        let mut record = BibRecord::new("article");
        record.append_field("author", "Jane Doe");
        record.append_field("author", "John Roe");
        assert_eq!(record.author(), Some("Jane Doe and John Roe"));
    }

    #[test]
    fn test_append_field_matches_keys_exactly() {
        let mut record = BibRecord::new("article");
        record.set_field("Author", "Jane Doe");
        record.append_field("author", "John Roe");

        assert_eq!(record.field("Author"), Some("Jane Doe"));
        assert_eq!(record.field("author"), Some("John Roe"));
        assert_eq!(record.fields().len(), 2);
    }

    #[test]
    fn test_field_access_case() {
        let mut record = BibRecord::with_key("article", "smith2024great");
        record.set_field("Author", "John Smith");

        assert_eq!(record.author(), Some("John Smith"));
        assert_eq!(record.field("author"), None);
        assert_eq!(record.field("Author"), Some("John Smith"));
        assert_eq!(record.citation_key.as_deref(), Some("smith2024great"));
        assert_eq!(record.url(), None);
    }
}
