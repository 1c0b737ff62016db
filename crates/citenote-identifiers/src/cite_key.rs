//! Cite key generation
//!
//! Provides functions for generating BibTeX cite keys from metadata,
//! with support for collision detection and uniquification.
//!
//! Keys have the shape `<lastname><year><titleword>`, all lowercase, e.g.
//! `smith2023quantum`. Collisions are resolved by appending `-1`, `-2`, …

use std::borrow::Borrow;
use std::collections::HashSet;

use citenote_bibtex::{Header, CITATION_KEY};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// BibTeX separates authors with " and " (any case, any whitespace)
    static ref AUTHOR_SEPARATOR: Regex = Regex::new(r"(?i)\s+and\s+").unwrap();
}

/// Title words never used as the key's title component
const STOP_WORDS: &[&str] = &["the", "a", "an", "of", "on", "in", "for", "to", "and", "or"];

/// Placeholder for a missing author, and the key of last resort
pub const UNKNOWN_KEY: &str = "unknown";

/// Generate a cite key from author, year, and title
pub fn generate_cite_key(author: Option<&str>, year: Option<&str>, title: Option<&str>) -> String {
    let author_part = first_author_last_name(author);
    let year_part = year.unwrap_or_default();
    let title_part = first_title_word(title).unwrap_or_default();

    let key = format!("{author_part}{year_part}{title_part}").to_lowercase();
    if key.is_empty() {
        UNKNOWN_KEY.to_string()
    } else {
        key
    }
}

/// Generate a cite key and make it unique against `existing_keys`
pub fn generate_unique_cite_key(
    author: Option<&str>,
    year: Option<&str>,
    title: Option<&str>,
    existing_keys: &HashSet<String>,
) -> (String, bool) {
    let base = generate_cite_key(author, year, title);
    find_unique_cite_key(&base, existing_keys)
}

/// Make a cite key unique by adding `-N` suffixes if needed.
///
/// Returns the key and whether a collision had to be resolved.
pub fn find_unique_cite_key(base: &str, existing_keys: &HashSet<String>) -> (String, bool) {
    if !existing_keys.contains(base) {
        return (base.to_string(), false);
    }

    let mut suffix = 1u64;
    loop {
        let candidate = format!("{base}-{suffix}");
        if !existing_keys.contains(&candidate) {
            return (candidate, true);
        }
        suffix += 1;
    }
}

/// Collect the citation keys of every header stored under `folder`.
///
/// A path belongs to the folder when it equals it or starts with
/// `folder/`; an empty folder matches every path. Only non-empty string
/// `citationKey` values are collected.
pub fn collect_citation_keys<I, P, H>(headers: I, folder: &str) -> HashSet<String>
where
    I: IntoIterator<Item = (P, H)>,
    P: AsRef<str>,
    H: Borrow<Header>,
{
    headers
        .into_iter()
        .filter(|(path, _)| in_folder(path.as_ref(), folder))
        .filter_map(|(_, header)| {
            header
                .borrow()
                .get(CITATION_KEY)
                .and_then(|value| value.as_str())
                .filter(|key| !key.is_empty())
                .map(str::to_string)
        })
        .collect()
}

/// Whether `path` lies inside `folder` (or is the folder itself)
pub fn in_folder(path: &str, folder: &str) -> bool {
    let folder = folder.trim_end_matches('/');
    folder.is_empty()
        || path == folder
        || path
            .strip_prefix(folder)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Extract the last name of the first author
///
/// Handles formats:
/// - "Last, First"
/// - "First Last"
/// - "First Middle Last"
fn first_author_last_name(author: Option<&str>) -> String {
    let Some(author) = author.filter(|a| !a.is_empty()) else {
        return UNKNOWN_KEY.to_string();
    };

    let first_author = AUTHOR_SEPARATOR
        .split(author)
        .next()
        .unwrap_or_default()
        .trim();
    if first_author.is_empty() {
        return UNKNOWN_KEY.to_string();
    }

    if let Some((last_name, _)) = first_author.split_once(',') {
        let letters = ascii_letters(last_name.trim());
        return if letters.is_empty() {
            UNKNOWN_KEY.to_string()
        } else {
            letters
        };
    }

    // "First Last" - take the last word; may strip to nothing
    first_author
        .split_whitespace()
        .last()
        .map(ascii_letters)
        .unwrap_or_default()
}

/// Get first significant word from title
///
/// Skips stop words and tokens with no ASCII letters
fn first_title_word(title: Option<&str>) -> Option<String> {
    title?
        .to_lowercase()
        .split_whitespace()
        .map(ascii_letters)
        .find(|word| !word.is_empty() && !STOP_WORDS.contains(&word.as_str()))
}

fn ascii_letters(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_alphabetic()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_cite_key() {
        assert_eq!(
            generate_cite_key(Some("Smith, John"), Some("2023"), Some("A Quantum Theory")),
            "smith2023quantum"
        );
    }

    #[test]
    fn test_cite_key_all_missing() {
        assert_eq!(generate_cite_key(None, None, None), "unknown");
        assert_eq!(generate_cite_key(Some(""), Some(""), Some("")), "unknown");
    }

    #[test]
    fn test_cite_key_first_author_only() {
        assert_eq!(
            generate_cite_key(Some("Jane Doe and John Roe"), Some("2021"), None),
            "doe2021"
        );
        assert_eq!(
            generate_cite_key(Some("Jane Doe AND John Roe"), Some("2021"), None),
            "doe2021"
        );
    }

    #[test]
    fn test_extract_last_name() {
        assert_eq!(first_author_last_name(Some("John Smith")), "Smith");
        assert_eq!(first_author_last_name(Some("Smith, John")), "Smith");
        assert_eq!(first_author_last_name(Some("John van der Berg")), "Berg");
        assert_eq!(first_author_last_name(Some("O'Brien, Pat")), "OBrien");
        assert_eq!(first_author_last_name(Some("Alexander Anderson")), "Anderson");
    }

    #[test]
    fn test_comma_author_without_letters_is_unknown() {
        assert_eq!(first_author_last_name(Some("123, John")), "unknown");
    }

    #[test]
    fn test_space_author_without_letters_is_empty() {
        assert_eq!(first_author_last_name(Some("Team 42")), "");
        assert_eq!(
            generate_cite_key(Some("Team 42"), Some("2020"), Some("Results")),
            "2020results"
        );
    }

    #[test]
    fn test_first_significant_word() {
        assert_eq!(
            first_title_word(Some("The Quick Brown Fox")),
            Some("quick".to_string())
        );
        assert_eq!(
            first_title_word(Some("On the Origin of Species")),
            Some("origin".to_string())
        );
        assert_eq!(
            first_title_word(Some("(A) Study: in Scarlet")),
            Some("study".to_string())
        );
        assert_eq!(first_title_word(Some("The Of And")), None);
        assert_eq!(first_title_word(None), None);
    }

    #[test]
    fn test_make_cite_key_unique_no_conflict() {
        let existing: HashSet<String> = ["jones2024".to_string()].into_iter().collect();
        assert_eq!(
            find_unique_cite_key("smith2024", &existing),
            ("smith2024".to_string(), false)
        );
    }

    #[test]
    fn test_make_cite_key_unique_with_suffix() {
        let mut existing: HashSet<String> = HashSet::new();
        existing.insert("smith2023quantum".to_string());
        assert_eq!(
            find_unique_cite_key("smith2023quantum", &existing),
            ("smith2023quantum-1".to_string(), true)
        );

        existing.insert("smith2023quantum-1".to_string());
        assert_eq!(
            find_unique_cite_key("smith2023quantum", &existing),
            ("smith2023quantum-2".to_string(), true)
        );
    }

    #[test]
    fn test_in_folder() {
        assert!(in_folder("Literature/a.md", "Literature"));
        assert!(in_folder("Literature/sub/a.md", "Literature/"));
        assert!(in_folder("Literature", "Literature"));
        assert!(!in_folder("Literature2/a.md", "Literature"));
        assert!(in_folder("anything.md", ""));
    }
}
