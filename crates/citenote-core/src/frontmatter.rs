//! YAML front matter of Markdown notes
//!
//! A note header is the YAML block between a leading `---` line and the
//! next `---`. Headers are handled as JSON-compatible maps ([`Header`]) so
//! that key order survives a read/modify/write cycle.

use citenote_bibtex::Header;
use serde_json::Value;

use crate::error::FrontmatterError;

const DELIMITER: &str = "---";

/// Split a note into its parsed header and the body that follows it.
///
/// Returns `None` for the header when the note does not open with a
/// front matter block; the whole note is then the body.
pub fn split_frontmatter(content: &str) -> Result<(Option<Header>, &str), FrontmatterError> {
    let Some((yaml, body)) = locate(content) else {
        return Ok((None, content));
    };
    Ok((Some(parse_header(yaml)?), body))
}

/// Parse a YAML block into a header. An empty block is an empty header.
pub fn parse_header(yaml: &str) -> Result<Header, FrontmatterError> {
    let yaml_value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
    match serde_json::to_value(yaml_value)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Header::new()),
        _ => Err(FrontmatterError::NotAMapping),
    }
}

/// Render a note from a header and body: `---\n{yaml}---\n{body}`
pub fn render_note(header: &Header, body: &str) -> Result<String, FrontmatterError> {
    let yaml = if header.is_empty() {
        String::new()
    } else {
        serde_yaml::to_string(header)?
    };
    Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n{body}"))
}

/// Find the YAML text and the body of a note with front matter.
///
/// The block opens with `---` on the first line and closes at the first
/// following line that starts with `---`. A single newline after the
/// closing delimiter belongs to the block.
fn locate(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix("---\n")?;

    let (yaml, after) = if let Some(after) = rest.strip_prefix(DELIMITER) {
        ("", after)
    } else {
        let end = rest.find("\n---")?;
        (&rest[..end], &rest[end + 1 + DELIMITER.len()..])
    };

    let body = after.strip_prefix('\n').unwrap_or(after);
    Some((yaml, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_basic() {
        let note = "---\ncitationKey: smith2023quantum\nyear: '2023'\n---\n# Notes\nBody";
        let (header, body) = split_frontmatter(note).unwrap();
        let header = header.unwrap();
        assert_eq!(header["citationKey"], json!("smith2023quantum"));
        assert_eq!(header["year"], json!("2023"));
        assert_eq!(body, "# Notes\nBody");
    }

    #[test]
    fn test_split_without_frontmatter() {
        let note = "# Just a note\n---\nnot: header\n";
        let (header, body) = split_frontmatter(note).unwrap();
        assert!(header.is_none());
        assert_eq!(body, note);
    }

    #[test]
    fn test_split_unterminated_block() {
        let note = "---\ntitle: open\n";
        let (header, body) = split_frontmatter(note).unwrap();
        assert!(header.is_none());
        assert_eq!(body, note);
    }

    #[test]
    fn test_split_empty_block() {
        let (header, body) = split_frontmatter("---\n---\nBody").unwrap();
        assert_eq!(header, Some(Header::new()));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_split_preserves_key_order_and_lists() {
        let note = "---\nzeta: 1\naliases:\n  - One\n  - Two\nalpha: true\n---\n";
        let (header, body) = split_frontmatter(note).unwrap();
        let header = header.unwrap();
        let keys: Vec<&str> = header.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "aliases", "alpha"]);
        assert_eq!(header["aliases"], json!(["One", "Two"]));
        assert_eq!(header["zeta"], json!(1));
        assert_eq!(body, "");
    }

    #[test]
    fn test_split_invalid_yaml() {
        let err = split_frontmatter("---\nkey: [unclosed\n---\n").unwrap_err();
        assert!(matches!(err, FrontmatterError::Yaml(_)));
    }

    #[test]
    fn test_split_scalar_block() {
        let err = split_frontmatter("---\njust text\n---\n").unwrap_err();
        assert!(matches!(err, FrontmatterError::NotAMapping));
    }

    #[test]
    fn test_render_note() {
        let mut header = Header::new();
        header.insert("citationKey".into(), json!("doe2021"));
        header.insert("aliases".into(), json!(["A: Title"]));
        let note = render_note(&header, "Body\n").unwrap();
        assert!(note.starts_with("---\ncitationKey: doe2021\n"));
        assert!(note.ends_with("---\nBody\n"));

        let (parsed, body) = split_frontmatter(&note).unwrap();
        assert_eq!(parsed, Some(header));
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn test_render_keeps_numeric_strings_as_strings() {
        let mut header = Header::new();
        header.insert("year".into(), json!("2023"));
        let note = render_note(&header, "").unwrap();
        let (parsed, _) = split_frontmatter(&note).unwrap();
        assert_eq!(parsed.unwrap()["year"], json!("2023"));
    }
}
