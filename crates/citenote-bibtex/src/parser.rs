//! BibTeX parser implementation using nom
//!
//! This parser handles standard BibTeX format including:
//! - @string definitions
//! - @preamble declarations
//! - @comment sections
//! - All standard entry types
//! - Braced, quoted and bare numeric field values
//! - String concatenation with #
//! - Nested braces in field values
//!
//! Entry types and field names are lower-cased. Field values are decoded
//! from LaTeX to plain text, and a field that occurs more than once is
//! flattened into a single `" and "`-joined value.

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::map,
    IResult,
};
use std::collections::HashMap;
use tracing::debug;

use crate::entry::BibRecord;
use crate::latex_decoder::decode_latex;

/// Parse error information for one entry of a multi-entry file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibTeXParseError {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

/// Result of parsing a BibTeX file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BibTeXParseResult {
    pub entries: Vec<BibRecord>,
    pub preambles: Vec<String>,
    pub strings: HashMap<String, String>,
    pub errors: Vec<BibTeXParseError>,
}

/// Error type for parsing failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("BibTeX input is empty")]
    Empty,
    #[error("No BibTeX entry found")]
    NoEntry,
    #[error("Entry type is missing after '@' (line {line})")]
    MissingEntryType { line: u32 },
    #[error("Citation key is missing (line {line})")]
    MissingCitationKey { line: u32 },
    #[error("Unbalanced braces in entry starting at line {line}")]
    UnbalancedBraces { line: u32 },
    #[error("Invalid syntax in entry starting at line {line}")]
    InvalidSyntax { line: u32 },
}

/// Parse a BibTeX string containing any number of entries.
///
/// Malformed entries are recorded in [`BibTeXParseResult::errors`] and
/// skipped; only blank input is an error.
pub fn parse(input: &str) -> Result<BibTeXParseResult, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let mut result = BibTeXParseResult::default();
    let mut remaining = input;

    while let Some(at) = next_at(remaining) {
        let line = line_of(input, at);
        match parse_at_entry(at, &result.strings, line) {
            Ok((rest, entry)) => {
                match entry {
                    AtEntry::Entry(record) => result.entries.push(record),
                    AtEntry::String(key, value) => {
                        result.strings.insert(key, value);
                    }
                    AtEntry::Preamble(text) => result.preambles.push(text),
                    AtEntry::Comment => {}
                }
                remaining = rest;
            }
            Err(err) => {
                debug!(line, %err, "skipping malformed entry");
                result.errors.push(BibTeXParseError {
                    line,
                    column: 1,
                    message: err.to_string(),
                });
                remaining = &at[1..];
            }
        }
    }

    Ok(result)
}

/// Parse the first entry of a BibTeX string.
///
/// `@string` definitions before the entry are applied; everything after the
/// first regular entry is ignored. An entry with no fields is valid.
pub fn parse_entry(input: &str) -> Result<BibRecord, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let mut strings = HashMap::new();
    let mut remaining = input;

    while let Some(at) = next_at(remaining) {
        let line = line_of(input, at);
        let (rest, entry) = parse_at_entry(at, &strings, line)?;
        match entry {
            AtEntry::Entry(record) => return Ok(record),
            AtEntry::String(key, value) => {
                strings.insert(key, value);
            }
            AtEntry::Preamble(_) | AtEntry::Comment => {}
        }
        remaining = rest;
    }

    Err(ParseError::NoEntry)
}

/// Result of parsing an @ entry
enum AtEntry {
    Entry(BibRecord),
    String(String, String),
    Preamble(String),
    Comment,
}

/// Advance to the next `@`, skipping whitespace, `%` line comments and any
/// free text between entries.
fn next_at(input: &str) -> Option<&str> {
    let mut rest = input;
    loop {
        rest = rest.trim_start();
        if rest.starts_with('%') {
            let end = rest.find('\n').unwrap_or(rest.len());
            rest = &rest[end..];
            continue;
        }
        if rest.starts_with('@') {
            return Some(rest);
        }
        let pos = rest.find('@')?;
        rest = &rest[pos..];
    }
}

/// 1-based line number of `rest` within `input`
fn line_of(input: &str, rest: &str) -> u32 {
    let consumed = &input[..input.len() - rest.len()];
    consumed.matches('\n').count() as u32 + 1
}

/// Parse an @ entry (entry, string, preamble, or comment)
fn parse_at_entry<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
    line: u32,
) -> Result<(&'a str, AtEntry), ParseError> {
    let syntax = |_| ParseError::InvalidSyntax { line };

    let (rest, _) = char::<_, nom::error::Error<&str>>('@')(input).map_err(syntax)?;
    let (rest, _) = multispace0::<_, nom::error::Error<&str>>(rest).map_err(syntax)?;
    let (rest, entry_type) = identifier(rest).map_err(|_| ParseError::MissingEntryType { line })?;
    let entry_type = entry_type.to_lowercase();
    let rest = rest.trim_start();

    if entry_type == "comment" && !rest.starts_with('{') {
        let end = rest.find('\n').unwrap_or(rest.len());
        return Ok((&rest[end..], AtEntry::Comment));
    }

    if !rest.starts_with('{') {
        return Err(ParseError::InvalidSyntax { line });
    }
    let (after, braced) =
        parse_braced_content(rest).map_err(|_| ParseError::UnbalancedBraces { line })?;
    let body = &braced[1..braced.len() - 1];

    let entry = match entry_type.as_str() {
        "comment" => AtEntry::Comment,
        "string" => {
            let (rest, (key, value)) = parse_single_field(body, strings).map_err(syntax)?;
            expect_end(rest, line)?;
            AtEntry::String(key.to_lowercase(), value)
        }
        "preamble" => {
            let (rest, value) = parse_field_value(body.trim_start(), strings).map_err(syntax)?;
            expect_end(rest, line)?;
            AtEntry::Preamble(value)
        }
        _ => AtEntry::Entry(parse_entry_body(body, entry_type, strings, line)?),
    };

    Ok((after, entry))
}

/// Parse the text between an entry's outer braces
fn parse_entry_body(
    body: &str,
    entry_type: String,
    strings: &HashMap<String, String>,
    line: u32,
) -> Result<BibRecord, ParseError> {
    let body = body.trim_start();
    let (rest, cite_key) =
        citation_key(body).map_err(|_| ParseError::MissingCitationKey { line })?;
    let rest = rest.trim_start();

    let mut record = BibRecord::with_key(entry_type, cite_key);
    if rest.is_empty() {
        return Ok(record);
    }

    let Some(rest) = rest.strip_prefix(',') else {
        // `@article{title = {...}}`: the first token was a field name
        return Err(if rest.starts_with('=') {
            ParseError::MissingCitationKey { line }
        } else {
            ParseError::InvalidSyntax { line }
        });
    };

    let (rest, fields) =
        parse_fields(rest, strings).map_err(|_| ParseError::InvalidSyntax { line })?;
    expect_end(rest, line)?;

    for (key, value) in fields {
        record.append_field(key.to_lowercase(), decode_latex(&value));
    }

    Ok(record)
}

fn expect_end(rest: &str, line: u32) -> Result<(), ParseError> {
    if rest.trim().is_empty() {
        Ok(())
    } else {
        Err(ParseError::InvalidSyntax { line })
    }
}

/// Entry types, field names and macro names
fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')(input)
}

fn citation_key(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && !",{}=\"#%()".contains(c))(input)
}

/// Parse fields within an entry
fn parse_fields<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, Vec<(String, String)>> {
    let mut fields = Vec::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;

        if rest.is_empty() {
            return Ok((rest, fields));
        }

        match parse_single_field(rest, strings) {
            Ok((rest, (key, value))) => {
                fields.push((key, value));
                remaining = rest;

                // Skip optional comma
                let (rest, _) = multispace0(remaining)?;
                match rest.strip_prefix(',') {
                    Some(stripped) => remaining = stripped,
                    None => return Ok((rest, fields)),
                }
            }
            Err(_) => {
                // Leftover text is reported by the caller
                return Ok((rest, fields));
            }
        }
    }
}

/// Parse a single field (key = value)
fn parse_single_field<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, _) = multispace0(input)?;
    let (rest, key) = identifier(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, value) = parse_field_value(rest, strings)?;

    Ok((rest, (key.to_string(), value)))
}

/// Parse a field value (braced, quoted, number, or string reference)
fn parse_field_value<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, String> {
    let mut result = String::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;

        let (rest, part) = alt((
            parse_braced_value,
            parse_quoted_value,
            map(take_while1(|c: char| c.is_ascii_digit()), |s: &str| {
                s.to_string()
            }),
            map(identifier, |s: &str| {
                // String reference
                strings
                    .get(&s.to_lowercase())
                    .cloned()
                    .unwrap_or_else(|| s.to_string())
            }),
        ))(rest)?;

        result.push_str(&part);
        remaining = rest;

        // Check for concatenation
        let (rest, _) = multispace0(remaining)?;
        if let Some(stripped) = rest.strip_prefix('#') {
            remaining = stripped;
        } else {
            return Ok((rest, result));
        }
    }
}

/// Parse a braced value {content}
fn parse_braced_value(input: &str) -> IResult<&str, String> {
    let (rest, content) = parse_braced_content(input)?;
    // Remove outer braces
    let inner = &content[1..content.len() - 1];
    Ok((rest, inner.to_string()))
}

/// Parse braced content including nested braces
fn parse_braced_content(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('{') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }

    let mut depth = 0;
    let mut pos = 0;
    let bytes = input.as_bytes();

    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[pos + 1..], &input[..pos + 1]));
                }
            }
            b'\\' => {
                // Skip escaped character
                pos += 1;
            }
            _ => {}
        }
        pos += 1;
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

/// Parse a quoted value "content"
fn parse_quoted_value(input: &str) -> IResult<&str, String> {
    if !input.starts_with('"') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }

    let mut result = String::new();
    let mut brace_depth = 0;
    let mut chars = input.char_indices().skip(1);

    while let Some((pos, c)) = chars.next() {
        match c {
            '"' if brace_depth == 0 => {
                return Ok((&input[pos + 1..], result));
            }
            '{' => {
                brace_depth += 1;
                result.push('{');
            }
            '}' => {
                brace_depth -= 1;
                result.push('}');
            }
            '\\' => {
                // Keep escape sequences intact for the LaTeX decoder
                result.push('\\');
                if let Some((_, escaped)) = chars.next() {
                    result.push(escaped);
                }
            }
            c => result.push(c),
        }
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}
