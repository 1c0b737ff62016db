//! Note filename generation from publication titles
//!
//! Titles become note names: characters the vault cannot store are swapped
//! for look-alikes (or `-`), and long titles are cut at a natural break.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref UNSAFE_CHARS: Regex = Regex::new(r#"[/\\?%*:|"<>\x7F\x00-\x1F]"#).unwrap();
}

/// Longest note name, in characters
pub const MAX_FILENAME_LENGTH: usize = 80;

/// Breaks closer to the start than this are ignored when truncating
pub const MIN_SPLIT_OFFSET: usize = 30;

/// Readable stand-ins for characters that are not allowed in note names
const LOOKALIKES: &[(char, char)] = &[
    ('?', '\u{FE56}'),  // ﹖ small question mark
    (':', '\u{FE55}'),  // ﹕ small colon
    ('[', '\u{298F}'),  // ⦏ left square bracket with tick
    (']', '\u{2990}'),  // ⦐ right square bracket with tick
    ('/', '\u{29F8}'),  // ⧸ big solidus
    ('\\', '\u{29F9}'), // ⧹ big reverse solidus
    ('#', '\u{2D4C}'),  // ⵌ tifinagh letter tuareg yagh
];

/// Places a long title may be cut after, best first
const SPLIT_MARKS: &[char] = &[
    '|', '\u{2014}', '\u{2013}', ':', '\u{FE55}', ';', '?', '\u{FE56}', '!', '.', ')', ']',
    '\u{2990}', ',', '-',
];

/// Sanitize a title for use as a note name.
///
/// Never fails; an empty title gives an empty name and callers supply
/// their own fallback.
pub fn sanitize_filename(title: &str) -> String {
    let substituted: String = title
        .chars()
        .map(|c| {
            LOOKALIKES
                .iter()
                .find(|(unsafe_char, _)| *unsafe_char == c)
                .map_or(c, |(_, lookalike)| *lookalike)
        })
        .collect();

    let cleaned = UNSAFE_CHARS.replace_all(&substituted, "-");
    truncate_filename(&cleaned)
}

fn truncate_filename(filename: &str) -> String {
    let chars: Vec<char> = filename.chars().collect();
    if chars.len() <= MAX_FILENAME_LENGTH {
        return filename.to_string();
    }

    let window = &chars[..MAX_FILENAME_LENGTH];
    let cut = |end: usize| -> String {
        window[..end].iter().collect::<String>().trim_end().to_string()
    };

    for mark in SPLIT_MARKS {
        if let Some(pos) = window.iter().rposition(|c| c == mark) {
            if pos >= MIN_SPLIT_OFFSET {
                return cut(pos + 1);
            }
        }
    }

    match window.iter().rposition(|c| *c == ' ') {
        Some(pos) if pos >= MIN_SPLIT_OFFSET => cut(pos),
        _ => cut(MAX_FILENAME_LENGTH),
    }
}
