//! LaTeX character decoding
//!
//! Decodes the escapes written by the formatter, common accent commands and
//! named symbols to Unicode, and drops the grouping braces BibTeX uses for
//! case protection. Unknown commands that take a braced argument keep the
//! argument; unknown bare commands are left as written.

use std::collections::HashMap;

use lazy_static::lazy_static;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    /// Accent commands and the combining mark each one stands for.
    static ref ACCENTS: HashMap<&'static str, char> = [
        ("\"", '\u{0308}'), // umlaut
        ("'", '\u{0301}'),  // acute
        ("`", '\u{0300}'),  // grave
        ("^", '\u{0302}'),  // circumflex
        ("~", '\u{0303}'),  // tilde
        ("=", '\u{0304}'),  // macron
        (".", '\u{0307}'),  // dot above
        ("u", '\u{0306}'),  // breve
        ("v", '\u{030C}'),  // caron
        ("H", '\u{030B}'),  // double acute
        ("r", '\u{030A}'),  // ring
        ("c", '\u{0327}'),  // cedilla
        ("k", '\u{0328}'),  // ogonek
    ]
    .into_iter()
    .collect();

    /// Control words that expand to a fixed string.
    static ref SYMBOLS: HashMap<&'static str, &'static str> = [
        ("ss", "ß"),
        ("ae", "æ"), ("AE", "Æ"),
        ("oe", "œ"), ("OE", "Œ"),
        ("aa", "å"), ("AA", "Å"),
        ("o", "ø"), ("O", "Ø"),
        ("l", "ł"), ("L", "Ł"),
        ("i", "ı"), ("j", "ȷ"),
        ("textasciitilde", "~"),
        ("textasciicircum", "^"),
        ("textbackslash", "\\"),
        ("textendash", "–"),
        ("textemdash", "—"),
        ("ldots", "…"),
        ("dots", "…"),
        ("copyright", "©"),
        ("textregistered", "®"),
        ("texttrademark", "™"),
        ("pounds", "£"),
        ("euro", "€"),
        ("S", "§"),
        ("P", "¶"),
    ]
    .into_iter()
    .collect();
}

/// Characters that are written as `\c` and decode to themselves
const ESCAPED_LITERALS: &[char] = &['&', '%', '$', '#', '_', '{', '}', ' ', '\\'];

/// Decode a raw BibTeX field value to plain Unicode text
pub fn decode_latex(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let decoded = Decoder { chars: &chars, pos: 0 }.run();
    normalize_whitespace(&decoded)
}

struct Decoder<'a> {
    chars: &'a [char],
    pos: usize,
}

impl Decoder<'_> {
    fn run(mut self) -> String {
        let mut out = String::with_capacity(self.chars.len());
        while let Some(c) = self.next() {
            match c {
                '\\' => self.command(&mut out),
                '{' | '}' => {}
                '~' => out.push(' '),
                _ => out.push(c),
            }
        }
        out
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Decode whatever follows a backslash
    fn command(&mut self, out: &mut String) {
        let Some(c) = self.peek() else {
            out.push('\\');
            return;
        };

        if ESCAPED_LITERALS.contains(&c) {
            self.pos += 1;
            out.push(c);
            return;
        }

        if !c.is_ascii_alphabetic() {
            let name = c.to_string();
            if let Some(&mark) = ACCENTS.get(name.as_str()) {
                self.pos += 1;
                self.accent(mark, out);
            } else {
                self.pos += 1;
                out.push('\\');
                out.push(c);
            }
            return;
        }

        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        let name: String = self.chars[start..self.pos].iter().collect();

        if let Some(&mark) = ACCENTS.get(name.as_str()) {
            if matches!(self.peek(), Some(' ') | Some('{')) {
                self.accent(mark, out);
                return;
            }
        }

        if let Some(symbol) = SYMBOLS.get(name.as_str()) {
            out.push_str(symbol);
            self.skip_terminator();
            return;
        }

        // Formatting commands such as \emph{...} keep their argument; the
        // braces themselves are dropped by the main loop.
        if self.peek() != Some('{') {
            out.push('\\');
            out.push_str(&name);
        }
    }

    /// Apply an accent to the next character or braced group
    fn accent(&mut self, mark: char, out: &mut String) {
        while self.peek() == Some(' ') {
            self.pos += 1;
        }

        let argument = match self.peek() {
            Some('{') => {
                self.pos += 1;
                let start = self.pos;
                let mut depth = 1;
                while let Some(c) = self.next() {
                    match c {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                }
                let end = if depth == 0 { self.pos - 1 } else { self.pos };
                let inner: Vec<char> = self.chars[start..end].to_vec();
                Decoder { chars: &inner, pos: 0 }.run()
            }
            Some('\\') => {
                self.pos += 1;
                let mut decoded = String::new();
                self.command(&mut decoded);
                decoded
            }
            Some(c) => {
                self.pos += 1;
                c.to_string()
            }
            None => String::new(),
        };

        let mut rest = argument.chars();
        match rest.next() {
            Some(base) => {
                let base = match base {
                    'ı' => 'i',
                    'ȷ' => 'j',
                    other => other,
                };
                out.extend([base, mark].into_iter().nfc());
                out.extend(rest);
            }
            None => out.push(mark),
        }
    }

    /// Swallow the `{}` or single space that terminates a control word
    fn skip_terminator(&mut self) {
        if self.peek() == Some('{') && self.chars.get(self.pos + 1) == Some(&'}') {
            self.pos += 2;
        } else if self.peek() == Some(' ') {
            self.pos += 1;
        }
    }
}

/// Trim the value and fold line breaks (with their indentation) into a
/// single space.
fn normalize_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending = String::new();
    for c in input.trim().chars() {
        if c.is_whitespace() {
            pending.push(c);
            continue;
        }
        if !pending.is_empty() {
            if pending.contains('\n') || pending.contains('\r') {
                out.push(' ');
            } else {
                out.push_str(&pending);
            }
            pending.clear();
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_umlaut_decoding() {
        assert_eq!(decode_latex(r#"M\"uller"#), "Müller");
        assert_eq!(decode_latex(r#"M\"{u}ller"#), "Müller");
        assert_eq!(decode_latex(r#"Schr{\"o}dinger"#), "Schrödinger");
    }

    #[test]
    fn test_acute_accent() {
        assert_eq!(decode_latex(r"caf\'e"), "café");
        assert_eq!(decode_latex(r"caf\'{e}"), "café");
        assert_eq!(decode_latex(r"Garc\'{\i}a"), "García");
    }

    #[test]
    fn test_letter_accents() {
        assert_eq!(decode_latex(r"gar\c con"), "garçon");
        assert_eq!(decode_latex(r"\v{C}apek"), "Čapek");
        assert_eq!(decode_latex(r"ma\~nana"), "mañana");
    }

    #[test]
    fn test_formatter_escapes() {
        assert_eq!(decode_latex(r"10\% off"), "10% off");
        assert_eq!(decode_latex(r"Smith \& Jones"), "Smith & Jones");
        assert_eq!(decode_latex(r"snake\_case \{x\}"), "snake_case {x}");
        assert_eq!(decode_latex(r"a\textasciitilde{}b"), "a~b");
        assert_eq!(decode_latex(r"x\textasciicircum{}2"), "x^2");
        assert_eq!(decode_latex(r"\$100 \#1"), "$100 #1");
    }

    #[test]
    fn test_symbols() {
        assert_eq!(decode_latex(r"Stra\ss e"), "Straße");
        assert_eq!(decode_latex(r"{\O}re"), "Øre");
    }

    #[test]
    fn test_brace_cleaning() {
        assert_eq!(decode_latex("The {LaTeX} Guide"), "The LaTeX Guide");
        assert_eq!(decode_latex("A {{B {C}}} D"), "A B C D");
        assert_eq!(decode_latex(r"\emph{italic} text"), "italic text");
    }

    #[test]
    fn test_unknown_commands_survive() {
        assert_eq!(decode_latex(r"C:\path"), r"C:\path");
        assert_eq!(decode_latex("trailing\\"), "trailing\\");
    }

    #[test]
    fn test_whitespace_folding() {
        assert_eq!(
            decode_latex("  A long\n      title  "),
            "A long title"
        );
        assert_eq!(decode_latex("keeps  double spaces"), "keeps  double spaces");
        assert_eq!(decode_latex("non~breaking"), "non breaking");
    }
}
