//! Light lexical cleanup of recognized lines.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref UNK_TOKEN: Regex = Regex::new(r"\[UNK\]").unwrap();
    static ref INNER_WHITESPACE: Regex = Regex::new(r"[ \t\u{00a0}]{2,}").unwrap();
    static ref SPACE_BEFORE_MARK: Regex = Regex::new(r"[ \t]+([?:])").unwrap();
}

/// Replace recognizer `[UNK]` placeholders with spaces.
pub fn strip_unk(line: &str) -> String {
    UNK_TOKEN.replace_all(line, " ").into_owned()
}

/// Normalize a recognized line.
///
/// Expands typographic ligatures, folds curly quotes to ASCII, collapses runs
/// of spaces, and removes spaces in front of `?` and `:` so the extraction
/// patterns see `What is it?` rather than `What is it ?`.
pub fn correct_line(line: &str) -> String {
    let mut normalized = String::with_capacity(line.len());
    for c in line.chars() {
        match c {
            '\u{fb00}' => normalized.push_str("ff"),
            '\u{fb01}' => normalized.push_str("fi"),
            '\u{fb02}' => normalized.push_str("fl"),
            '\u{fb03}' => normalized.push_str("ffi"),
            '\u{fb04}' => normalized.push_str("ffl"),
            '\u{2018}' | '\u{2019}' => normalized.push('\''),
            '\u{201c}' | '\u{201d}' => normalized.push('"'),
            '\u{2013}' | '\u{2014}' => normalized.push('-'),
            '\u{00a0}' => normalized.push(' '),
            _ => normalized.push(c),
        }
    }

    let collapsed = INNER_WHITESPACE.replace_all(&normalized, " ");
    let tightened = SPACE_BEFORE_MARK.replace_all(&collapsed, "$1");
    tightened.trim().to_string()
}
