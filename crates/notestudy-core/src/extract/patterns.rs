//! Regex patterns for question/answer splitting.
//!
//! All patterns are case-insensitive and let `.` cross line breaks, so a
//! candidate spanning several recognized lines still matches.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Question then answer: the question keeps its first `?`
    pub static ref QUESTION_ANSWER: Regex = Regex::new(
        r"(?is)^(.+?\?)\s*(.+)$"
    ).unwrap();

    // Definition: <subject> is <predicate>
    pub static ref DEFINITION: Regex = Regex::new(
        r"(?is)^(.+?)\s+is\s+(.+)$"
    ).unwrap();

    // Colon: <label>: <value>
    pub static ref COLON: Regex = Regex::new(
        r"(?is)^(.+?):\s*(.+)$"
    ).unwrap();

    // Dash: <label> - <value>
    pub static ref DASH: Regex = Regex::new(
        r"(?is)^(.+?)\s*-\s*(.+)$"
    ).unwrap();
}
