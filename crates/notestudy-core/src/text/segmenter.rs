//! Paragraph segmentation of raw recognized text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Two or more consecutive line breaks; the lines between may hold only spaces or tabs.
    static ref PARAGRAPH_BREAK: Regex = Regex::new(r"\r?\n(?:[ \t]*\r?\n)+").unwrap();
}

/// A paragraph-scoped slice of the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionUnit<'a> {
    /// Unit text, untrimmed.
    pub text: &'a str,
    /// Byte offset of `text` in the raw input.
    pub offset: usize,
}

impl ExtractionUnit<'_> {
    /// Byte offset one past the end of the unit in the raw input.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

/// Lazy iterator over the non-blank paragraphs of a text.
///
/// Cloning the iterator restarts from the clone point.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    text: &'a str,
    pos: usize,
    done: bool,
}

/// Split raw text into extraction units on blank-line boundaries.
///
/// Units that are empty after trimming are skipped. Document order is kept.
pub fn segment(text: &str) -> Segments<'_> {
    Segments {
        text,
        pos: 0,
        done: false,
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = ExtractionUnit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let start = self.pos;
            let piece = match PARAGRAPH_BREAK.find_at(self.text, start) {
                Some(m) => {
                    self.pos = m.end();
                    &self.text[start..m.start()]
                }
                None => {
                    self.done = true;
                    &self.text[start..]
                }
            };

            if !piece.trim().is_empty() {
                return Some(ExtractionUnit {
                    text: piece,
                    offset: start,
                });
            }
        }
        None
    }
}

impl std::iter::FusedIterator for Segments<'_> {}
