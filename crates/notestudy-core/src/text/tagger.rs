//! Sentence-level tagging of extraction units.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::TaggingError;

/// Coarse lexical class of a sentence span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentenceTag {
    /// Ends with a question mark.
    Interrogative,
    /// Ends with `.`, `!` or `;`.
    Declarative,
    /// No terminal punctuation, common in handwritten notes.
    Fragment,
}

impl SentenceTag {
    /// Classify a sentence by its terminal punctuation.
    pub fn classify(sentence: &str) -> Self {
        let last = sentence
            .trim_end()
            .trim_end_matches(|c: char| matches!(c, '"' | '\'' | ')' | ']' | '\u{201d}' | '\u{2019}'))
            .chars()
            .next_back();

        match last {
            Some('?') | Some('\u{ff1f}') => SentenceTag::Interrogative,
            Some('.') | Some('!') | Some(';') | Some('\u{3002}') => SentenceTag::Declarative,
            _ => SentenceTag::Fragment,
        }
    }
}

/// A tagged sentence span, as byte offsets into the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggedSpan {
    pub tag: SentenceTag,
    pub start: usize,
    pub end: usize,
}

impl TaggedSpan {
    /// The span's text within `unit`.
    pub fn slice<'a>(&self, unit: &'a str) -> &'a str {
        &unit[self.start..self.end]
    }
}

/// Sentence boundary detector.
///
/// Implementations must be deterministic and must not carry state between
/// calls.
pub trait SentenceTagger: Send + Sync {
    /// Tag the sentences of one extraction unit, in order.
    fn tag_sentences(&self, text: &str) -> Result<Vec<TaggedSpan>, TaggingError>;
}

/// Sentence tagger using Unicode (UAX #29) sentence boundaries.
///
/// Handles text with missing or irregular punctuation: every line break ends
/// a sentence, as does terminal punctuation followed by whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeSentenceTagger;

impl UnicodeSentenceTagger {
    pub fn new() -> Self {
        Self
    }
}

impl SentenceTagger for UnicodeSentenceTagger {
    fn tag_sentences(&self, text: &str) -> Result<Vec<TaggedSpan>, TaggingError> {
        Ok(text
            .split_sentence_bound_indices()
            .filter(|(_, sentence)| !sentence.trim().is_empty())
            .map(|(start, sentence)| TaggedSpan {
                tag: SentenceTag::classify(sentence),
                start,
                end: start + sentence.len(),
            })
            .collect())
    }
}

/// Check that spans from a tagger are ordered, in bounds, and on char boundaries.
pub fn validate_spans(text: &str, spans: Vec<TaggedSpan>) -> Result<Vec<TaggedSpan>, TaggingError> {
    let mut previous_end = 0;
    for span in &spans {
        let valid = span.start <= span.end
            && span.start >= previous_end
            && span.end <= text.len()
            && text.is_char_boundary(span.start)
            && text.is_char_boundary(span.end);

        if !valid {
            return Err(TaggingError::InvalidSpan {
                start: span.start,
                end: span.end,
                len: text.len(),
            });
        }
        previous_end = span.end;
    }
    Ok(spans)
}

/// Turn tagged spans into candidate sentences for pattern extraction.
///
/// With `merge_question_answer`, an interrogative span directly followed by a
/// non-interrogative one yields a single candidate covering both, so a
/// question and its answer on the next line reach the extractor together.
/// A following span for which `stands_alone` holds is never absorbed.
pub fn candidate_sentences<'a, F>(
    text: &'a str,
    spans: &[TaggedSpan],
    merge_question_answer: bool,
    stands_alone: F,
) -> Vec<&'a str>
where
    F: Fn(&str) -> bool,
{
    let mut candidates = Vec::with_capacity(spans.len());
    let mut i = 0;

    while i < spans.len() {
        let span = spans[i];
        if merge_question_answer && span.tag == SentenceTag::Interrogative {
            if let Some(next) = spans.get(i + 1) {
                if next.tag != SentenceTag::Interrogative && !stands_alone(next.slice(text)) {
                    candidates.push(&text[span.start..next.end]);
                    i += 2;
                    continue;
                }
            }
        }
        candidates.push(span.slice(text));
        i += 1;
    }

    candidates
}
