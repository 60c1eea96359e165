//! Question/answer extraction from candidate sentences.

mod matchers;
pub mod patterns;

pub use matchers::{ColonMatcher, DashMatcher, DefinitionMatcher, QuestionMatcher};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::models::config::ExtractionConfig;

/// A validated question/answer pair. Both sides are trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QaPair {
    question: String,
    answer: String,
}

impl QaPair {
    /// Build a pair from raw captures, or `None` if either side is blank.
    pub fn new(question: &str, answer: &str) -> Option<Self> {
        let question = question.trim();
        let answer = answer.trim();
        if question.is_empty() || answer.is_empty() {
            return None;
        }
        Some(Self {
            question: question.to_string(),
            answer: answer.to_string(),
        })
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn into_parts(self) -> (String, String) {
        (self.question, self.answer)
    }
}

/// Which pattern produced an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    QuestionAnswer,
    Definition,
    Colon,
    Dash,
}

/// A single question/answer splitting rule.
pub trait PairMatcher: Send + Sync {
    /// Pattern family of this matcher.
    fn kind(&self) -> PatternKind;

    /// Try to split a sentence. `None` on mismatch or on a blank capture.
    fn attempt(&self, sentence: &str) -> Option<QaPair>;
}

/// Successful extraction from one sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub pair: QaPair,
    pub pattern: PatternKind,
}

/// Applies matchers in priority order; the first success wins.
pub struct PatternExtractor {
    matchers: Vec<Box<dyn PairMatcher>>,
    max_question_len: usize,
    max_answer_len: usize,
}

impl PatternExtractor {
    /// Extractor with the standard order: question, definition, colon, dash.
    pub fn new() -> Self {
        Self::with_matchers(vec![
            Box::new(QuestionMatcher),
            Box::new(DefinitionMatcher),
            Box::new(ColonMatcher),
            Box::new(DashMatcher),
        ])
    }

    /// Extractor with a custom matcher order.
    pub fn with_matchers(matchers: Vec<Box<dyn PairMatcher>>) -> Self {
        Self {
            matchers,
            max_question_len: 0,
            max_answer_len: 0,
        }
    }

    /// Build the standard extractor from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new().with_length_limits(config.max_question_len, config.max_answer_len)
    }

    /// Reject captures longer than these many chars (0 = unlimited).
    pub fn with_length_limits(mut self, max_question_len: usize, max_answer_len: usize) -> Self {
        self.max_question_len = max_question_len;
        self.max_answer_len = max_answer_len;
        self
    }

    /// Matcher kinds in the order they are tried.
    pub fn order(&self) -> Vec<PatternKind> {
        self.matchers.iter().map(|m| m.kind()).collect()
    }

    /// Cheap gate run before any pattern: a `?`, a `:`, or ` is `.
    pub fn is_extractable(sentence: &str) -> bool {
        sentence.contains('?')
            || sentence.contains(':')
            || sentence.to_ascii_lowercase().contains(" is ")
    }

    /// Extract at most one pair from a sentence.
    pub fn extract(&self, sentence: &str) -> Option<Extraction> {
        if !Self::is_extractable(sentence) {
            return None;
        }

        for matcher in &self.matchers {
            let Some(pair) = matcher.attempt(sentence) else {
                continue;
            };

            if !self.within_limits(&pair) {
                trace!("{:?} capture over length limit", matcher.kind());
                continue;
            }

            return Some(Extraction {
                pair,
                pattern: matcher.kind(),
            });
        }

        None
    }

    fn within_limits(&self, pair: &QaPair) -> bool {
        let fits = |text: &str, max: usize| max == 0 || text.chars().count() <= max;
        fits(pair.question(), self.max_question_len) && fits(pair.answer(), self.max_answer_len)
    }
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self::new()
    }
}
