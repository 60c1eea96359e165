//! Ordered question/answer matchers.

use regex::Regex;

use super::patterns::{COLON, DASH, DEFINITION, QUESTION_ANSWER};
use super::{PairMatcher, PatternKind, QaPair};

/// Run a two-group pattern and validate both captures.
fn capture_pair(pattern: &Regex, sentence: &str) -> Option<QaPair> {
    let caps = pattern.captures(sentence)?;
    let question = caps.get(1)?.as_str();
    let answer = caps.get(2)?.as_str();
    QaPair::new(question, answer)
}

/// `What is mitosis? Cell division.`
#[derive(Debug, Clone, Copy, Default)]
pub struct QuestionMatcher;

impl PairMatcher for QuestionMatcher {
    fn kind(&self) -> PatternKind {
        PatternKind::QuestionAnswer
    }

    fn attempt(&self, sentence: &str) -> Option<QaPair> {
        capture_pair(&QUESTION_ANSWER, sentence)
    }
}

/// `Photosynthesis is the process ...`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefinitionMatcher;

impl PairMatcher for DefinitionMatcher {
    fn kind(&self) -> PatternKind {
        PatternKind::Definition
    }

    fn attempt(&self, sentence: &str) -> Option<QaPair> {
        capture_pair(&DEFINITION, sentence)
    }
}

/// `Capital of France: Paris`
#[derive(Debug, Clone, Copy, Default)]
pub struct ColonMatcher;

impl PairMatcher for ColonMatcher {
    fn kind(&self) -> PatternKind {
        PatternKind::Colon
    }

    fn attempt(&self, sentence: &str) -> Option<QaPair> {
        capture_pair(&COLON, sentence)
    }
}

/// `Osmosis - movement of water`
#[derive(Debug, Clone, Copy, Default)]
pub struct DashMatcher;

impl PairMatcher for DashMatcher {
    fn kind(&self) -> PatternKind {
        PatternKind::Dash
    }

    fn attempt(&self, sentence: &str) -> Option<QaPair> {
        capture_pair(&DASH, sentence)
    }
}
