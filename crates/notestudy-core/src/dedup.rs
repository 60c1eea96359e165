//! Case-insensitive deduplication of flashcards against an accepted set.

use std::collections::HashSet;

use crate::models::flashcard::Flashcard;

/// Comparison key: trimmed, lower-cased question and answer.
pub fn dedup_key(card: &Flashcard) -> (String, String) {
    (
        card.question.trim().to_lowercase(),
        card.answer.trim().to_lowercase(),
    )
}

/// Filters candidates against a snapshot of accepted flashcards.
#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    seen: HashSet<(String, String)>,
}

impl Deduplicator {
    /// Snapshot the keys of the accepted set.
    pub fn from_existing<'a>(existing: impl IntoIterator<Item = &'a Flashcard>) -> Self {
        Self {
            seen: existing.into_iter().map(dedup_key).collect(),
        }
    }

    /// Whether both question and answer match an accepted card.
    pub fn is_duplicate(&self, card: &Flashcard) -> bool {
        self.seen.contains(&dedup_key(card))
    }

    /// Keep candidates that do not duplicate an accepted card, in order.
    ///
    /// Candidates are not compared with each other.
    pub fn filter(&self, candidates: Vec<Flashcard>) -> Vec<Flashcard> {
        candidates
            .into_iter()
            .filter(|card| !self.is_duplicate(card))
            .collect()
    }
}

/// Remove candidates already present in `existing`.
pub fn deduplicate(existing: &[Flashcard], candidates: Vec<Flashcard>) -> Vec<Flashcard> {
    Deduplicator::from_existing(existing).filter(candidates)
}
