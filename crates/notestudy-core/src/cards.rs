//! Flashcard construction from extracted pairs.

use uuid::Uuid;

use crate::extract::QaPair;
use crate::models::flashcard::Flashcard;

/// Builds flashcards, optionally attributed to a source note.
#[derive(Debug, Clone, Copy, Default)]
pub struct CardBuilder {
    source_note_id: Option<Uuid>,
}

impl CardBuilder {
    /// Builder for cards with no source note.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder for cards extracted from a note.
    pub fn for_note(note_id: Uuid) -> Self {
        Self {
            source_note_id: Some(note_id),
        }
    }

    /// Construct a card with a fresh identity.
    pub fn build(&self, pair: QaPair) -> Flashcard {
        let (question, answer) = pair.into_parts();
        Flashcard::new(question, answer, self.source_note_id)
    }
}
