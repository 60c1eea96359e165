//! Flashcard record produced by the extraction pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A question/answer study card.
///
/// The pipeline only constructs and filters flashcards; it never edits one in
/// place after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    /// Unique identity, generated on creation.
    pub id: Uuid,

    /// Question side, non-empty after trimming.
    pub question: String,

    /// Answer side, non-empty after trimming.
    pub answer: String,

    /// Note this card was extracted from, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_note_id: Option<Uuid>,
}

impl Flashcard {
    /// Create a flashcard with a fresh identity.
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        source_note_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            question: question.into(),
            answer: answer.into(),
            source_note_id,
        }
    }

    /// Copy of this card attributed to a source note, keeping its identity.
    pub fn with_source(mut self, note_id: Uuid) -> Self {
        self.source_note_id = Some(note_id);
        self
    }
}
