//! Owning flashcard collection with serialized commits.

use tokio::sync::Mutex;
use tracing::debug;

use crate::dedup::Deduplicator;
use crate::models::flashcard::Flashcard;

/// The accepted flashcard set.
///
/// Every commit deduplicates against the current contents and appends while
/// holding the same lock, so concurrent batches cannot both add a card the
/// other one just accepted.
#[derive(Debug, Default)]
pub struct FlashcardDeck {
    cards: Mutex<Vec<Flashcard>>,
}

impl FlashcardDeck {
    pub fn new(cards: Vec<Flashcard>) -> Self {
        Self {
            cards: Mutex::new(cards),
        }
    }

    /// Copy of the current contents.
    pub async fn snapshot(&self) -> Vec<Flashcard> {
        self.cards.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.cards.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cards.lock().await.is_empty()
    }

    /// Deduplicate candidates against the deck and append the survivors.
    ///
    /// Returns the cards that were added, in candidate order.
    pub async fn commit(&self, candidates: Vec<Flashcard>) -> Vec<Flashcard> {
        let mut cards = self.cards.lock().await;
        let offered = candidates.len();
        let added = Deduplicator::from_existing(cards.iter()).filter(candidates);
        cards.extend(added.iter().cloned());

        debug!(
            "Committed {} of {} candidate flashcards (deck size {})",
            added.len(),
            offered,
            cards.len()
        );
        added
    }

    /// Consume the deck and return its cards.
    pub fn into_cards(self) -> Vec<Flashcard> {
        self.cards.into_inner()
    }
}
