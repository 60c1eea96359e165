//! Concurrent processing of several notes with a single deduplication pass.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dedup::deduplicate;
use crate::deck::FlashcardDeck;
use crate::models::config::BatchConfig;
use crate::models::flashcard::Flashcard;
use crate::models::note::Note;
use crate::pipeline::NoteProcessor;

/// How a single note's processing ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NoteStatus {
    /// Processing finished; `cards` were extracted before deduplication.
    Completed { cards: usize },
    /// Recognition failed or the note had no image.
    Failed { reason: String },
    /// The per-note timeout elapsed.
    TimedOut,
    /// The batch was cancelled before the note finished.
    Cancelled,
}

/// Per-note outcome of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteReport {
    pub note_id: Uuid,
    pub status: NoteStatus,
}

/// Result of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// New flashcards after deduplication, grouped by note in input order.
    pub added: Vec<Flashcard>,
    /// One report per input note, in input order.
    pub reports: Vec<NoteReport>,
}

impl BatchOutcome {
    /// Number of notes that did not complete.
    pub fn failed_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| !matches!(r.status, NoteStatus::Completed { .. }))
            .count()
    }
}

/// Fans note processing out over the runtime and joins the results.
///
/// A failing note contributes no cards and never affects the others.
#[derive(Clone)]
pub struct BatchCoordinator {
    processor: NoteProcessor,
    config: BatchConfig,
}

impl BatchCoordinator {
    pub fn new(processor: NoteProcessor, config: BatchConfig) -> Self {
        Self { processor, config }
    }

    /// Process notes and deduplicate the union against `existing`.
    pub async fn process_notes(&self, notes: Vec<Note>, existing: &[Flashcard]) -> BatchOutcome {
        self.process_notes_with_cancel(notes, existing, &CancellationToken::new())
            .await
    }

    /// Like [`process_notes`](Self::process_notes), honoring a cancellation token.
    pub async fn process_notes_with_cancel(
        &self,
        notes: Vec<Note>,
        existing: &[Flashcard],
        cancel: &CancellationToken,
    ) -> BatchOutcome {
        let (candidates, reports) = self.run(notes, cancel).await;
        let offered = candidates.len();
        let added = deduplicate(existing, candidates);

        info!(
            "Batch kept {} of {} extracted flashcards after deduplication",
            added.len(),
            offered
        );
        BatchOutcome { added, reports }
    }

    /// Process notes and commit the union to a deck.
    ///
    /// Deduplication happens inside the deck's commit, against its contents
    /// at commit time.
    pub async fn process_into_deck(
        &self,
        notes: Vec<Note>,
        deck: &FlashcardDeck,
        cancel: &CancellationToken,
    ) -> BatchOutcome {
        let (candidates, reports) = self.run(notes, cancel).await;
        let added = deck.commit(candidates).await;
        BatchOutcome { added, reports }
    }

    /// Run every note and return the cards in input order plus the reports.
    async fn run(&self, notes: Vec<Note>, cancel: &CancellationToken) -> (Vec<Flashcard>, Vec<NoteReport>) {
        let start = Instant::now();
        let total = notes.len();

        let mut slots: Vec<Vec<Flashcard>> = vec![Vec::new(); total];
        let mut reports: Vec<NoteReport> = notes
            .iter()
            .map(|note| NoteReport {
                note_id: note.id,
                status: NoteStatus::Failed {
                    reason: "note task did not report".to_string(),
                },
            })
            .collect();

        let semaphore = (self.config.max_concurrent_notes > 0)
            .then(|| Arc::new(Semaphore::new(self.config.max_concurrent_notes)));
        let timeout = self.config.note_timeout_ms.map(Duration::from_millis);

        let mut tasks = JoinSet::new();
        for (index, note) in notes.into_iter().enumerate() {
            let processor = self.processor.clone();
            let semaphore = semaphore.clone();
            let cancel = cancel.clone();

            tasks.spawn(async move {
                let (status, cards) = run_note(processor, &note, semaphore, timeout, cancel).await;
                (index, status, cards)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, status, cards)) => {
                    if let NoteStatus::Failed { reason } = &status {
                        warn!("Note {} contributed no flashcards: {}", reports[index].note_id, reason);
                    }
                    reports[index].status = status;
                    slots[index] = cards;
                }
                Err(e) => warn!("Note task aborted: {}", e),
            }
        }

        let completed = reports
            .iter()
            .filter(|r| matches!(r.status, NoteStatus::Completed { .. }))
            .count();
        info!(
            "Processed {} notes ({} completed) in {}ms",
            total,
            completed,
            start.elapsed().as_millis()
        );

        (slots.into_iter().flatten().collect(), reports)
    }
}

async fn run_note(
    processor: NoteProcessor,
    note: &Note,
    semaphore: Option<Arc<Semaphore>>,
    timeout: Option<Duration>,
    cancel: CancellationToken,
) -> (NoteStatus, Vec<Flashcard>) {
    let work = async {
        // The permit travels with the blocking work, so a timed-out or
        // cancelled note keeps its slot until its OCR actually returns.
        let permit = match semaphore {
            Some(semaphore) => match semaphore.acquire_owned().await {
                Ok(permit) => Some(permit),
                Err(e) => {
                    return (
                        NoteStatus::Failed {
                            reason: e.to_string(),
                        },
                        Vec::new(),
                    )
                }
            },
            None => None,
        };

        if cancel.is_cancelled() {
            return (NoteStatus::Cancelled, Vec::new());
        }

        let recognized = match timeout {
            Some(limit) => match tokio::time::timeout(limit, processor.process_note_holding(note, permit)).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("Note {} timed out after {}ms", note.id, limit.as_millis());
                    return (NoteStatus::TimedOut, Vec::new());
                }
            },
            None => processor.process_note_holding(note, permit).await,
        };

        match recognized {
            Ok(cards) => (NoteStatus::Completed { cards: cards.len() }, cards),
            Err(e) => (
                NoteStatus::Failed {
                    reason: e.to_string(),
                },
                Vec::new(),
            ),
        }
    };

    tokio::select! {
        _ = cancel.cancelled() => (NoteStatus::Cancelled, Vec::new()),
        outcome = work => outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::NoteStudyConfig;
    use crate::testing::{blank_image, ScriptedBackend};
    use pretty_assertions::assert_eq;

    fn coordinator(backend: ScriptedBackend, batch: BatchConfig) -> BatchCoordinator {
        let processor = NoteProcessor::new(Arc::new(backend), &NoteStudyConfig::default());
        BatchCoordinator::new(processor, batch)
    }

    fn qa(cards: &[Flashcard]) -> Vec<(String, String)> {
        cards
            .iter()
            .map(|c| (c.question.clone(), c.answer.clone()))
            .collect()
    }

    fn note(width: u32) -> Note {
        Note::new(format!("note {}", width), blank_image(width))
    }

    #[tokio::test]
    async fn test_cards_tagged_with_note_and_deduplicated() {
        let backend = ScriptedBackend::new()
            .with_lines(1, &["Capital of France: Paris", "X: Y"])
            .with_lines(2, &["Mitosis is cell division"]);
        let notes = vec![note(1), note(2)];
        let (a, b) = (notes[0].id, notes[1].id);
        let existing = vec![Flashcard::new("x", "y", None)];

        let outcome = coordinator(backend, BatchConfig::default())
            .process_notes(notes, &existing)
            .await;

        assert_eq!(
            qa(&outcome.added),
            vec![
                ("Capital of France".to_string(), "Paris".to_string()),
                ("Mitosis".to_string(), "cell division".to_string()),
            ]
        );
        assert_eq!(outcome.added[0].source_note_id, Some(a));
        assert_eq!(outcome.added[1].source_note_id, Some(b));
        assert_eq!(
            outcome.reports[0].status,
            NoteStatus::Completed { cards: 2 }
        );
        assert_eq!(outcome.failed_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_result_independent_of_completion_order() {
        let lines_a = ["A one: 1", "A two: 2"];
        let lines_b = ["B one: 1"];

        let slow_a = ScriptedBackend::new()
            .with_lines(1, &lines_a)
            .with_lines(2, &lines_b)
            .with_delay(1, Duration::from_millis(150));
        let slow_b = ScriptedBackend::new()
            .with_lines(1, &lines_a)
            .with_lines(2, &lines_b)
            .with_delay(2, Duration::from_millis(150));

        let first = coordinator(slow_a, BatchConfig::default())
            .process_notes(vec![note(1), note(2)], &[])
            .await;
        let second = coordinator(slow_b, BatchConfig::default())
            .process_notes(vec![note(1), note(2)], &[])
            .await;

        assert_eq!(qa(&first.added), qa(&second.added));
        assert_eq!(
            qa(&first.added)[0],
            ("A one".to_string(), "1".to_string())
        );
    }

    #[tokio::test]
    async fn test_failed_note_is_isolated() {
        let backend = ScriptedBackend::new()
            .with_failure(1, "recognizer crashed")
            .with_lines(2, &["What is mitosis?", "Cell division."]);

        let batch = coordinator(backend.clone(), BatchConfig::default())
            .process_notes(vec![note(1), note(2)], &[])
            .await;
        let alone = coordinator(backend, BatchConfig::default())
            .process_notes(vec![note(2)], &[])
            .await;

        assert_eq!(qa(&batch.added), qa(&alone.added));
        assert!(matches!(batch.reports[0].status, NoteStatus::Failed { .. }));
        assert_eq!(batch.failed_count(), 1);
    }

    #[tokio::test]
    async fn test_note_without_image_contributes_nothing() {
        let backend = ScriptedBackend::new().with_lines(2, &["Capital of France: Paris"]);
        let notes = vec![Note::without_image("blank"), note(2)];

        let outcome = coordinator(backend, BatchConfig::default())
            .process_notes(notes, &[])
            .await;

        assert_eq!(outcome.added.len(), 1);
        assert_eq!(
            outcome.reports[0].status,
            NoteStatus::Failed {
                reason: "note has no image payload".to_string()
            }
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timed_out_note_is_failed() {
        let backend = ScriptedBackend::new()
            .with_lines(1, &["Slow: note"])
            .with_delay(1, Duration::from_millis(500))
            .with_lines(2, &["Fast: note"]);
        let config = BatchConfig {
            max_concurrent_notes: 0,
            note_timeout_ms: Some(50),
        };

        let outcome = coordinator(backend, config)
            .process_notes(vec![note(1), note(2)], &[])
            .await;

        assert_eq!(outcome.reports[0].status, NoteStatus::TimedOut);
        assert_eq!(qa(&outcome.added), vec![("Fast".to_string(), "note".to_string())]);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let backend = ScriptedBackend::new().with_lines(1, &["Capital of France: Paris"]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = coordinator(backend, BatchConfig::default())
            .process_notes_with_cancel(vec![note(1)], &[], &cancel)
            .await;

        assert!(outcome.added.is_empty());
        assert_eq!(outcome.reports[0].status, NoteStatus::Cancelled);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancelled_while_note_in_flight() {
        let backend = ScriptedBackend::new()
            .with_lines(1, &["Capital of France: Paris"])
            .with_lines(2, &["Slow: note"])
            .with_delay(2, Duration::from_millis(400));
        let config = BatchConfig {
            max_concurrent_notes: 0,
            note_timeout_ms: None,
        };
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let outcome = coordinator(backend, config)
            .process_notes_with_cancel(vec![note(1), note(2)], &[], &cancel)
            .await;

        assert_eq!(outcome.reports[0].status, NoteStatus::Completed { cards: 1 });
        assert_eq!(outcome.reports[1].status, NoteStatus::Cancelled);
        assert_eq!(
            qa(&outcome.added),
            vec![("Capital of France".to_string(), "Paris".to_string())]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timed_out_note_keeps_its_slot() {
        let backend = ScriptedBackend::new()
            .with_lines(1, &["Slow: note"])
            .with_delay(1, Duration::from_millis(300))
            .with_lines(2, &["Next: note"])
            .with_delay(2, Duration::from_millis(20));
        let config = BatchConfig {
            max_concurrent_notes: 1,
            note_timeout_ms: Some(50),
        };

        let outcome = coordinator(backend.clone(), config)
            .process_notes(vec![note(1), note(2)], &[])
            .await;

        assert_eq!(outcome.reports[0].status, NoteStatus::TimedOut);
        assert_eq!(outcome.reports[1].status, NoteStatus::Completed { cards: 1 });
        assert_eq!(backend.peak_in_flight(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_bounded_concurrency_processes_all() {
        let mut backend = ScriptedBackend::new();
        for width in 1..=6 {
            let line = format!("Card {}: answer {}", width, width);
            backend = backend
                .with_lines(width, &[line.as_str()])
                .with_delay(width, Duration::from_millis(20));
        }
        let config = BatchConfig {
            max_concurrent_notes: 2,
            note_timeout_ms: None,
        };

        let notes: Vec<Note> = (1..=6).map(note).collect();
        let outcome = coordinator(backend, config).process_notes(notes, &[]).await;

        assert_eq!(outcome.added.len(), 6);
        assert_eq!(outcome.added[5].question, "Card 6");
    }

    #[tokio::test]
    async fn test_process_into_deck_commits_once() {
        let backend = ScriptedBackend::new().with_lines(1, &["Capital of France: Paris"]);
        let coordinator = coordinator(backend, BatchConfig::default());
        let deck = FlashcardDeck::default();
        let cancel = CancellationToken::new();

        let first = coordinator
            .process_into_deck(vec![note(1)], &deck, &cancel)
            .await;
        let second = coordinator
            .process_into_deck(vec![note(1)], &deck, &cancel)
            .await;

        assert_eq!(first.added.len(), 1);
        assert!(second.added.is_empty());
        assert_eq!(deck.len().await, 1);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let outcome = coordinator(ScriptedBackend::new(), BatchConfig::default())
            .process_notes(Vec::new(), &[])
            .await;
        assert!(outcome.added.is_empty());
        assert!(outcome.reports.is_empty());
    }
}
