//! Core library for turning photographed study notes into flashcards.
//!
//! This crate provides:
//! - A recognition backend seam with a native pure-Rust OCR engine
//! - Paragraph segmentation and Unicode sentence tagging of recognized text
//! - Ordered question/answer pattern extraction
//! - Flashcard construction, deduplication, and concurrent batch processing

pub mod batch;
pub mod cards;
pub mod dedup;
pub mod deck;
pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod text;

#[cfg(test)]
mod testing;

pub use batch::{BatchCoordinator, BatchOutcome, NoteReport, NoteStatus};
pub use cards::CardBuilder;
pub use dedup::{deduplicate, Deduplicator};
pub use deck::FlashcardDeck;
pub use error::{NoteStudyError, OcrError, Result, TaggingError};
pub use extract::{Extraction, PairMatcher, PatternExtractor, PatternKind, QaPair};
pub use models::config::NoteStudyConfig;
pub use models::flashcard::Flashcard;
pub use models::note::Note;
pub use ocr::{RecognitionBackend, RecognitionOptions, RecognizedLine};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pipeline::{NoteProcessor, TextPipeline};
pub use text::{segment, SentenceTagger, UnicodeSentenceTagger};

/// Re-export for cancelling batches.
pub use tokio_util::sync::CancellationToken;
