//! Single-note pipeline: recognition, segmentation, tagging, extraction.

use std::sync::Arc;
use std::time::Instant;

use image::DynamicImage;
use tokio::sync::OwnedSemaphorePermit;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cards::CardBuilder;
use crate::error::OcrError;
use crate::extract::{Extraction, PatternExtractor};
use crate::models::config::{ExtractionConfig, NoteStudyConfig, OcrConfig};
use crate::models::flashcard::Flashcard;
use crate::models::note::Note;
use crate::ocr::{join_lines, RecognitionBackend, RecognitionOptions};
use crate::text::{
    candidate_sentences, segment, validate_spans, SentenceTagger, UnicodeSentenceTagger,
};

/// Text half of the pipeline: segmentation, tagging, extraction, cards.
#[derive(Clone)]
pub struct TextPipeline {
    tagger: Arc<dyn SentenceTagger>,
    extractor: Arc<PatternExtractor>,
    merge_question_answer: bool,
}

impl TextPipeline {
    /// Create a text pipeline using the Unicode sentence tagger.
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            tagger: Arc::new(UnicodeSentenceTagger::new()),
            extractor: Arc::new(PatternExtractor::from_config(config)),
            merge_question_answer: config.merge_question_answer,
        }
    }

    /// Replace the sentence tagger.
    pub fn with_tagger(mut self, tagger: Arc<dyn SentenceTagger>) -> Self {
        self.tagger = tagger;
        self
    }

    /// Replace the pattern extractor.
    pub fn with_extractor(mut self, extractor: PatternExtractor) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    /// Extract question/answer pairs from raw text, in document order.
    ///
    /// A unit the tagger fails on is skipped; the remaining units still run.
    pub fn extract_pairs(&self, text: &str) -> Vec<Extraction> {
        let mut extractions = Vec::new();

        for unit in segment(text) {
            let spans = match self
                .tagger
                .tag_sentences(unit.text)
                .and_then(|spans| validate_spans(unit.text, spans))
            {
                Ok(spans) => spans,
                Err(e) => {
                    warn!("Skipping unit at byte {}: {}", unit.offset, e);
                    continue;
                }
            };

            for sentence in candidate_sentences(
                unit.text,
                &spans,
                self.merge_question_answer,
                PatternExtractor::is_extractable,
            ) {
                if let Some(extraction) = self.extractor.extract(sentence) {
                    debug!(
                        "{:?} pattern matched: {:?}",
                        extraction.pattern,
                        extraction.pair.question()
                    );
                    extractions.push(extraction);
                }
            }
        }

        extractions
    }

    /// Generate flashcards from raw text.
    pub fn generate_flashcards(&self, text: &str, source_note_id: Option<Uuid>) -> Vec<Flashcard> {
        let builder = match source_note_id {
            Some(id) => CardBuilder::for_note(id),
            None => CardBuilder::new(),
        };

        self.extract_pairs(text)
            .into_iter()
            .map(|extraction| builder.build(extraction.pair))
            .collect()
    }
}

/// Turns note images into flashcards.
///
/// Holds no per-call state; clones share the same backend, tagger, and
/// extractor.
#[derive(Clone)]
pub struct NoteProcessor {
    recognizer: Arc<dyn RecognitionBackend>,
    text: TextPipeline,
    ocr: OcrConfig,
}

impl NoteProcessor {
    /// Create a processor using the Unicode sentence tagger.
    pub fn new(recognizer: Arc<dyn RecognitionBackend>, config: &NoteStudyConfig) -> Self {
        Self {
            recognizer,
            text: TextPipeline::new(&config.extraction),
            ocr: config.ocr.clone(),
        }
    }

    /// Replace the sentence tagger.
    pub fn with_tagger(mut self, tagger: Arc<dyn SentenceTagger>) -> Self {
        self.text = self.text.with_tagger(tagger);
        self
    }

    /// Replace the pattern extractor.
    pub fn with_extractor(mut self, extractor: PatternExtractor) -> Self {
        self.text = self.text.with_extractor(extractor);
        self
    }

    /// The text half of this processor.
    pub fn text(&self) -> &TextPipeline {
        &self.text
    }

    /// Recognize an image and join its lines into raw text.
    pub fn recognize_text(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let options = RecognitionOptions::from(&self.ocr);
        let lines = self.recognizer.recognize(image, &options)?;
        debug!("Recognized {} lines", lines.len());
        Ok(join_lines(&lines, &self.ocr))
    }

    /// Generate flashcards from already recognized text.
    pub fn generate_flashcards(&self, text: &str, source_note_id: Option<Uuid>) -> Vec<Flashcard> {
        self.text.generate_flashcards(text, source_note_id)
    }

    /// Run the full pipeline on the current thread.
    pub fn process_image_blocking(
        &self,
        image: &DynamicImage,
        source_note_id: Option<Uuid>,
    ) -> Result<Vec<Flashcard>, OcrError> {
        let start = Instant::now();
        let text = self.recognize_text(image)?;
        let cards = self.generate_flashcards(&text, source_note_id);

        info!(
            "Generated {} flashcards in {}ms",
            cards.len(),
            start.elapsed().as_millis()
        );
        Ok(cards)
    }

    /// Process one image on the blocking pool.
    pub async fn process_note_image(&self, image: Arc<DynamicImage>) -> Result<Vec<Flashcard>, OcrError> {
        self.spawn_processing(image, None, None).await
    }

    /// Process one note, attributing its cards to the note.
    pub async fn process_note(&self, note: &Note) -> Result<Vec<Flashcard>, OcrError> {
        self.process_note_holding(note, None).await
    }

    /// Like [`process_note`](Self::process_note), releasing `permit` only when
    /// the blocking work itself ends, even if the caller stops waiting.
    pub(crate) async fn process_note_holding(
        &self,
        note: &Note,
        permit: Option<OwnedSemaphorePermit>,
    ) -> Result<Vec<Flashcard>, OcrError> {
        let image = note.image.clone().ok_or(OcrError::MissingImage)?;
        self.spawn_processing(image, Some(note.id), permit).await
    }

    async fn spawn_processing(
        &self,
        image: Arc<DynamicImage>,
        source_note_id: Option<Uuid>,
        permit: Option<OwnedSemaphorePermit>,
    ) -> Result<Vec<Flashcard>, OcrError> {
        let processor = self.clone();
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            processor.process_image_blocking(&image, source_note_id)
        })
        .await
        .map_err(|e| OcrError::Recognition(format!("recognition task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaggingError;
    use crate::extract::PatternKind;
    use crate::testing::{blank_image, ScriptedBackend};
    use crate::text::TaggedSpan;
    use pretty_assertions::assert_eq;

    fn processor() -> NoteProcessor {
        NoteProcessor::new(Arc::new(ScriptedBackend::new()), &NoteStudyConfig::default())
    }

    fn qa(cards: &[Flashcard]) -> Vec<(&str, &str)> {
        cards
            .iter()
            .map(|c| (c.question.as_str(), c.answer.as_str()))
            .collect()
    }

    #[test]
    fn test_generate_from_mixed_notes() {
        let text = "What is mitosis? Cell division.\n\
                    Capital of France: Paris\n\n\
                    The sky looked grey today.\n\
                    Photosynthesis is the process plants use to convert light into energy";

        let cards = processor().generate_flashcards(text, None);

        assert_eq!(
            qa(&cards),
            vec![
                ("What is mitosis?", "Cell division."),
                ("Capital of France", "Paris"),
                (
                    "Photosynthesis",
                    "the process plants use to convert light into energy"
                ),
            ]
        );
    }

    #[test]
    fn test_question_on_its_own_line() {
        let cards = processor().generate_flashcards("What is mitosis?\nCell division", None);
        assert_eq!(qa(&cards), vec![("What is mitosis?", "Cell division")]);
    }

    #[test]
    fn test_question_does_not_absorb_card_after_it() {
        let cards = processor().generate_flashcards(
            "What is DNA?\nCapital of France: Paris\nWhat is mitosis? Cell division.",
            None,
        );
        assert_eq!(
            qa(&cards),
            vec![
                ("What", "DNA?"),
                ("Capital of France", "Paris"),
                ("What is mitosis?", "Cell division."),
            ]
        );

        let cards = processor()
            .generate_flashcards("Why is the sky blue?\nPhotosynthesis is light to energy", None);
        assert_eq!(
            qa(&cards),
            vec![("Why", "the sky blue?"), ("Photosynthesis", "light to energy")]
        );
    }

    #[test]
    fn test_without_merge_question_splits_on_is() {
        let mut config = NoteStudyConfig::default();
        config.extraction.merge_question_answer = false;
        let processor = NoteProcessor::new(Arc::new(ScriptedBackend::new()), &config);

        let extractions = processor.text().extract_pairs("What is mitosis? Cell division.");
        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].pattern, PatternKind::Definition);
        assert_eq!(extractions[0].pair.question(), "What");
    }

    #[test]
    fn test_text_pipeline_standalone() {
        let pipeline = TextPipeline::new(&ExtractionConfig::default());
        let note_id = Uuid::new_v4();

        let cards = pipeline.generate_flashcards("Capital of France: Paris", Some(note_id));
        assert_eq!(qa(&cards), vec![("Capital of France", "Paris")]);
        assert_eq!(cards[0].source_note_id, Some(note_id));
    }

    #[test]
    fn test_one_card_per_sentence() {
        let cards = processor().generate_flashcards("Term: rest is a: value", None);
        assert_eq!(cards.len(), 1);
    }

    #[test]
    fn test_empty_text() {
        assert!(processor().generate_flashcards("", None).is_empty());
        assert!(processor().generate_flashcards("\n\n  \n", None).is_empty());
    }

    struct FailOnMarker;

    impl SentenceTagger for FailOnMarker {
        fn tag_sentences(&self, text: &str) -> Result<Vec<TaggedSpan>, TaggingError> {
            if text.contains("BROKEN") {
                return Err(TaggingError::Unavailable("model not loaded".to_string()));
            }
            UnicodeSentenceTagger::new().tag_sentences(text)
        }
    }

    #[test]
    fn test_tagging_failure_skips_only_that_unit() {
        let processor = processor().with_tagger(Arc::new(FailOnMarker));
        let text = "A: 1\n\nBROKEN: unit\n\nB: 2";

        let cards = processor.generate_flashcards(text, None);
        assert_eq!(qa(&cards), vec![("A", "1"), ("B", "2")]);
    }

    struct OutOfBounds;

    impl SentenceTagger for OutOfBounds {
        fn tag_sentences(&self, text: &str) -> Result<Vec<TaggedSpan>, TaggingError> {
            Ok(vec![TaggedSpan {
                tag: crate::text::SentenceTag::Fragment,
                start: 0,
                end: text.len() + 1,
            }])
        }
    }

    #[test]
    fn test_invalid_spans_skip_unit() {
        let processor = processor().with_tagger(Arc::new(OutOfBounds));
        assert!(processor.generate_flashcards("A: 1", None).is_empty());
    }

    #[tokio::test]
    async fn test_process_note_image_applies_autocorrect() {
        let backend = ScriptedBackend::new().with_lines(3, &["What is mitosis ?", "Cell  division"]);
        let processor = NoteProcessor::new(Arc::new(backend), &NoteStudyConfig::default());

        let cards = processor
            .process_note_image(Arc::new(blank_image(3)))
            .await
            .unwrap();

        assert_eq!(qa(&cards), vec![("What is mitosis?", "Cell division")]);
        assert_eq!(cards[0].source_note_id, None);
    }

    #[tokio::test]
    async fn test_process_note_tags_source() {
        let backend = ScriptedBackend::new().with_lines(5, &["Capital of France: Paris"]);
        let processor = NoteProcessor::new(Arc::new(backend), &NoteStudyConfig::default());
        let note = Note::new("Geography", blank_image(5));

        let cards = processor.process_note(&note).await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].source_note_id, Some(note.id));
    }

    #[tokio::test]
    async fn test_missing_image_is_recognition_failure() {
        let note = Note::without_image("Empty");
        assert_eq!(
            processor().process_note(&note).await,
            Err(OcrError::MissingImage)
        );
    }

    #[tokio::test]
    async fn test_backend_error_propagates() {
        let backend = ScriptedBackend::new().with_failure(7, "camera roll unavailable");
        let processor = NoteProcessor::new(Arc::new(backend), &NoteStudyConfig::default());

        let result = processor.process_note_image(Arc::new(blank_image(7))).await;
        assert!(matches!(result, Err(OcrError::Recognition(_))));
    }
}
