//! Configuration structures for the note-to-flashcard pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::NoteStudyError;

/// Main configuration for the notestudy pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteStudyConfig {
    /// Text recognition configuration.
    pub ocr: OcrConfig,

    /// Question/answer extraction configuration.
    pub extraction: ExtractionConfig,

    /// Batch coordination configuration.
    pub batch: BatchConfig,

    /// Model configuration.
    pub models: ModelConfig,
}

/// Recognition accuracy level requested from the OCR backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionAccuracy {
    /// Smaller, faster models.
    Fast,
    /// Larger models with better handwriting accuracy.
    #[default]
    Accurate,
}

impl RecognitionAccuracy {
    /// Model variant sub-directory used for this accuracy level.
    pub fn variant(&self) -> &'static str {
        match self {
            RecognitionAccuracy::Fast => "mobile",
            RecognitionAccuracy::Accurate => "server",
        }
    }
}

impl std::fmt::Display for RecognitionAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecognitionAccuracy::Fast => write!(f, "fast"),
            RecognitionAccuracy::Accurate => write!(f, "accurate"),
        }
    }
}

/// OCR configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Recognition accuracy level.
    pub accuracy: RecognitionAccuracy,

    /// Apply lexical cleanup to recognized lines.
    pub autocorrect: bool,

    /// Keep `[UNK]` placeholders emitted by the recognizer.
    pub keep_unk: bool,

    /// Minimum recognition confidence for a line to be kept (0.0 - 1.0).
    pub min_confidence: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            accuracy: RecognitionAccuracy::Accurate,
            autocorrect: true,
            keep_unk: false,
            min_confidence: 0.0, // CTC confidence scores are inherently low
        }
    }
}

/// Question/answer extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Offer a question sentence and the sentence after it as one candidate.
    pub merge_question_answer: bool,

    /// Maximum question length in characters (0 = unlimited).
    pub max_question_len: usize,

    /// Maximum answer length in characters (0 = unlimited).
    pub max_answer_len: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            merge_question_answer: true,
            max_question_len: 0,
            max_answer_len: 0,
        }
    }
}

/// Batch coordination configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum notes processed at once (0 = unbounded).
    pub max_concurrent_notes: usize,

    /// Per-note timeout in milliseconds. A timed-out note contributes no cards.
    pub note_timeout_ms: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_notes: 4,
            note_timeout_ms: Some(30_000),
        }
    }
}

/// Model file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Root directory holding one sub-directory per model variant.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
        }
    }
}

impl ModelConfig {
    /// Directory holding the models for an accuracy level.
    pub fn variant_dir(&self, accuracy: RecognitionAccuracy) -> PathBuf {
        self.model_dir.join(accuracy.variant())
    }
}

impl NoteStudyConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Reject values the pipeline cannot honor.
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(0.0..=1.0).contains(&self.ocr.min_confidence) {
            return Err(NoteStudyError::Config(format!(
                "ocr.min_confidence must be within 0.0..=1.0, got {}",
                self.ocr.min_confidence
            )));
        }
        if self.batch.note_timeout_ms == Some(0) {
            return Err(NoteStudyError::Config(
                "batch.note_timeout_ms must be positive; use null to disable".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory holding the models for the configured accuracy level.
    pub fn model_variant_dir(&self) -> PathBuf {
        self.models.variant_dir(self.ocr.accuracy)
    }
}
