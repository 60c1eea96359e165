//! Text recognition collaborator.
//!
//! The pipeline talks to OCR through [`RecognitionBackend`]. Any engine that
//! turns an image into reading-ordered lines can be plugged in; the native
//! [`PureOcrEngine`] is provided behind the `native` feature.

mod correction;
#[cfg(feature = "native")]
mod pure_engine;

pub use correction::{correct_line, strip_unk};
#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;
use crate::models::config::{OcrConfig, RecognitionAccuracy};

/// One recognized line of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedLine {
    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl RecognizedLine {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Options forwarded to the backend on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecognitionOptions {
    pub accuracy: RecognitionAccuracy,
    pub autocorrect: bool,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            accuracy: RecognitionAccuracy::Accurate,
            autocorrect: true,
        }
    }
}

impl From<&OcrConfig> for RecognitionOptions {
    fn from(config: &OcrConfig) -> Self {
        Self {
            accuracy: config.accuracy,
            autocorrect: config.autocorrect,
        }
    }
}

/// An image-to-text engine.
///
/// Implementations return lines in reading order. Calls may block; the batch
/// coordinator runs them on the blocking pool.
pub trait RecognitionBackend: Send + Sync {
    /// Recognize the text lines in an image.
    fn recognize(
        &self,
        image: &DynamicImage,
        options: &RecognitionOptions,
    ) -> Result<Vec<RecognizedLine>, OcrError>;
}

/// Join recognized lines into the raw text blob the segmenter consumes.
///
/// Lines below `config.min_confidence` are dropped. With `autocorrect`
/// enabled each line goes through [`correct_line`]; otherwise only `[UNK]`
/// placeholders are stripped (unless `keep_unk` is set).
pub fn join_lines(lines: &[RecognizedLine], config: &OcrConfig) -> String {
    lines
        .iter()
        .filter(|line| line.confidence >= config.min_confidence)
        .map(|line| {
            let text = if config.keep_unk {
                line.text.clone()
            } else {
                strip_unk(&line.text)
            };
            if config.autocorrect {
                correct_line(&text)
            } else {
                text
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
