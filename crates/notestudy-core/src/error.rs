//! Error types for the notestudy-core library.

use thiserror::Error;

/// Main error type for the notestudy library.
#[derive(Error, Debug)]
pub enum NoteStudyError {
    /// Text recognition error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Sentence tagging error.
    #[error("tagging error: {0}")]
    Tagging(#[from] TaggingError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by a text recognition backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// The note carries no image payload.
    #[error("note has no image payload")]
    MissingImage,

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors raised by a sentence tagger on a single extraction unit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaggingError {
    /// The tagger backend is not available.
    #[error("tagger unavailable: {0}")]
    Unavailable(String),

    /// The tagger produced a span outside the unit or off a char boundary.
    #[error("invalid span {start}..{end} for unit of length {len}")]
    InvalidSpan { start: usize, end: usize, len: usize },
}

/// Result type for the notestudy library.
pub type Result<T> = std::result::Result<T, NoteStudyError>;
