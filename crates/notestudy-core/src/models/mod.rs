//! Data models: flashcards, notes, and configuration.

pub mod config;
pub mod flashcard;
pub mod note;
