//! Note entity as seen by the pipeline.
//!
//! Notes are owned by the host application. The pipeline only reads the
//! identity and the image payload.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use image::{DynamicImage, GenericImageView};
use uuid::Uuid;

use crate::error::Result;

/// A captured note.
#[derive(Clone)]
pub struct Note {
    /// Unique identity.
    pub id: Uuid,

    /// Human readable title.
    pub title: String,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Captured image, if the note still has one.
    pub image: Option<Arc<DynamicImage>>,
}

impl Note {
    /// Create a note with a fresh identity from an image.
    pub fn new(title: impl Into<String>, image: DynamicImage) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            created_at: Utc::now(),
            image: Some(Arc::new(image)),
        }
    }

    /// Load a note from an image file, titled after the file stem.
    pub fn from_path(path: &Path) -> Result<Self> {
        let image = image::open(path)?;
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Untitled note");
        Ok(Self::new(title, image))
    }

    /// Create a note that carries no image payload.
    pub fn without_image(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            created_at: Utc::now(),
            image: None,
        }
    }
}

impl fmt::Debug for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Note")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("created_at", &self.created_at)
            .field("image", &self.image.as_ref().map(|img| img.dimensions()))
            .finish()
    }
}
