//! In-memory recognition backend for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use image::{DynamicImage, GenericImageView};

use crate::error::OcrError;
use crate::ocr::{RecognitionBackend, RecognitionOptions, RecognizedLine};

/// A 1-pixel-high image whose width selects the scripted response.
pub fn blank_image(width: u32) -> DynamicImage {
    DynamicImage::new_rgb8(width, 1)
}

#[derive(Clone)]
enum Script {
    Lines(Vec<String>),
    Fail(String),
}

/// Backend that answers by image width, optionally after a delay.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    scripts: HashMap<u32, Script>,
    delays: HashMap<u32, Duration>,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lines(mut self, width: u32, lines: &[&str]) -> Self {
        self.scripts.insert(
            width,
            Script::Lines(lines.iter().map(|l| l.to_string()).collect()),
        );
        self
    }

    pub fn with_failure(mut self, width: u32, reason: &str) -> Self {
        self.scripts.insert(width, Script::Fail(reason.to_string()));
        self
    }

    pub fn with_delay(mut self, width: u32, delay: Duration) -> Self {
        self.delays.insert(width, delay);
        self
    }

    /// Most recognitions that were ever running at once, across clones.
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl RecognitionBackend for ScriptedBackend {
    fn recognize(
        &self,
        image: &DynamicImage,
        _options: &RecognitionOptions,
    ) -> Result<Vec<RecognizedLine>, OcrError> {
        let (width, _) = image.dimensions();

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&width) {
            std::thread::sleep(*delay);
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.scripts.get(&width) {
            Some(Script::Lines(lines)) => Ok(lines
                .iter()
                .map(|line| RecognizedLine::new(line.clone(), 1.0))
                .collect()),
            Some(Script::Fail(reason)) => Err(OcrError::Recognition(reason.clone())),
            None => Ok(Vec::new()),
        }
    }
}
