//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::{ModelConfig, RecognitionAccuracy};

use super::{RecognitionBackend, RecognitionOptions, RecognizedLine};

/// Vertical bucket height, in pixels, for grouping boxes into rows.
const ROW_HEIGHT: f64 = 20.0;

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    accuracy: RecognitionAccuracy,
}

impl PureOcrEngine {
    /// Create an engine from model files in a directory.
    pub fn from_dir(
        model_dir: &Path,
        models: &ModelConfig,
        accuracy: RecognitionAccuracy,
    ) -> Result<Self, OcrError> {
        let det_path = model_dir.join(&models.detection_model);
        let rec_path = model_dir.join(&models.recognition_model);
        let dict_path = model_dir.join(&models.dictionary);

        if !det_path.exists() {
            return Err(OcrError::ModelLoad(format!(
                "detection model not found at {}",
                det_path.display()
            )));
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!(
            "Loaded pure-onnx-ocr engine ({}) from {}",
            accuracy,
            model_dir.display()
        );

        Ok(Self { engine, accuracy })
    }

    /// Create an engine for an accuracy level, using its model variant directory.
    pub fn for_accuracy(models: &ModelConfig, accuracy: RecognitionAccuracy) -> Result<Self, OcrError> {
        Self::from_dir(&models.variant_dir(accuracy), models, accuracy)
    }

    /// Accuracy level of the loaded models.
    pub fn accuracy(&self) -> RecognitionAccuracy {
        self.accuracy
    }
}

impl RecognitionBackend for PureOcrEngine {
    fn recognize(
        &self,
        image: &DynamicImage,
        options: &RecognitionOptions,
    ) -> Result<Vec<RecognizedLine>, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!("{}x{}", width, height)));
        }

        if options.accuracy != self.accuracy {
            debug!(
                "Requested {} recognition but {} models are loaded",
                options.accuracy, self.accuracy
            );
        }

        info!("Recognizing image: {}x{}", width, height);

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let mut positioned: Vec<((f64, f64), RecognizedLine)> = results
            .iter()
            .map(|r| {
                (
                    top_left(&r.bounding_box),
                    RecognizedLine::new(r.text.clone(), r.confidence),
                )
            })
            .collect();

        // Sort by reading order
        positioned.sort_by(|(a, _), (b, _)| {
            let row_a = (a.1 / ROW_HEIGHT) as i64;
            let row_b = (b.1 / ROW_HEIGHT) as i64;
            if row_a != row_b {
                row_a.cmp(&row_b)
            } else {
                a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal)
            }
        });

        let lines: Vec<RecognizedLine> = positioned.into_iter().map(|(_, line)| line).collect();

        info!(
            "OCR complete: {} lines in {}ms",
            lines.len(),
            start.elapsed().as_millis()
        );

        Ok(lines)
    }
}

/// Top-left corner of the axis-aligned rectangle around a polygon.
fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f64, f64) {
    polygon
        .exterior()
        .coords()
        .take(4)
        .fold((f64::INFINITY, f64::INFINITY), |(x, y), c| (x.min(c.x), y.min(c.y)))
}
