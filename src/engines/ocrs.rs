//! OCRS engine implementation
//!
//! Pure Rust OCR engine using the ocrs library. No system dependencies required.
//! Downloads neural network models automatically on first use.

use super::cached_download;
use crate::config::Config;
use crate::engine::OcrEngine;
use crate::error::OcrError;
use image::DynamicImage;
use ocrs::{DecodeMethod, ImageSource, OcrEngine as OcrsOcrEngine, OcrEngineParams};
use rten::Model;
use std::sync::OnceLock;

/// Default model URLs from the ocrs project
const DETECTION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten";
const RECOGNITION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten";

/// OCR Engine wrapping the ocrs library. Models are loaded on first use so
/// documents that never need OCR never pay for the download.
pub struct OcrsEngine {
    engine: OnceLock<OcrsOcrEngine>,
}

impl OcrsEngine {
    pub fn new(_config: &Config) -> Self {
        Self {
            engine: OnceLock::new(),
        }
    }

    fn engine(&self) -> Result<&OcrsOcrEngine, OcrError> {
        if let Some(engine) = self.engine.get() {
            return Ok(engine);
        }
        let engine = load_engine()?;
        Ok(self.engine.get_or_init(|| engine))
    }
}

fn load_engine() -> Result<OcrsOcrEngine, OcrError> {
    tracing::info!("Initializing ocrs OCR engine...");

    let detection_model_path = cached_download(DETECTION_MODEL_URL, "text-detection.rten")?;
    let recognition_model_path = cached_download(RECOGNITION_MODEL_URL, "text-recognition.rten")?;

    let detection_model = Model::load_file(&detection_model_path).map_err(|e| {
        OcrError::Initialization(format!("Failed to load detection model: {}", e))
    })?;
    let recognition_model = Model::load_file(&recognition_model_path).map_err(|e| {
        OcrError::Initialization(format!("Failed to load recognition model: {}", e))
    })?;

    let engine = OcrsOcrEngine::new(OcrEngineParams {
        detection_model: Some(detection_model),
        recognition_model: Some(recognition_model),
        decode_method: DecodeMethod::Greedy,
        ..Default::default()
    })
    .map_err(|e| OcrError::Initialization(format!("Failed to create OCR engine: {}", e)))?;

    tracing::info!("ocrs engine initialized successfully");
    Ok(engine)
}

impl OcrEngine for OcrsEngine {
    fn name(&self) -> &'static str {
        "ocrs"
    }

    fn description(&self) -> &'static str {
        "Pure Rust OCR engine - fast, no system dependencies required"
    }

    fn recognize_image(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let engine = self.engine()?;

        // ImageSource::from_bytes expects HWC RGB8
        let rgb_img = image.to_rgb8();
        let dimensions = rgb_img.dimensions();

        let img_source = ImageSource::from_bytes(rgb_img.as_raw(), dimensions).map_err(|e| {
            OcrError::Processing(format!("Failed to create image source: {}", e))
        })?;

        let ocr_input = engine
            .prepare_input(img_source)
            .map_err(|e| OcrError::Processing(format!("Failed to prepare input: {}", e)))?;

        let word_rects = engine
            .detect_words(&ocr_input)
            .map_err(|e| OcrError::Processing(format!("Failed to detect words: {}", e)))?;

        let line_rects = engine.find_text_lines(&ocr_input, &word_rects);

        let line_texts = engine
            .recognize_text(&ocr_input, &line_rects)
            .map_err(|e| OcrError::Processing(format!("Failed to recognize text: {}", e)))?;

        Ok(line_texts
            .iter()
            .filter_map(|line| line.as_ref())
            .map(|line| {
                line.words()
                    .map(|word| word.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
