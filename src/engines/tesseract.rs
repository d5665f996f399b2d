//! Tesseract engine implementation
//!
//! Uses tesseract-static for static linking (no system dependencies).
//! Downloads tessdata (training data) on first use unless a tessdata
//! directory is configured.

use super::cached_download;
use crate::config::Config;
use crate::engine::OcrEngine;
use crate::error::OcrError;
use image::DynamicImage;
use std::path::PathBuf;
use std::sync::OnceLock;
use tesseract_static::tesseract::Tesseract;

/// Tesseract OCR Engine
pub struct TesseractEngine {
    language: String,
    configured_tessdata: Option<PathBuf>,
    /// Resolved on first use
    tessdata_path: OnceLock<String>,
}

impl TesseractEngine {
    pub fn new(config: &Config) -> Self {
        Self {
            language: config.language.clone(),
            configured_tessdata: config.tessdata_path.clone(),
            tessdata_path: OnceLock::new(),
        }
    }

    fn tessdata(&self) -> Result<&str, OcrError> {
        if let Some(path) = self.tessdata_path.get() {
            return Ok(path);
        }

        let dir = match &self.configured_tessdata {
            Some(dir) => dir.clone(),
            None => {
                let file = format!("tessdata/{}.traineddata", self.language);
                let traineddata = cached_download(&tessdata_url(&self.language), &file)?;
                traineddata
                    .parent()
                    .map(|p| p.to_path_buf())
                    .ok_or_else(|| OcrError::Initialization("Invalid tessdata path".to_string()))?
            }
        };

        // Tesseract expects the directory, not the file
        let dir = dir
            .to_str()
            .map(|s| s.to_string())
            .ok_or_else(|| OcrError::Initialization("Invalid tessdata path".to_string()))?;

        tracing::info!(
            "Tesseract engine ready (tessdata: {}, language: {})",
            dir,
            self.language
        );
        Ok(self.tessdata_path.get_or_init(|| dir))
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn description(&self) -> &'static str {
        "Tesseract OCR engine - better for noisy or low quality scans"
    }

    fn recognize_image(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let tessdata = self.tessdata()?;

        let rgb_img = image.to_rgb8();
        let (width, height) = rgb_img.dimensions();

        // BMP is always supported by leptonica
        let mut bmp_data = Vec::new();
        rgb_img
            .write_to(&mut std::io::Cursor::new(&mut bmp_data), image::ImageFormat::Bmp)
            .map_err(|e| OcrError::Processing(format!("Failed to convert to BMP: {}", e)))?;

        tracing::debug!(
            "Processing image: {}x{}, BMP size: {} bytes",
            width,
            height,
            bmp_data.len()
        );

        let tess = Tesseract::new(Some(tessdata), Some(&self.language))
            .map_err(|e| OcrError::Initialization(format!("Failed to create Tesseract: {}", e)))?;

        let mut tess = tess
            .set_image_from_mem(&bmp_data)
            .map_err(|e| {
                OcrError::Processing(format!(
                    "Failed to set image ({}x{}, {} bytes): {}",
                    width,
                    height,
                    bmp_data.len(),
                    e
                ))
            })?
            .recognize()
            .map_err(|e| OcrError::Processing(format!("Failed to recognize text: {}", e)))?;

        let text = tess
            .get_text()
            .map_err(|e| OcrError::Processing(format!("Failed to get text: {}", e)))?;

        Ok(text.trim().to_string())
    }
}

/// tessdata_fast keeps downloads small
fn tessdata_url(language: &str) -> String {
    format!(
        "https://github.com/tesseract-ocr/tessdata_fast/raw/main/{}.traineddata",
        language
    )
}
