use crate::engine::OcrEngine;
use crate::error::OcrError;
use image::DynamicImage;
use std::path::Path;

const REASON: &str =
    "no OCR engine was compiled in; rebuild with --features engine-ocrs or --features engine-tesseract";

/// Stand-in used when the binary was built without any OCR engine
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableEngine;

impl OcrEngine for UnavailableEngine {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn description(&self) -> &'static str {
        "Placeholder that reports OCR as unavailable"
    }

    fn recognize_image(&self, _image: &DynamicImage) -> Result<String, OcrError> {
        Err(OcrError::Unavailable(REASON.to_string()))
    }

    fn recognize(&self, _path: &Path, _verbose: bool) -> Result<String, OcrError> {
        Err(OcrError::Unavailable(REASON.to_string()))
    }
}
