use crate::error::OcrError;
use crate::raster;
use image::DynamicImage;
use std::fmt::Write;
use std::path::Path;

/// Placeholder for a page where recognition found nothing
pub const NO_TEXT_DETECTED: &str = "[No text detected via OCR]";

/// Trait that all OCR engines must implement
pub trait OcrEngine: Send + Sync {
    /// Returns the engine identifier (e.g., "ocrs", "tesseract")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Recognize the text in a single raster image
    fn recognize_image(&self, image: &DynamicImage) -> Result<String, OcrError>;

    /// Recognize every page of a PDF.
    ///
    /// The output mirrors the layout of direct extraction: a page count
    /// header, then one `=== PAGE n ===` block per page. Per-page failures
    /// are written inline; only a document that cannot be loaded at all is
    /// an error. Per-page progress logs at `info` when `verbose`, otherwise
    /// at `debug`.
    fn recognize(&self, path: &Path, verbose: bool) -> Result<String, OcrError> {
        let doc = lopdf::Document::load(path)
            .map_err(|e| OcrError::Processing(format!("failed to open PDF: {}", e)))?;

        let pages = raster::page_images(&doc);
        let total = pages.len();

        let mut text = String::new();
        let _ = write!(text, "Total Pages: {}\n\n", total);

        for (index, (page, images)) in pages.into_iter().enumerate() {
            if verbose {
                tracing::info!("Processing page {}/{} with OCR...", index + 1, total);
            } else {
                tracing::debug!("Processing page {}/{} with OCR...", index + 1, total);
            }
            let _ = writeln!(text, "=== PAGE {} ===", page);

            let images = match images {
                Ok(images) => images,
                Err(e) => {
                    let _ = writeln!(text, "[Error converting page {} to image: {}]", page, e);
                    continue;
                }
            };

            match self.recognize_page(&images) {
                Ok(page_text) if !page_text.trim().is_empty() => text.push_str(&page_text),
                Ok(_) => {
                    text.push_str(NO_TEXT_DETECTED);
                    text.push('\n');
                }
                Err(e) => {
                    let _ = writeln!(text, "[OCR error on page {}: {}]", page, e);
                    continue;
                }
            }
            text.push_str("\n\n");
        }

        Ok(text)
    }

    /// Recognize all images of one page, joined line by line
    fn recognize_page(&self, images: &[DynamicImage]) -> Result<String, OcrError> {
        let mut lines = Vec::with_capacity(images.len());
        for image in images {
            let recognized = self.recognize_image(image)?;
            if !recognized.trim().is_empty() {
                lines.push(recognized);
            }
        }
        Ok(lines.join("\n"))
    }
}
