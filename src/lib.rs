//! PDF to text conversion with OCR fallback.
//!
//! [`Converter`] extracts embedded text page by page. Documents that come
//! back without usable text are handed to an [`OcrEngine`] as a whole.

pub mod cli;
pub mod config;
pub mod converter;
pub mod engine;
pub mod engines;
pub mod error;
pub mod pdf;
pub mod raster;

pub use config::Config;
pub use converter::{ConversionResult, Converter, ExtractionMethod, NO_TEXT_MARKER};
pub use engine::OcrEngine;
pub use engines::EngineRegistry;
pub use error::{ConvertError, OcrError, PageError};
pub use pdf::{LopdfTextSource, PdfDocument, TextSource};
