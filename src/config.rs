use crate::cli::Args;
use std::path::PathBuf;

/// Default OCR language
pub const DEFAULT_LANGUAGE: &str = "eng";

/// Converter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Run OCR when direct extraction finds no text
    pub ocr_fallback: bool,
    /// Log per-page progress at info level
    pub verbose: bool,
    /// OCR engine name; `None` picks the registry default
    pub ocr_engine: Option<String>,
    pub language: String,
    pub tessdata_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ocr_fallback: true,
            verbose: false,
            ocr_engine: None,
            language: DEFAULT_LANGUAGE.to_string(),
            tessdata_path: None,
        }
    }
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        Self {
            ocr_fallback: !args.no_ocr,
            verbose: !args.quiet,
            ocr_engine: args.ocr_engine.clone(),
            language: args.language.clone(),
            tessdata_path: args.tessdata_path.clone(),
        }
    }
}
