//! Conversion orchestrator
//!
//! Direct text extraction first; when the assembled document has no usable
//! text, the whole document goes through OCR instead. Page and OCR failures
//! end up inline in the text, only a document that cannot be opened is an
//! error.

use crate::config::Config;
use crate::engine::OcrEngine;
use crate::engines::EngineRegistry;
use crate::error::ConvertError;
use crate::pdf::{LopdfTextSource, TextSource};
use serde::Serialize;
use std::fmt::{self, Write};
use std::path::Path;
use std::sync::Arc;

/// Written in place of a page whose extracted text is blank
pub const NO_TEXT_MARKER: &str = "[No text content found on this page]";

/// How the final text was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExtractionMethod {
    #[serde(rename = "Text Extraction")]
    TextExtraction,
    #[serde(rename = "OCR")]
    Ocr,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextExtraction => "Text Extraction",
            Self::Ocr => "OCR",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text and statistics of one converted document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionResult {
    pub text: String,
    pub method: ExtractionMethod,
    pub total_pages: usize,
    pub line_count: usize,
    pub word_count: usize,
    pub character_count: usize,
}

impl ConversionResult {
    pub fn average_words_per_page(&self) -> Option<f64> {
        (self.total_pages > 0).then(|| self.word_count as f64 / self.total_pages as f64)
    }
}

/// Result of reading one page directly
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PageText {
    Text(String),
    Empty,
    Failed(String),
}

/// Per-page text before statistics are computed
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExtractionOutcome {
    pub pages: Vec<PageText>,
    pub total_pages: usize,
}

impl ExtractionOutcome {
    /// Page count header followed by one block per page
    pub fn render(&self) -> String {
        let mut text = String::new();
        let _ = write!(text, "Total Pages: {}\n\n", self.total_pages);

        for (index, page) in self.pages.iter().enumerate() {
            let number = index + 1;
            let _ = writeln!(text, "=== PAGE {} ===", number);

            match page {
                PageText::Failed(reason) => {
                    let _ = writeln!(text, "[Error reading page {}: {}]", number, reason);
                    continue;
                }
                PageText::Empty => {
                    text.push_str(NO_TEXT_MARKER);
                    text.push('\n');
                }
                PageText::Text(page_text) => text.push_str(page_text),
            }
            text.push_str("\n\n");
        }

        text
    }
}

/// Line, word and character counts of the final text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TextStats {
    pub lines: usize,
    pub words: usize,
    pub characters: usize,
}

impl TextStats {
    /// Lines are a plain split on `\n`, so a trailing newline counts as an
    /// extra empty line.
    pub fn of(text: &str) -> Self {
        Self {
            lines: text.split('\n').count(),
            words: text.split_whitespace().count(),
            characters: text.chars().count(),
        }
    }
}

/// True when direct extraction left nothing worth keeping
fn needs_ocr(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || trimmed.contains(NO_TEXT_MARKER)
}

/// Converts PDF documents to text
pub struct Converter {
    config: Config,
    text_source: Arc<dyn TextSource>,
    ocr: Arc<dyn OcrEngine>,
}

impl Converter {
    /// Converter backed by lopdf and the configured OCR engine
    pub fn new(config: Config) -> Result<Self, ConvertError> {
        let registry = EngineRegistry::new(&config);
        let ocr = registry.resolve(config.ocr_engine.as_deref())?;
        tracing::debug!("Using OCR engine '{}': {}", ocr.name(), ocr.description());

        Ok(Self::with_backends(config, Arc::new(LopdfTextSource), ocr))
    }

    pub fn with_backends(
        config: Config,
        text_source: Arc<dyn TextSource>,
        ocr: Arc<dyn OcrEngine>,
    ) -> Self {
        Self {
            config,
            text_source,
            ocr,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Convert a PDF file to text, using OCR if necessary
    pub fn convert(&self, path: &Path) -> Result<ConversionResult, ConvertError> {
        let outcome = self.extract_text(path)?;
        let mut text = outcome.render();
        let mut method = ExtractionMethod::TextExtraction;

        if self.config.ocr_fallback && needs_ocr(&text) {
            tracing::info!(
                "No usable text in {}, running OCR with {}",
                path.display(),
                self.ocr.name()
            );
            match self.ocr.recognize(path, self.config.verbose) {
                Ok(ocr_text) => {
                    text = ocr_text;
                    method = ExtractionMethod::Ocr;
                }
                Err(e) => {
                    tracing::warn!("OCR failed for {}: {}", path.display(), e);
                    let _ = writeln!(text, "\nWARNING: OCR failed: {}", e);
                }
            }
        }

        let stats = TextStats::of(&text);
        tracing::debug!(
            "Converted {} via {}: {} lines, {} words, {} characters",
            path.display(),
            method,
            stats.lines,
            stats.words,
            stats.characters
        );

        Ok(ConversionResult {
            text,
            method,
            total_pages: outcome.total_pages,
            line_count: stats.lines,
            word_count: stats.words,
            character_count: stats.characters,
        })
    }

    fn extract_text(&self, path: &Path) -> Result<ExtractionOutcome, ConvertError> {
        let doc = self.text_source.open(path)?;
        let total_pages = doc.page_count();

        let mut pages = Vec::with_capacity(total_pages);
        for number in 1..=total_pages {
            if self.config.verbose {
                tracing::info!("Extracting page {}/{}...", number, total_pages);
            } else {
                tracing::debug!("Extracting page {}/{}...", number, total_pages);
            }

            let page = match doc.page_text(number as u32) {
                Ok(page_text) if page_text.trim().is_empty() => PageText::Empty,
                Ok(page_text) => PageText::Text(page_text),
                Err(e) => {
                    tracing::warn!("Page {} of {}: {}", number, path.display(), e);
                    PageText::Failed(e.to_string())
                }
            };
            pages.push(page);
        }

        Ok(ExtractionOutcome { pages, total_pages })
    }
}
