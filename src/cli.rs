//! Command line surface: arguments, input validation and the output file

use crate::config::{Config, DEFAULT_LANGUAGE};
use crate::converter::{ConversionResult, Converter};
use crate::error::ConvertError;
use clap::{ArgAction, Parser};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "pdf-converter")]
#[command(about = "A fast PDF to text converter with OCR capabilities")]
#[command(
    long_about = "A fast PDF to text converter with OCR capabilities.\n\n\
    Text-based PDFs are extracted directly. When a document has pages without \
    extractable text, the whole document is run through OCR instead.\n\n\
    Output is saved as <pdf_file>_extracted.txt next to the input."
)]
#[command(version, disable_version_flag = true)]
pub struct Args {
    /// PDF file to convert
    #[arg(value_name = "PDF_FILE")]
    pub file: PathBuf,

    /// Show version information
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,

    /// Disable OCR fallback for documents without extractable text
    #[arg(long, env = "PDF_CONVERTER_NO_OCR")]
    pub no_ocr: bool,

    /// OCR engine to use (defaults to the first one compiled in)
    #[arg(long, env = "PDF_CONVERTER_OCR_ENGINE")]
    pub ocr_engine: Option<String>,

    /// OCR language (e.g., "eng")
    #[arg(long, env = "PDF_CONVERTER_LANGUAGE", default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    /// Path to tessdata directory (downloaded on first use if not set)
    #[arg(long, env = "TESSDATA_PREFIX")]
    pub tessdata_path: Option<PathBuf>,

    /// Write the text here instead of <pdf_file>_extracted.txt
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print the conversion summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Do not log per-page progress
    #[arg(short, long)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

/// Reject paths that are missing or not named like a PDF
pub fn validate_pdf_path(path: &Path) -> Result<(), ConvertError> {
    if path.as_os_str().is_empty() {
        return Err(ConvertError::InvalidInput("file path is required".to_string()));
    }

    if !path.exists() {
        return Err(ConvertError::InvalidInput(format!(
            "file '{}' not found",
            path.display()
        )));
    }

    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return Err(ConvertError::InvalidInput(format!(
            "file '{}' is not a PDF file",
            path.display()
        )));
    }

    Ok(())
}

/// `report.pdf` -> `report_extracted.txt`, in the same directory
pub fn output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{}_extracted.txt", stem))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Contents of the output file
pub fn render_output(input: &Path, result: &ConversionResult) -> String {
    format!(
        "PDF: {}\nExtraction Method: {}\n\n{}",
        display_name(input),
        result.method,
        result.text
    )
}

#[derive(Serialize)]
struct Summary<'a> {
    input: String,
    output: String,
    method: &'a str,
    total_pages: usize,
    line_count: usize,
    word_count: usize,
    character_count: usize,
    average_words_per_page: Option<f64>,
}

/// Convert the file named by `args` and write the output file
pub fn run(args: &Args) -> anyhow::Result<()> {
    use anyhow::Context;

    validate_pdf_path(&args.file)?;

    if !args.json {
        println!("Converting '{}'...", display_name(&args.file));
    }

    let converter = Converter::new(Config::from(args))?;
    let result = converter
        .convert(&args.file)
        .context("Error converting PDF")?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| output_path(&args.file));
    std::fs::write(&output, render_output(&args.file, &result))
        .with_context(|| format!("Error writing output to {}", output.display()))?;

    tracing::info!(
        "Wrote {} characters to {}",
        result.character_count,
        output.display()
    );

    if args.json {
        let summary = Summary {
            input: args.file.display().to_string(),
            output: output.display().to_string(),
            method: result.method.as_str(),
            total_pages: result.total_pages,
            line_count: result.line_count,
            word_count: result.word_count,
            character_count: result.character_count,
            average_words_per_page: result.average_words_per_page(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Conversion completed using {}", result.method);
    println!("Text saved to: {}", output.display());
    println!(
        "Stats: {} pages, {} lines, {} words, {} characters",
        result.total_pages, result.line_count, result.word_count, result.character_count
    );
    if let Some(avg) = result.average_words_per_page() {
        println!("Avg words/page: {:.2}", avg);
    }

    Ok(())
}
