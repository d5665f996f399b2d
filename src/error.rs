use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that abort a conversion
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("failed to extract text from {}: {reason}", path.display())]
    ExtractionFailed { path: PathBuf, reason: String },

    #[error("Unknown OCR engine '{name}' (available: {available})")]
    UnknownEngine { name: String, available: String },

    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A single page that could not be read. Recorded inline, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct PageError(pub String);

/// OCR failures. These never abort a conversion; the converter reports
/// them inline in the extracted text.
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Failed to initialize OCR engine: {0}")]
    Initialization(String),

    #[error("{0}")]
    Processing(String),

    #[error("OCR is not available in this build: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_failed_names_the_file() {
        let err = ConvertError::ExtractionFailed {
            path: PathBuf::from("/tmp/broken.pdf"),
            reason: "invalid file header".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to extract text from /tmp/broken.pdf: invalid file header"
        );
    }

    #[test]
    fn test_unavailable_message() {
        let err = OcrError::Unavailable("rebuild with an OCR engine".to_string());
        assert!(err.to_string().starts_with("OCR is not available"));
    }
}
