//! Direct text extraction
//!
//! The converter only sees the `TextSource` / `PdfDocument` pair. The
//! lopdf-backed implementation reads embedded text objects page by page so
//! a single broken page does not take the rest of the document with it.

use crate::error::{ConvertError, PageError};
use lopdf::{Document, ObjectId};
use std::collections::BTreeMap;
use std::path::Path;

/// Opens documents for text extraction
pub trait TextSource: Send + Sync {
    /// Open and parse the whole document. Failure here is fatal.
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, ConvertError>;
}

/// An opened document. Dropping it releases the underlying handle.
pub trait PdfDocument {
    fn page_count(&self) -> usize;

    /// Plain text of a 1-based page
    fn page_text(&self, page: u32) -> Result<String, PageError>;
}

/// Text source backed by lopdf
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfTextSource;

impl TextSource for LopdfTextSource {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, ConvertError> {
        let doc = Document::load(path).map_err(|e| ConvertError::ExtractionFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // Loading already decrypts with the empty user password; a second
        // decrypt pass would garble every stream
        if doc.is_encrypted() && doc.encryption_state.is_none() {
            tracing::warn!(
                "{} is encrypted with a user password; pages will not be readable",
                path.display()
            );
        }

        let pages = doc.get_pages();
        tracing::debug!("Opened {} ({} pages)", path.display(), pages.len());

        Ok(Box::new(LopdfDocument { doc, pages }))
    }
}

struct LopdfDocument {
    doc: Document,
    pages: BTreeMap<u32, ObjectId>,
}

impl PdfDocument for LopdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page: u32) -> Result<String, PageError> {
        if !self.pages.contains_key(&page) {
            return Err(PageError(format!("page {} does not exist", page)));
        }

        self.doc
            .extract_text(&[page])
            .map_err(|e| PageError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_is_fatal() {
        let result = LopdfTextSource.open(Path::new("non_existent_file.pdf"));
        assert!(matches!(
            result,
            Err(ConvertError::ExtractionFailed { .. })
        ));
    }

    #[test]
    fn test_non_pdf_content_is_fatal() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"this is plainly not a PDF document").unwrap();

        let result = LopdfTextSource.open(file.path());
        assert!(matches!(
            result,
            Err(ConvertError::ExtractionFailed { .. })
        ));
    }
}
