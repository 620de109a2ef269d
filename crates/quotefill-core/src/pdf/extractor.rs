//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, warn};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// PDF text extractor.
///
/// pdf-extract lays text out better than lopdf, so it is tried first for the
/// whole document; lopdf is the per-page fallback.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Take the loaded document, leaving the extractor empty.
    pub fn into_document(self) -> Option<Document> {
        self.document
    }

    fn extract_pages_with_pdf_extract(&self) -> Option<Vec<String>> {
        // pdf-extract can panic on malformed fonts
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(&self.raw_data)
        }));

        match result {
            Ok(Ok(pages)) => Some(pages),
            Ok(Err(e)) => {
                debug!("pdf-extract failed: {:?}, falling back to lopdf", e);
                None
            }
            Err(_) => {
                debug!("pdf-extract panicked, falling back to lopdf");
                None
            }
        }
    }

    fn extract_page_with_lopdf(&self, doc: &Document, page: u32) -> String {
        match doc.extract_text(&[page]) {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to extract text from page {}: {}", page, e);
                String::new()
            }
        }
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_pages(&self) -> Result<Vec<String>> {
        let doc = self.document.as_ref().ok_or(PdfError::Parse("No document loaded".to_string()))?;
        let page_count = self.page_count();

        if let Some(pages) = self.extract_pages_with_pdf_extract() {
            if pages.len() == page_count as usize {
                return Ok(pages);
            }
            debug!(
                "pdf-extract returned {} pages, expected {}; using lopdf",
                pages.len(),
                page_count
            );
        }

        Ok((1..=page_count)
            .map(|page| self.extract_page_with_lopdf(doc, page))
            .collect())
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        let doc = self.document.as_ref().ok_or(PdfError::Parse("No document loaded".to_string()))?;
        if page == 0 || page > self.page_count() {
            return Err(PdfError::InvalidPage(page));
        }
        Ok(self.extract_page_with_lopdf(doc, page))
    }
}
