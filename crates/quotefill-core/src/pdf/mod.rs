//! PDF processing module.

pub(crate) mod extractor;
mod form;
pub(crate) mod stream;

pub use extractor::PdfExtractor;
pub use form::{fill_form_fields, form_field_names};
pub use stream::{latin1_decode, latin1_encode, replace_in_content_streams, StreamReport};

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF text sources.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from every page, in page order.
    ///
    /// A page whose text cannot be extracted contributes an empty string.
    fn extract_pages(&self) -> Result<Vec<String>>;

    /// Extract text from a specific page (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String>;

    /// Extract text from the entire PDF, pages joined by newlines.
    fn extract_text(&self) -> Result<String> {
        Ok(self.extract_pages()?.join("\n"))
    }
}
