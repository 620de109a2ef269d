//! Quotation field extraction module.

mod parser;
pub mod rules;

pub use parser::{ExtractionResult, QuoteParser, RuleQuoteParser};

use crate::models::FieldSet;
use crate::source::LineSequence;

/// Trait for quotation field extractors.
///
/// Extraction never fails: a field that cannot be found is left empty.
pub trait QuoteExtractor {
    /// Extract fields from the lines of a source document.
    fn extract(&self, lines: &LineSequence) -> FieldSet;

    /// Extract fields from plain text.
    fn extract_from_text(&self, text: &str) -> FieldSet {
        self.extract(&LineSequence::from_text(text))
    }
}
