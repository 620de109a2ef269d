//! Rule-based field extractors for quotation documents.

pub mod amounts;
pub mod contact;
pub mod labels;
pub mod patterns;

pub use amounts::AmountExtractor;
pub use contact::{ContactBlock, ContactBlockExtractor};
pub use labels::LabelExtractor;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence of the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;
}

/// A matched field value and where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Zero-based line the match came from, for line-oriented rules.
    pub line: Option<usize>,
    /// Text the value was taken from.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            line: None,
            source: source.into(),
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}
