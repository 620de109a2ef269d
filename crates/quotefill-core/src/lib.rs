//! Core library for filling quotation terms templates.
//!
//! This crate provides:
//! - Source loading (PDF text per page, DOCX text including text boxes)
//! - Rule-based quotation field extraction (reference, date, amount, name, address)
//! - Field formatting (amounts in words, ordinal dates)
//! - Placeholder substitution into PDF content streams, PDF forms and DOCX templates
//! - Optional conversion of the filled template through an external command

pub mod convert;
pub mod docx;
pub mod error;
pub mod format;
pub mod models;
pub mod pdf;
pub mod pipeline;
pub mod prompt;
pub mod quote;
pub mod source;
pub mod substitute;

pub use convert::Converter;
pub use error::{QuoteFillError, Result};
pub use format::{format_fields, FieldFormatter};
pub use models::{Field, FieldSet, FormattedFieldSet, Placeholder, QuoteFillConfig};
pub use pipeline::{default_output_path, FillPipeline, FillReport, FillRequest};
pub use prompt::{DatePrompt, NoPrompt, PresetPrompt, TerminalPrompt};
pub use quote::{ExtractionResult, QuoteExtractor, QuoteParser, RuleQuoteParser};
pub use source::{DocumentKind, DocumentLoader, LineSequence, SourceLoader};
pub use substitute::{
    replace_tokens, OutputDocument, SubstitutionMode, SubstitutionReport, Substituter,
    TemplateSubstituter,
};
