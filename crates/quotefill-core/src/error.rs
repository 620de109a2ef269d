//! Error types for the quotefill-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the quotefill library.
#[derive(Error, Debug)]
pub enum QuoteFillError {
    /// Source or template document error.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Placeholder substitution error.
    #[error("substitution error: {0}")]
    Substitution(#[from] SubstitutionError),

    /// Fixed-layout conversion error.
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while opening or parsing a source or template document.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file could not be opened or its container could not be parsed.
    #[error("cannot read {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },

    /// The file is neither a PDF nor a DOCX archive.
    #[error("unsupported document format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

impl DocumentError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Unreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to DOCX archives.
#[derive(Error, Debug)]
pub enum DocxError {
    /// The file is not a readable ZIP archive.
    #[error("failed to open archive: {0}")]
    Archive(String),

    /// A required part is missing from the archive.
    #[error("missing part: {0}")]
    MissingPart(String),

    /// A part is not well-formed XML.
    #[error("malformed XML in {part}: {reason}")]
    Xml { part: String, reason: String },
}

/// Errors related to field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A mandatory field resolved to an empty value.
    #[error("missing required field: {0}")]
    MissingField(String),
}

/// Errors raised while substituting placeholders into a template.
#[derive(Error, Debug)]
pub enum SubstitutionError {
    /// The template engine rejected the template part.
    #[error("failed to render {part}: {reason}")]
    Render { part: String, reason: String },

    /// A PDF object could not be read or rewritten.
    #[error("PDF object error: {0}")]
    Pdf(String),

    /// The substitution mode does not apply to this template.
    #[error("mode {mode} cannot be used with {kind} templates")]
    ModeMismatch { mode: String, kind: String },

    /// Rebuilding the output archive failed.
    #[error("failed to write archive: {0}")]
    Archive(String),
}

/// Errors from the external fixed-layout converter.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The converter process could not be started.
    #[error("failed to start {program}: {reason}")]
    Spawn { program: String, reason: String },

    /// The converter exited unsuccessfully.
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    /// The converter reported success but produced no file.
    #[error("converter produced no output at {}", .0.display())]
    MissingOutput(PathBuf),
}

/// Result type for the quotefill library.
pub type Result<T> = std::result::Result<T, QuoteFillError>;
