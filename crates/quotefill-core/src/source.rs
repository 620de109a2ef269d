//! Source document loading.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::docx;
use crate::error::DocumentError;
use crate::pdf::{PdfExtractor, PdfProcessor};

/// Container format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Fixed-layout PDF.
    Pdf,
    /// Flow-layout WordprocessingML archive.
    Docx,
}

impl DocumentKind {
    /// Detect the format from the leading bytes, falling back to the file
    /// extension.
    pub fn detect(path: &Path, head: &[u8]) -> Option<Self> {
        if head.starts_with(b"%PDF") {
            return Some(Self::Pdf);
        }
        if head.starts_with(b"PK\x03\x04") {
            return Some(Self::Docx);
        }
        Self::from_extension(path)
    }

    /// Guess the format from the file extension alone.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" | "docm" | "dotx" => Some(Self::Docx),
            _ => None,
        }
    }

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Ordered, immutable lines of document text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineSequence {
    lines: Vec<String>,
}

impl LineSequence {
    /// Split text into lines (`\n` or `\r\n`).
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The full text, lines joined by `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl<S: Into<String>> FromIterator<S> for LineSequence {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Loads a document's text as lines.
pub trait DocumentLoader {
    /// Read the document at `path`.
    fn load(&self, path: &Path) -> Result<LineSequence, DocumentError>;
}

/// Loader that dispatches on the detected container format.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceLoader;

impl SourceLoader {
    pub fn new() -> Self {
        Self
    }

    fn load_pdf(&self, path: &Path, data: &[u8]) -> Result<String, DocumentError> {
        let mut extractor = PdfExtractor::new();
        extractor
            .load(data)
            .map_err(|e| DocumentError::unreadable(path, e))?;
        let pages = extractor
            .extract_pages()
            .map_err(|e| DocumentError::unreadable(path, e))?;
        debug!("Extracted {} pages from {}", pages.len(), path.display());
        Ok(pages.join("\n"))
    }

    fn load_docx(&self, path: &Path, data: Vec<u8>) -> Result<String, DocumentError> {
        docx::extract_text(std::io::Cursor::new(data)).map_err(|e| DocumentError::unreadable(path, e))
    }
}

impl DocumentLoader for SourceLoader {
    fn load(&self, path: &Path) -> Result<LineSequence, DocumentError> {
        let data = read_document(path)?;
        let kind = DocumentKind::detect(path, &data)
            .ok_or_else(|| DocumentError::UnsupportedFormat(path.to_path_buf()))?;

        info!("Loading {} source: {}", kind, path.display());
        let text = match kind {
            DocumentKind::Pdf => self.load_pdf(path, &data)?,
            DocumentKind::Docx => self.load_docx(path, data)?,
        };

        let lines = LineSequence::from_text(&text);
        debug!("Source has {} lines", lines.len());
        Ok(lines)
    }
}

/// Read a whole document into memory. The file handle is closed before
/// returning, on success and on failure.
pub(crate) fn read_document(path: &Path) -> Result<Vec<u8>, DocumentError> {
    let file = File::open(path).map_err(|e| DocumentError::unreadable(path, e))?;
    let mut data = Vec::new();
    BufReader::new(file)
        .read_to_end(&mut data)
        .map_err(|e| DocumentError::unreadable(path, e))?;
    Ok(data)
}

/// Detect the kind of a document on disk.
pub fn detect_kind(path: &Path) -> Result<DocumentKind, DocumentError> {
    let mut head = [0u8; 8];
    let read = File::open(path)
        .and_then(|mut f| f.read(&mut head))
        .map_err(|e| DocumentError::unreadable(path, e))?;
    DocumentKind::detect(path, &head[..read]).ok_or_else(|| DocumentError::UnsupportedFormat(PathBuf::from(path)))
}

/// Load a source document with the default loader.
pub fn load(path: &Path) -> Result<LineSequence, DocumentError> {
    SourceLoader::new().load(path)
}
