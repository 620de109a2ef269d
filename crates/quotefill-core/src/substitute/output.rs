//! Filled output documents.

use std::fs;
use std::path::Path;

use lopdf::Document;
use tracing::info;

use super::SubstitutionMode;
use crate::error::{Result, SubstitutionError};
use crate::source::DocumentKind;

/// Counters from one substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubstitutionReport {
    /// Mode the substitution ran in.
    pub mode: SubstitutionMode,
    /// Literal tokens replaced in PDF content streams.
    pub replacements: usize,
    /// PDF form fields filled.
    pub form_fields: usize,
    /// Characters that could not be written to a content stream.
    pub unencodable_chars: usize,
}

impl SubstitutionReport {
    pub fn new(mode: SubstitutionMode) -> Self {
        Self {
            mode,
            replacements: 0,
            form_fields: 0,
            unencodable_chars: 0,
        }
    }
}

enum Body {
    Pdf(Document),
    Docx(Vec<u8>),
}

/// A filled template held in memory until it is written.
pub struct OutputDocument {
    body: Body,
    report: SubstitutionReport,
}

impl OutputDocument {
    pub(crate) fn pdf(document: Document, report: SubstitutionReport) -> Self {
        Self {
            body: Body::Pdf(document),
            report,
        }
    }

    pub(crate) fn docx(archive: Vec<u8>, report: SubstitutionReport) -> Self {
        Self {
            body: Body::Docx(archive),
            report,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match self.body {
            Body::Pdf(_) => DocumentKind::Pdf,
            Body::Docx(_) => DocumentKind::Docx,
        }
    }

    pub fn report(&self) -> &SubstitutionReport {
        &self.report
    }

    /// Serialize the document.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        match &mut self.body {
            Body::Pdf(document) => {
                let mut data = Vec::new();
                document
                    .save_to(&mut data)
                    .map_err(|e| SubstitutionError::Pdf(e.to_string()))?;
                Ok(data)
            }
            Body::Docx(archive) => Ok(archive.clone()),
        }
    }

    /// Write the document to `path`, creating parent directories.
    pub fn write(&mut self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let data = self.to_bytes()?;
        fs::write(path, &data)?;
        info!("Wrote {} output: {} ({} bytes)", self.kind(), path.display(), data.len());
        Ok(())
    }
}

impl std::fmt::Debug for OutputDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputDocument")
            .field("kind", &self.kind())
            .field("report", &self.report)
            .finish()
    }
}
