//! Placeholder substitution into templates.
//!
//! PDF templates carry literal `{{figureN}}` tokens in their content streams
//! or AcroForm fields named `figureN`; DOCX templates carry `{{ figureN }}`
//! merge fields. Templates are read into memory and never modified on disk.

mod output;
mod tokens;

pub use output::{OutputDocument, SubstitutionReport};
pub use tokens::replace_tokens;

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::docx::{self, RenderFailure};
use crate::error::{DocumentError, QuoteFillError, Result, SubstitutionError};
use crate::models::FormattedFieldSet;
use crate::pdf::{self, PdfExtractor, PdfProcessor};
use crate::source::{read_document, DocumentKind};

/// How placeholders are located in the template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutionMode {
    /// `Docx` for DOCX templates, `Content` and `Form` together for PDFs.
    #[default]
    Auto,
    /// Literal tokens in PDF content streams.
    Content,
    /// PDF AcroForm fields named after placeholders.
    Form,
    /// Merge fields in DOCX parts.
    Docx,
}

impl SubstitutionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SubstitutionMode::Auto => "auto",
            SubstitutionMode::Content => "content",
            SubstitutionMode::Form => "form",
            SubstitutionMode::Docx => "docx",
        }
    }
}

impl fmt::Display for SubstitutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fills a template with formatted field values.
pub trait Substituter {
    /// Produce the filled document for the template at `template`.
    fn substitute(&self, template: &Path, fields: &FormattedFieldSet) -> Result<OutputDocument>;
}

/// Substituter that dispatches on the template's format and the configured
/// mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateSubstituter {
    mode: SubstitutionMode,
}

impl TemplateSubstituter {
    pub fn new(mode: SubstitutionMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> SubstitutionMode {
        self.mode
    }

    fn check_mode(&self, kind: DocumentKind) -> std::result::Result<(), SubstitutionError> {
        let compatible = match (self.mode, kind) {
            (SubstitutionMode::Auto, _) => true,
            (SubstitutionMode::Content | SubstitutionMode::Form, DocumentKind::Pdf) => true,
            (SubstitutionMode::Docx, DocumentKind::Docx) => true,
            _ => false,
        };
        if compatible {
            Ok(())
        } else {
            Err(SubstitutionError::ModeMismatch {
                mode: self.mode.to_string(),
                kind: kind.to_string(),
            })
        }
    }

    fn substitute_pdf(
        &self,
        template: &Path,
        data: &[u8],
        fields: &FormattedFieldSet,
    ) -> Result<OutputDocument> {
        let mut extractor = PdfExtractor::new();
        extractor
            .load(data)
            .map_err(|e| DocumentError::unreadable(template, e))?;
        let mut document = extractor
            .into_document()
            .ok_or_else(|| DocumentError::unreadable(template, "no document loaded"))?;

        let mut report = SubstitutionReport::new(self.mode);
        let content = matches!(self.mode, SubstitutionMode::Auto | SubstitutionMode::Content);
        let form = matches!(self.mode, SubstitutionMode::Auto | SubstitutionMode::Form);

        if content {
            let streams = pdf::replace_in_content_streams(&mut document, fields)
                .map_err(|e| SubstitutionError::Pdf(e.to_string()))?;
            report.replacements += streams.replacements;
            report.unencodable_chars += streams.unencodable_chars;
        }
        if form {
            report.form_fields = pdf::fill_form_fields(&mut document, fields)
                .map_err(|e| SubstitutionError::Pdf(e.to_string()))?;
        }

        info!(
            "Filled PDF template: {} replacements, {} form fields",
            report.replacements, report.form_fields
        );
        Ok(OutputDocument::pdf(document, report))
    }

    fn substitute_docx(
        &self,
        template: &Path,
        data: Vec<u8>,
        fields: &FormattedFieldSet,
    ) -> Result<OutputDocument> {
        let archive = docx::render_template(Cursor::new(data), fields).map_err(|e| match e {
            RenderFailure::Template(e) => QuoteFillError::from(DocumentError::unreadable(template, e)),
            RenderFailure::Substitution(e) => QuoteFillError::from(e),
        })?;

        info!("Filled DOCX template: {} bytes", archive.len());
        Ok(OutputDocument::docx(archive, SubstitutionReport::new(self.mode)))
    }
}

impl Substituter for TemplateSubstituter {
    fn substitute(&self, template: &Path, fields: &FormattedFieldSet) -> Result<OutputDocument> {
        let data = read_document(template)?;
        let kind = DocumentKind::detect(template, &data)
            .ok_or_else(|| DocumentError::UnsupportedFormat(template.to_path_buf()))?;
        self.check_mode(kind)?;

        debug!("Substituting into {} template {} ({} mode)", kind, template.display(), self.mode);
        match kind {
            DocumentKind::Pdf => self.substitute_pdf(template, &data, fields),
            DocumentKind::Docx => self.substitute_docx(template, data, fields),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::tests::{build_docx, document_xml, paragraphs};
    use crate::docx::DOCUMENT_PART;
    use crate::models::Placeholder;
    use crate::pdf::stream::tests::sample_document;
    use pretty_assertions::assert_eq;

    fn fields() -> FormattedFieldSet {
        [
            (Placeholder::Figure1, "AB_123".to_string()),
            (
                Placeholder::Figure7,
                "four hundred pounds and zero pence (£400)".to_string(),
            ),
        ]
        .into_iter()
        .collect()
    }

    fn write_pdf(dir: &Path, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.join("template.pdf");
        let mut doc = sample_document(lines);
        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();
        std::fs::write(&path, data).unwrap();
        path
    }

    fn write_docx(dir: &Path, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.join("template.docx");
        let body = document_xml(&paragraphs(lines));
        std::fs::write(&path, build_docx(&[(DOCUMENT_PART, body.as_str())])).unwrap();
        path
    }

    #[test]
    fn test_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SubstitutionMode::Docx).unwrap(), r#""docx""#);
        assert_eq!(SubstitutionMode::default(), SubstitutionMode::Auto);
    }

    #[test]
    fn test_substitute_pdf_template() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_pdf(dir.path(), &["Ref: {{figure1}}, Amount: {{figure7}}"]);

        let output = TemplateSubstituter::default()
            .substitute(&template, &fields())
            .unwrap();

        assert_eq!(output.kind(), DocumentKind::Pdf);
        assert_eq!(output.report().replacements, 2);
        assert_eq!(output.report().form_fields, 0);
    }

    #[test]
    fn test_substitute_docx_template() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_docx(dir.path(), &["Ref: {{figure1}}, Amount: {{figure7}}"]);

        let mut output = TemplateSubstituter::default()
            .substitute(&template, &fields())
            .unwrap();

        assert_eq!(output.kind(), DocumentKind::Docx);
        let text = docx::extract_text(Cursor::new(output.to_bytes().unwrap())).unwrap();
        assert_eq!(
            text,
            "Ref: AB_123, Amount: four hundred pounds and zero pence (£400)\n"
        );
    }

    #[test]
    fn test_mode_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_docx(dir.path(), &["{{figure1}}"]);

        let err = TemplateSubstituter::new(SubstitutionMode::Content)
            .substitute(&template, &fields())
            .unwrap_err();

        assert!(matches!(
            err,
            QuoteFillError::Substitution(SubstitutionError::ModeMismatch { .. })
        ));
    }

    #[test]
    fn test_form_mode_leaves_content_alone() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_pdf(dir.path(), &["{{figure1}}"]);

        let output = TemplateSubstituter::new(SubstitutionMode::Form)
            .substitute(&template, &fields())
            .unwrap();

        assert_eq!(output.report().replacements, 0);
    }

    #[test]
    fn test_unreadable_template() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("broken.docx");
        std::fs::write(&template, b"PK\x03\x04not really a zip").unwrap();

        let err = TemplateSubstituter::default()
            .substitute(&template, &fields())
            .unwrap_err();

        assert!(matches!(
            err,
            QuoteFillError::Document(DocumentError::Unreadable { .. })
        ));
    }

    #[test]
    fn test_template_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_docx(dir.path(), &["{{#if}}"]);

        let err = TemplateSubstituter::default()
            .substitute(&template, &fields())
            .unwrap_err();

        assert!(matches!(
            err,
            QuoteFillError::Substitution(SubstitutionError::Render { .. })
        ));
    }
}
