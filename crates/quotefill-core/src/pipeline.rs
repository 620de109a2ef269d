//! End-to-end fill pipeline: load, extract, prompt, format, substitute,
//! write and optionally convert.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::convert::Converter;
use crate::error::{ConversionError, ExtractionError, Result};
use crate::format::FieldFormatter;
use crate::models::{Field, FieldSet, FormattedFieldSet, QuoteFillConfig};
use crate::prompt::{DatePrompt, PROPOSED_WEEK_LABEL, WORKS_WEEK_LABEL};
use crate::quote::{ExtractionResult, QuoteParser, RuleQuoteParser};
use crate::source::{DocumentKind, DocumentLoader, SourceLoader};
use crate::substitute::{Substituter, SubstitutionReport, TemplateSubstituter};

/// File name stem used when no output path is given.
pub const DEFAULT_OUTPUT_STEM: &str = "final_output";

/// Inputs and outputs of one run.
#[derive(Debug, Clone)]
pub struct FillRequest {
    /// Quotation to extract fields from.
    pub source: PathBuf,
    /// Template containing placeholders.
    pub template: PathBuf,
    /// Where the filled template is written.
    pub output: PathBuf,
    /// Where the converted output is written, if conversion is wanted.
    pub converted_output: Option<PathBuf>,
}

impl FillRequest {
    /// Request writing `final_output.<ext>` next to the template.
    pub fn new(source: impl Into<PathBuf>, template: impl Into<PathBuf>) -> Self {
        let template = template.into();
        Self {
            output: default_output_path(&template),
            source: source.into(),
            template,
            converted_output: None,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_conversion(mut self, converted_output: impl Into<PathBuf>) -> Self {
        self.converted_output = Some(converted_output.into());
        self
    }
}

/// `final_output.<template extension>` in the template's directory.
pub fn default_output_path(template: &Path) -> PathBuf {
    let extension = template
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .or_else(|| DocumentKind::from_extension(template).map(|k| k.extension().to_string()))
        .unwrap_or_else(|| DocumentKind::Pdf.extension().to_string());
    let name = format!("{}.{}", DEFAULT_OUTPUT_STEM, extension);
    match template.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct FillReport {
    /// Raw fields, including prompted dates.
    pub fields: FieldSet,
    /// Values substituted into the template.
    pub placeholders: FormattedFieldSet,
    /// Path of the filled template.
    pub output: PathBuf,
    /// Substitution counters.
    pub substitution: SubstitutionReport,
    /// Path of the converted output, when conversion succeeded.
    pub converted: Option<PathBuf>,
    /// Conversion failure. The filled template is kept.
    pub conversion_error: Option<ConversionError>,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// The fill pipeline with its configuration.
pub struct FillPipeline {
    config: QuoteFillConfig,
    today: NaiveDate,
    loader: SourceLoader,
    parser: RuleQuoteParser,
}

impl FillPipeline {
    /// Create a pipeline dated today.
    pub fn new(config: QuoteFillConfig) -> Result<Self> {
        let parser = RuleQuoteParser::from_config(&config.extraction)?;
        Ok(Self {
            config,
            today: Local::now().date_naive(),
            loader: SourceLoader::new(),
            parser,
        })
    }

    /// Use a fixed date as "today".
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn config(&self) -> &QuoteFillConfig {
        &self.config
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Load a source document and extract its fields.
    pub fn extract(&self, source: &Path) -> Result<ExtractionResult> {
        let lines = self.loader.load(source)?;
        Ok(self.parser.parse(&lines))
    }

    /// Derive placeholder values from raw fields.
    pub fn format(&self, fields: &FieldSet) -> FormattedFieldSet {
        FieldFormatter::new(
            self.config.formatting.clone(),
            self.config.extraction.currency_symbol.as_str(),
            self.today,
        )
        .format(fields)
    }

    /// Run the whole pipeline for one source document.
    ///
    /// Fails before anything is written when the source has no reference.
    /// A conversion failure is recorded in the report and does not fail the
    /// run.
    pub fn run(&self, request: &FillRequest, prompt: &mut dyn DatePrompt) -> Result<FillReport> {
        let start = Instant::now();
        info!(
            "Filling {} from {}",
            request.template.display(),
            request.source.display()
        );

        let extraction = self.extract(&request.source)?;
        let mut fields = extraction.fields;
        if fields.reference.is_empty() {
            return Err(ExtractionError::MissingField(Field::Reference.to_string()).into());
        }

        if let Some(answer) = prompt.prompt_for_date(PROPOSED_WEEK_LABEL) {
            fields.set(Field::ProposedWeek, answer);
        }
        if let Some(answer) = prompt.prompt_for_date(WORKS_WEEK_LABEL) {
            fields.set(Field::WorksWeek, answer);
        }

        let placeholders = self.format(&fields);

        let substituter = TemplateSubstituter::new(self.config.substitution.mode);
        let mut document = substituter.substitute(&request.template, &placeholders)?;
        document.write(&request.output)?;

        let mut converted = None;
        let mut conversion_error = None;
        if let Some(target) = &request.converted_output {
            let converter = Converter::for_kind(&self.config.conversion, document.kind());
            match converter.convert(&request.output, target) {
                Ok(path) => converted = Some(path),
                Err(e) => {
                    warn!("Conversion failed, keeping {}: {}", request.output.display(), e);
                    conversion_error = Some(e);
                }
            }
        }

        Ok(FillReport {
            fields,
            placeholders,
            output: request.output.clone(),
            substitution: *document.report(),
            converted,
            conversion_error,
            warnings: extraction.warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::docx::tests::{build_docx, document_xml, paragraphs};
    use crate::docx::{extract_text, DOCUMENT_PART};
    use crate::error::QuoteFillError;
    use crate::models::config::CommandSpec;
    use crate::pdf::stream::tests::sample_document;
    use crate::prompt::{NoPrompt, PresetPrompt};
    use pretty_assertions::assert_eq;

    const QUOTE_LINES: [&str; 8] = [
        "ACME Roofing Ltd",
        "info@acme-roofing.co.uk",
        "Quote Ref: AB_123",
        "John Smith",
        "12 High Street",
        "Leeds LS1 4AB",
        "Replace ridge tiles",
        "Total £400",
    ];

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn pipeline() -> FillPipeline {
        FillPipeline::new(QuoteFillConfig::default())
            .unwrap()
            .with_today(today())
    }

    fn write_docx(path: &Path, lines: &[&str]) {
        let body = document_xml(&paragraphs(lines));
        std::fs::write(path, build_docx(&[(DOCUMENT_PART, body.as_str())])).unwrap();
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/docs/T&Cs_Template.docx")),
            PathBuf::from("/docs/final_output.docx")
        );
        assert_eq!(
            default_output_path(Path::new("template.PDF")),
            PathBuf::from("final_output.pdf")
        );
    }

    #[test]
    fn test_fill_docx_template() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("Quotation_Example.docx");
        let template = dir.path().join("T&Cs_Template.docx");
        write_docx(&source, &QUOTE_LINES);
        write_docx(
            &template,
            &[
                "Ref: {{figure1}}, Amount: {{figure7}}",
                "{{figure11}}, {{figure6}}",
                "Start {{ figure8 }}",
            ],
        );

        let request = FillRequest::new(&source, &template);
        let mut prompt = PresetPrompt::new().with_answer(PROPOSED_WEEK_LABEL, "3/11/26");
        let report = pipeline().run(&request, &mut prompt).unwrap();

        assert_eq!(report.output, dir.path().join("final_output.docx"));
        assert_eq!(report.fields.proposed_week, "3/11/26");
        assert_eq!(report.placeholders.get("figure9"), Some(""));

        let data = std::fs::read(&report.output).unwrap();
        let text = extract_text(Cursor::new(data)).unwrap();
        assert_eq!(
            text,
            "Ref: AB_123, Amount: four hundred pounds and zero pence (£400)\n\
             John Smith of 12 High Street Leeds LS1 4AB, dated 19th October 2026\n\
             Start 3rd November 2026\n"
        );
    }

    #[test]
    fn test_fill_pdf_template() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("quote.docx");
        write_docx(&source, &QUOTE_LINES);

        let template = dir.path().join("terms.pdf");
        let mut data = Vec::new();
        sample_document(&["Ref: {{figure1}}", "Issued {{figure2}}"])
            .save_to(&mut data)
            .unwrap();
        std::fs::write(&template, data).unwrap();

        let request = FillRequest::new(&source, &template).with_output(dir.path().join("out/filled.pdf"));
        let report = pipeline().run(&request, &mut NoPrompt).unwrap();

        assert_eq!(report.substitution.replacements, 2);
        let written = lopdf::Document::load(dir.path().join("out/filled.pdf")).unwrap();
        let page_id = written.get_pages()[&2];
        let content = String::from_utf8_lossy(&written.get_page_content(page_id).unwrap()).into_owned();
        assert!(content.contains("Issued 19/10/26"));
    }

    #[test]
    fn test_missing_reference_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("quote.docx");
        let template = dir.path().join("template.docx");
        write_docx(&source, &["Total £400"]);
        write_docx(&template, &["{{figure1}}"]);

        let request = FillRequest::new(&source, &template);
        let err = pipeline().run(&request, &mut NoPrompt).unwrap_err();

        assert!(matches!(
            err,
            QuoteFillError::Extraction(ExtractionError::MissingField(ref f)) if f == "reference"
        ));
        assert!(!request.output.exists());
    }

    #[test]
    fn test_unreadable_source() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.docx");
        write_docx(&template, &["{{figure1}}"]);

        let request = FillRequest::new(dir.path().join("missing.pdf"), &template);
        let err = pipeline().run(&request, &mut NoPrompt).unwrap_err();

        assert!(matches!(err, QuoteFillError::Document(_)));
        assert!(!request.output.exists());
    }

    #[test]
    fn test_conversion_failure_keeps_output() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("quote.docx");
        let template = dir.path().join("template.docx");
        write_docx(&source, &QUOTE_LINES);
        write_docx(&template, &["{{figure1}}"]);

        let mut config = QuoteFillConfig::default();
        config.conversion.docx = CommandSpec {
            program: "quotefill-no-such-converter".to_string(),
            args: vec!["{input}".to_string()],
        };
        let pipeline = FillPipeline::new(config).unwrap().with_today(today());

        let request = FillRequest::new(&source, &template).with_conversion(dir.path().join("final_output.pdf"));
        let report = pipeline.run(&request, &mut NoPrompt).unwrap();

        assert!(report.output.exists());
        assert!(report.converted.is_none());
        assert!(matches!(
            report.conversion_error,
            Some(ConversionError::Spawn { .. })
        ));
    }

    #[test]
    fn test_extract_only() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("quote.docx");
        write_docx(&source, &QUOTE_LINES);

        let result = pipeline().extract(&source).unwrap();

        assert_eq!(result.fields.reference, "AB_123");
        assert_eq!(result.fields.amount_raw, "£400");
        assert_eq!(result.fields.name, "John Smith");
        assert_eq!(result.fields.address, "12 High Street Leeds LS1 4AB");
        assert_eq!(result.line_count, QUOTE_LINES.len());
    }
}
