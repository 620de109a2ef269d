//! Rule-based quotation parser.

use std::time::Instant;

use tracing::{debug, info};

use crate::error::QuoteFillError;
use crate::models::config::ExtractionConfig;
use crate::models::{Field, FieldSet};
use crate::source::LineSequence;

use super::rules::{
    AmountExtractor, ContactBlockExtractor, ExtractionMatch, FieldExtractor, LabelExtractor,
};
use super::QuoteExtractor;

/// Result of quotation extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted fields.
    pub fields: FieldSet,
    /// Number of source lines scanned.
    pub line_count: usize,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for quotation parsing.
pub trait QuoteParser {
    /// Parse a quotation, reporting what could not be found.
    fn parse(&self, lines: &LineSequence) -> ExtractionResult;
}

/// Parser built from the extraction rules.
#[derive(Debug, Clone)]
pub struct RuleQuoteParser {
    reference: LabelExtractor,
    date: LabelExtractor,
    amount: AmountExtractor,
    contact: ContactBlockExtractor,
}

impl RuleQuoteParser {
    /// Create a parser from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, QuoteFillError> {
        let invalid = |e: regex::Error| QuoteFillError::Config(format!("invalid extraction pattern: {}", e));

        Ok(Self {
            reference: LabelExtractor::new(&config.reference_label).map_err(invalid)?,
            date: LabelExtractor::new(&config.date_label).map_err(invalid)?,
            amount: AmountExtractor::new(&config.currency_symbol).map_err(invalid)?,
            contact: ContactBlockExtractor::new(
                config.contact_markers.clone(),
                config.max_address_lines,
            ),
        })
    }

    /// Replace the name/address scan settings.
    pub fn with_contact_block(mut self, markers: Vec<String>, max_address_lines: usize) -> Self {
        self.contact = ContactBlockExtractor::new(markers, max_address_lines);
        self
    }
}

impl QuoteExtractor for RuleQuoteParser {
    fn extract(&self, lines: &LineSequence) -> FieldSet {
        let text = lines.text();
        let mut fields = FieldSet::default();

        for (field, found) in [
            (Field::Reference, self.reference.extract(&text)),
            (Field::Date, self.date.extract(&text)),
            (Field::AmountRaw, self.amount.extract(&text)),
        ] {
            if let Some(found) = found {
                fields.set(field, take_match(field, found));
            }
        }

        let block = self.contact.extract(lines.iter());
        fields.name = block.name;
        fields.address = block.address;

        fields
    }
}

fn take_match(field: Field, found: ExtractionMatch<String>) -> String {
    match found.line {
        Some(line) => debug!("{} from line {}: {:?}", field, line + 1, found.source),
        None => debug!("{} from {:?}", field, found.source),
    }
    found.value
}

impl QuoteParser for RuleQuoteParser {
    fn parse(&self, lines: &LineSequence) -> ExtractionResult {
        let start = Instant::now();
        info!("Parsing quotation from {} lines", lines.len());

        let fields = self.extract(lines);

        let warnings: Vec<String> = fields
            .missing()
            .into_iter()
            .map(|f| format!("Could not extract {}", f))
            .collect();
        for warning in &warnings {
            debug!("{}", warning);
        }

        ExtractionResult {
            fields,
            line_count: lines.len(),
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parser() -> RuleQuoteParser {
        RuleQuoteParser::from_config(&ExtractionConfig::default()).unwrap()
    }

    const QUOTE: &str = "ACME Roofing Ltd
info@acme-roofing.co.uk
www.acme-roofing.co.uk

Quote Ref: AB_123
Date: 01/02/2025

John Smith
12 High Street
Leeds LS1 4AB

Replace ridge tiles
Total: £400";

    #[test]
    fn test_extract_full_quote() {
        let fields = parser().extract_from_text(QUOTE);

        assert_eq!(fields.reference, "AB_123");
        assert_eq!(fields.date, "01/02/2025");
        assert_eq!(fields.amount_raw, "£400");
        assert_eq!(fields.name, "John Smith");
        assert_eq!(fields.address, "12 High Street Leeds LS1 4AB");
        assert_eq!(fields.proposed_week, "");
        assert_eq!(fields.works_week, "");
    }

    #[test]
    fn test_reference_and_amount_only() {
        let fields = parser().extract_from_text("Quote Ref: AB_123\nPrice £400");
        assert_eq!(fields.reference, "AB_123");
        assert_eq!(fields.amount_raw, "£400");
        assert_eq!(fields.name, "");
    }

    #[test]
    fn test_parse_reports_missing_fields() {
        let result = parser().parse(&LineSequence::from_text("Quote Ref: AB_123"));

        assert_eq!(result.line_count, 1);
        assert_eq!(result.fields.reference, "AB_123");
        assert!(result.warnings.contains(&"Could not extract amount_raw".to_string()));
        assert!(!result.warnings.iter().any(|w| w.contains("reference")));
    }

    #[test]
    fn test_empty_document() {
        let fields = parser().extract(&LineSequence::default());
        assert_eq!(fields, FieldSet::default());
    }

    #[test]
    fn test_single_address_line() {
        let fields = parser()
            .with_contact_block(vec!["@".to_string()], 1)
            .extract_from_text(QUOTE);
        assert_eq!(fields.address, "12 High Street");
    }

    #[test]
    fn test_custom_labels() {
        let config = ExtractionConfig {
            reference_label: "Our Ref".to_string(),
            currency_symbol: "€".to_string(),
            ..ExtractionConfig::default()
        };
        let parser = RuleQuoteParser::from_config(&config).unwrap();
        let fields = parser.extract_from_text("Quote Ref: AB_123\nOur Ref: X-9\nTotal €99.50 / £80");

        assert_eq!(fields.reference, "X-9");
        assert_eq!(fields.amount_raw, "€99.50");
    }
}
