//! Currency amount extraction.

use regex::Regex;

use super::patterns::amount_pattern;
use super::{ExtractionMatch, FieldExtractor};

/// Finds amounts written as the currency symbol followed by a number,
/// e.g. `£400` or `£750.00`. Matches are returned verbatim, symbol included.
#[derive(Debug, Clone)]
pub struct AmountExtractor {
    symbol: String,
    pattern: Regex,
}

impl AmountExtractor {
    pub fn new(symbol: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            symbol: symbol.to_string(),
            pattern: amount_pattern(symbol)?,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let found = self.pattern.find(text)?;
        let line = text[..found.start()].matches('\n').count();
        let source = text.lines().nth(line).unwrap_or(found.as_str());
        Some(ExtractionMatch::new(found.as_str().to_string(), source).with_line(line))
    }
}
