//! `label: value` line extraction.

use regex::Regex;

use super::patterns::label_pattern;
use super::{ExtractionMatch, FieldExtractor};

/// Extracts the value following a fixed label at the start of a line.
///
/// Each line is trimmed before matching and only whole lines of the form
/// `Label: value` count. The value is trimmed as well.
#[derive(Debug, Clone)]
pub struct LabelExtractor {
    label: String,
    pattern: Regex,
}

impl LabelExtractor {
    pub fn new(label: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            label: label.to_string(),
            pattern: label_pattern(label)?,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    fn match_line(&self, index: usize, line: &str) -> Option<ExtractionMatch<String>> {
        let line = line.trim();
        let caps = self.pattern.captures(line)?;
        Some(ExtractionMatch::new(caps[1].trim().to_string(), line).with_line(index))
    }
}

impl FieldExtractor for LabelExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        text.lines()
            .enumerate()
            .find_map(|(index, line)| self.match_line(index, line))
    }
}

/// Value of the first `label: value` line, or an empty string.
pub fn extract_label(text: &str, label: &str) -> String {
    LabelExtractor::new(label)
        .ok()
        .and_then(|extractor| extractor.extract(text))
        .map(|m| m.value)
        .unwrap_or_default()
}
