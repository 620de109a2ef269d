//! Common regex patterns for quotation extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Any decimal digit.
    pub static ref DIGIT: Regex = Regex::new(r"\d").unwrap();

    /// A run of whitespace separating tokens.
    pub static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    /// Numeric part of an amount once the currency symbol is removed.
    pub static ref AMOUNT_NUMBER: Regex = Regex::new(r"^\d+(?:\.\d+)?$").unwrap();

    /// A date typed by the user: D/M/YY or D/M/YYYY.
    pub static ref USER_DATE: Regex = Regex::new(
        r"^(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})$"
    ).unwrap();
}

/// Pattern for a `label: value` line. The label is matched literally and
/// case-sensitively.
pub fn label_pattern(label: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"^{}:\s*(.+)$", regex::escape(label)))
}

/// Pattern for a currency amount: the symbol followed by digits and an
/// optional fractional part.
pub fn amount_pattern(symbol: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"{}\d+(?:\.\d+)?", regex::escape(symbol)))
}

/// Whether the text contains a decimal digit.
pub fn has_digit(text: &str) -> bool {
    DIGIT.is_match(text)
}

/// Number of whitespace-separated tokens.
pub fn token_count(text: &str) -> usize {
    WHITESPACE.split(text.trim()).filter(|t| !t.is_empty()).count()
}
