//! Name and address block heuristic.
//!
//! Quotations put the supplier's contact line (email or website) above the
//! customer block. The customer name is the first later line that reads like
//! a name, and the address is the run of digit-bearing lines right after it.
//! The layout assumption is brittle; documents that do not follow it yield
//! empty values rather than guesses.

use tracing::trace;

use super::patterns::{has_digit, token_count};

/// Name and address found by [`ContactBlockExtractor`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactBlock {
    pub name: String,
    pub address: String,
}

impl ContactBlock {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.address.is_empty()
    }
}

/// Scans lines for the customer name and address.
#[derive(Debug, Clone)]
pub struct ContactBlockExtractor {
    markers: Vec<String>,
    max_address_lines: usize,
}

impl ContactBlockExtractor {
    pub fn new(markers: Vec<String>, max_address_lines: usize) -> Self {
        Self {
            markers,
            max_address_lines,
        }
    }

    fn is_anchor(&self, line: &str) -> bool {
        self.markers.iter().any(|m| !m.is_empty() && line.contains(m.as_str()))
    }

    fn is_name(line: &str) -> bool {
        !has_digit(line) && !line.contains('@') && token_count(line) >= 2
    }

    /// Extract the block from the given lines.
    pub fn extract<'a, I>(&self, lines: I) -> ContactBlock
    where
        I: IntoIterator<Item = &'a str>,
    {
        let lines: Vec<&str> = lines
            .into_iter()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        let Some(anchor) = lines.iter().position(|l| self.is_anchor(l)) else {
            trace!("No contact line found");
            return ContactBlock::default();
        };

        let Some(offset) = lines[anchor + 1..].iter().position(|l| Self::is_name(l)) else {
            trace!("No name line after contact line {}", anchor);
            return ContactBlock::default();
        };
        let name_index = anchor + 1 + offset;

        let address: Vec<&str> = lines[name_index + 1..]
            .iter()
            .take_while(|l| has_digit(l))
            .take(self.max_address_lines)
            .copied()
            .collect();

        ContactBlock {
            name: lines[name_index].to_string(),
            address: address.join(" "),
        }
    }
}

impl Default for ContactBlockExtractor {
    fn default() -> Self {
        Self::new(vec!["@".to_string(), "www.".to_string()], 2)
    }
}
