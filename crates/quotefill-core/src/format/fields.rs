//! Placeholder values derived from extracted fields.

use chrono::NaiveDate;
use tracing::debug;

use super::dates::{long_ordinal_date, normalize_user_date, short_date};
use super::words::currency_to_words;
use crate::models::config::FormattingConfig;
use crate::models::{FieldSet, FormattedFieldSet, Placeholder};

/// Builds the placeholder values for one run.
#[derive(Debug, Clone)]
pub struct FieldFormatter {
    config: FormattingConfig,
    currency_symbol: String,
    today: NaiveDate,
}

impl FieldFormatter {
    pub fn new(config: FormattingConfig, currency_symbol: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            config,
            currency_symbol: currency_symbol.into(),
            today,
        }
    }

    /// Derive every placeholder value from `fields`.
    pub fn format(&self, fields: &FieldSet) -> FormattedFieldSet {
        let mut out = FormattedFieldSet::new();

        out.insert(Placeholder::Figure1, fields.reference.as_str());

        let date = if fields.date.is_empty() {
            short_date(self.today, &self.config.short_date_format)
        } else {
            fields.date.clone()
        };
        out.insert(Placeholder::Figure2, date);

        out.insert(Placeholder::Figure3, fields.name.as_str());
        out.insert(Placeholder::Figure4, fields.address.as_str());
        out.insert(
            Placeholder::Figure6,
            long_ordinal_date(self.today, &self.config.long_date_prefix),
        );

        let amount = if fields.amount_raw.is_empty() {
            String::new()
        } else {
            currency_to_words(&fields.amount_raw, &self.currency_symbol, &self.config.currency)
        };
        out.insert(Placeholder::Figure7, amount);

        out.insert(Placeholder::Figure8, normalize_user_date(&fields.proposed_week));
        out.insert(Placeholder::Figure9, normalize_user_date(&fields.works_week));
        out.insert(Placeholder::Figure10, one_line_address(&fields.name, &fields.address));
        out.insert(Placeholder::Figure11, name_of_address(&fields.name, &fields.address));

        debug!("Formatted {} placeholders", out.len());
        out
    }
}

/// `"{name}, {address}"`, omitting empty parts.
fn one_line_address(name: &str, address: &str) -> String {
    [name, address]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `"{name} of {address}"`, omitting empty parts.
fn name_of_address(name: &str, address: &str) -> String {
    match (name.is_empty(), address.is_empty()) {
        (false, false) => format!("{} of {}", name, address),
        (false, true) => name.to_string(),
        (true, false) => address.to_string(),
        (true, true) => String::new(),
    }
}

/// Derive placeholder values with the given settings.
pub fn format_fields(
    fields: &FieldSet,
    today: NaiveDate,
    config: &FormattingConfig,
    currency_symbol: &str,
) -> FormattedFieldSet {
    FieldFormatter::new(config.clone(), currency_symbol, today).format(fields)
}
