//! Extracted and formatted field models.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A raw field pulled from a source document or supplied by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Quote reference code.
    Reference,
    /// Document date as written in the source.
    Date,
    /// Currency amount including its symbol.
    AmountRaw,
    /// Customer name.
    Name,
    /// Customer address.
    Address,
    /// Proposed week commencing, supplied by the user.
    ProposedWeek,
    /// Works week commencing, supplied by the user.
    WorksWeek,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Reference,
        Field::Date,
        Field::AmountRaw,
        Field::Name,
        Field::Address,
        Field::ProposedWeek,
        Field::WorksWeek,
    ];

    /// Fields read from the source document rather than supplied by the user.
    pub const EXTRACTED: [Field; 5] = [
        Field::Reference,
        Field::Date,
        Field::AmountRaw,
        Field::Name,
        Field::Address,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Reference => "reference",
            Field::Date => "date",
            Field::AmountRaw => "amount_raw",
            Field::Name => "name",
            Field::Address => "address",
            Field::ProposedWeek => "proposed_week",
            Field::WorksWeek => "works_week",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw field values. A field that was not found is an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSet {
    pub reference: String,
    pub date: String,
    pub amount_raw: String,
    pub name: String,
    pub address: String,
    pub proposed_week: String,
    pub works_week: String,
}

impl FieldSet {
    /// Get a field value by key.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Reference => &self.reference,
            Field::Date => &self.date,
            Field::AmountRaw => &self.amount_raw,
            Field::Name => &self.name,
            Field::Address => &self.address,
            Field::ProposedWeek => &self.proposed_week,
            Field::WorksWeek => &self.works_week,
        }
    }

    /// Set a field value by key.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Reference => &mut self.reference,
            Field::Date => &mut self.date,
            Field::AmountRaw => &mut self.amount_raw,
            Field::Name => &mut self.name,
            Field::Address => &mut self.address,
            Field::ProposedWeek => &mut self.proposed_week,
            Field::WorksWeek => &mut self.works_week,
        };
        *slot = value.into();
    }

    /// Extracted fields that resolved to an empty value.
    pub fn missing(&self) -> Vec<Field> {
        Field::EXTRACTED
            .into_iter()
            .filter(|f| self.get(*f).is_empty())
            .collect()
    }
}

/// Placeholder tokens understood by existing templates.
///
/// The token names are fixed; templates in circulation depend on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Placeholder {
    /// Reference code.
    Figure1,
    /// Document date, short form.
    Figure2,
    /// Name.
    Figure3,
    /// Address.
    Figure4,
    /// Today, long ordinal form.
    Figure6,
    /// Amount in words.
    Figure7,
    /// Proposed week.
    Figure8,
    /// Works week.
    Figure9,
    /// Name and address on one line.
    Figure10,
    /// "name of address".
    Figure11,
}

impl Placeholder {
    pub const ALL: [Placeholder; 10] = [
        Placeholder::Figure1,
        Placeholder::Figure2,
        Placeholder::Figure3,
        Placeholder::Figure4,
        Placeholder::Figure6,
        Placeholder::Figure7,
        Placeholder::Figure8,
        Placeholder::Figure9,
        Placeholder::Figure10,
        Placeholder::Figure11,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Placeholder::Figure1 => "figure1",
            Placeholder::Figure2 => "figure2",
            Placeholder::Figure3 => "figure3",
            Placeholder::Figure4 => "figure4",
            Placeholder::Figure6 => "figure6",
            Placeholder::Figure7 => "figure7",
            Placeholder::Figure8 => "figure8",
            Placeholder::Figure9 => "figure9",
            Placeholder::Figure10 => "figure10",
            Placeholder::Figure11 => "figure11",
        }
    }

    /// Literal marker as it appears in a content stream, e.g. `{{figure1}}`.
    pub fn token(self) -> String {
        format!("{{{{{}}}}}", self.name())
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Display strings keyed by placeholder name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormattedFieldSet {
    values: BTreeMap<String, String>,
}

impl FormattedFieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, placeholder: Placeholder, value: impl Into<String>) {
        self.values.insert(placeholder.name().to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(Placeholder, String)> for FormattedFieldSet {
    fn from_iter<I: IntoIterator<Item = (Placeholder, String)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (placeholder, value) in iter {
            set.insert(placeholder, value);
        }
        set
    }
}
