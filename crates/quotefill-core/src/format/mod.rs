//! Display formatting of extracted fields.

pub mod dates;
pub mod fields;
pub mod words;

pub use dates::{long_ordinal_date, normalize_user_date, ordinal_suffix, short_date};
pub use fields::{format_fields, FieldFormatter};
pub use words::{cardinal_words, currency_to_words};
