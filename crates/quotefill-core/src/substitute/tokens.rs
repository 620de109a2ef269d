//! Literal `{{name}}` token replacement.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::models::FormattedFieldSet;

lazy_static! {
    static ref TOKEN: Regex = Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").unwrap();
}

/// Replace every `{{name}}` whose name is in `fields`, left to right in a
/// single pass. Inserted values are not scanned again, so a value that
/// contains a token is emitted as-is. Unknown tokens are kept verbatim.
///
/// Returns the new text and the number of tokens replaced.
pub fn replace_tokens(text: &str, fields: &FormattedFieldSet) -> (String, usize) {
    let mut count = 0;
    let replaced = TOKEN.replace_all(text, |caps: &Captures| match fields.get(&caps[1]) {
        Some(value) => {
            count += 1;
            value.to_string()
        }
        None => caps[0].to_string(),
    });
    (replaced.into_owned(), count)
}
