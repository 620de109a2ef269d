//! Date formatting: short dates, ordinal long dates and user input.

use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::quote::rules::patterns::USER_DATE;

/// Fallback for an unusable short date format.
const DEFAULT_SHORT_FORMAT: &str = "%d/%m/%y";

/// English ordinal suffix for a day of the month.
pub fn ordinal_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&(day % 100)) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Format a date with a strftime pattern. An invalid pattern falls back to
/// `DD/MM/YY`.
pub fn short_date(date: NaiveDate, format: &str) -> String {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        debug!("Invalid date format {:?}, using {}", format, DEFAULT_SHORT_FORMAT);
        return date.format(DEFAULT_SHORT_FORMAT).to_string();
    }
    date.format_with_items(items.into_iter()).to_string()
}

/// `19th October 2026`.
fn ordinal_date(date: NaiveDate) -> String {
    format!(
        "{}{} {} {}",
        date.day(),
        ordinal_suffix(date.day()),
        date.format("%B"),
        date.year()
    )
}

/// Long form with an ordinal day, e.g. `dated 19th October 2026`.
pub fn long_ordinal_date(date: NaiveDate, prefix: &str) -> String {
    if prefix.is_empty() {
        ordinal_date(date)
    } else {
        format!("{} {}", prefix, ordinal_date(date))
    }
}

/// Two-digit years: 00-50 are 2000s, 51-99 are 1900s.
fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if s.len() <= 2 {
        if year <= 50 {
            2000 + year
        } else {
            1900 + year
        }
    } else {
        year
    }
}

/// Normalise a date typed as `D/M/YY` or `D/M/YYYY` to its long ordinal
/// form. Anything else, including impossible dates, is returned unchanged.
pub fn normalize_user_date(input: &str) -> String {
    let Some(caps) = USER_DATE.captures(input.trim()) else {
        return input.to_string();
    };
    let day: u32 = caps[1].parse().unwrap_or(0);
    let month: u32 = caps[2].parse().unwrap_or(0);
    let year = parse_year(&caps[3]);

    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => ordinal_date(date),
        None => input.to_string(),
    }
}
