//! English number and currency words.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::config::CurrencyNames;

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALES: [&str; 6] = ["", "thousand", "million", "billion", "trillion", "quadrillion"];

fn below_hundred(n: u64) -> String {
    debug_assert!(n < 100);
    if n < 20 {
        return ONES[n as usize].to_string();
    }
    let (tens, ones) = (n / 10, n % 10);
    if ones == 0 {
        TENS[tens as usize].to_string()
    } else {
        format!("{}-{}", TENS[tens as usize], ONES[ones as usize])
    }
}

fn below_thousand(n: u64) -> String {
    debug_assert!(n < 1000);
    let (hundreds, rest) = (n / 100, n % 100);
    match (hundreds, rest) {
        (0, rest) => below_hundred(rest),
        (h, 0) => format!("{} hundred", ONES[h as usize]),
        (h, rest) => format!("{} hundred and {}", ONES[h as usize], below_hundred(rest)),
    }
}

/// Spell out a whole number in British English long form.
///
/// Returns `None` for values beyond the quadrillions.
pub fn cardinal_words(n: u64) -> Option<String> {
    if n == 0 {
        return Some(ONES[0].to_string());
    }

    let mut groups = Vec::new();
    let mut rest = n;
    while rest > 0 {
        groups.push(rest % 1000);
        rest /= 1000;
    }
    if groups.len() > SCALES.len() {
        return None;
    }

    let mut words = String::new();
    for (scale, &group) in groups.iter().enumerate().rev() {
        if group == 0 {
            continue;
        }
        if !words.is_empty() {
            // A trailing group below one hundred reads "one thousand and five".
            words.push_str(if scale == 0 && group < 100 { " and " } else { ", " });
        }
        words.push_str(&below_thousand(group));
        if scale > 0 {
            words.push(' ');
            words.push_str(SCALES[scale]);
        }
    }

    Some(words)
}

/// Spell out a currency amount such as `£400`.
///
/// The result reads `"{major} pounds and {minor} pence ({raw})"` with unit
/// names taken from `names`. Input that does not start with `symbol`, or whose
/// number cannot be parsed, is returned unchanged.
pub fn currency_to_words(raw: &str, symbol: &str, names: &CurrencyNames) -> String {
    let Some(number) = raw.strip_prefix(symbol) else {
        return raw.to_string();
    };
    let Ok(value) = Decimal::from_str(number.trim()) else {
        return raw.to_string();
    };
    if value.is_sign_negative() {
        return raw.to_string();
    }

    let value = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let major = value.trunc();
    let minor = (value - major) * Decimal::ONE_HUNDRED;

    let (Some(major), Some(minor)) = (major.to_u64(), minor.to_u64()) else {
        return raw.to_string();
    };
    let (Some(major_words), Some(minor_words)) = (cardinal_words(major), cardinal_words(minor)) else {
        return raw.to_string();
    };

    let major_unit = if major == 1 { &names.major_singular } else { &names.major_plural };
    let minor_unit = if minor == 1 { &names.minor_singular } else { &names.minor_plural };

    format!(
        "{} {} and {} {} ({})",
        major_words, major_unit, minor_words, minor_unit, raw
    )
}
