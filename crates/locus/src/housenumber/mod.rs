//! House numbers: country-specific normalization, extraction from free text and
//! resolution against the numbers known for a street.

mod interpolation;

use once_cell::sync::Lazy;
use regex::Regex;

pub use interpolation::{HouseNumberMatch, Neighbour, interpolate};

/// `10 Main St`, `12/3b, Hauptstraße`
static LEADING_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d{1,4}(?:/\d{1,4})?[a-zA-Z]?)[\s,]+(\D.*)$").expect("valid regex")
});

/// `Hauptstraße 5`, `Mostová 1234/5a`
static TRAILING_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\D+?)\s+(\d{1,4}[a-zA-Z]?(?:/\d{1,4}[a-zA-Z]?)?)\s*$").expect("valid regex")
});

/// How a country writes house numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingScheme {
    /// The first run of digits is the number: `12`, `12b`, `12-14`.
    Default,
    /// Slovak and Czech addresses combine a land-registry number and an orientation
    /// number as `1234/5`; the orientation number after the slash locates the door.
    ConscriptionOrientation,
}

impl NumberingScheme {
    #[must_use]
    pub fn for_country(country_code: Option<&str>) -> Self {
        match country_code.map(str::to_ascii_uppercase).as_deref() {
            Some("SK" | "CZ") => Self::ConscriptionOrientation,
            _ => Self::Default,
        }
    }

    /// Integer value of `number`, or `None` when it has no usable digits.
    #[must_use]
    pub fn normalize(self, number: &str) -> Option<i64> {
        match self {
            Self::Default => first_digit_run(number),
            Self::ConscriptionOrientation => match number.split_once('/') {
                Some((_, orientation)) => first_digit_run(orientation),
                None => first_digit_run(number),
            },
        }
    }
}

fn first_digit_run(text: &str) -> Option<i64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Split a house number off free text, returning `(number, remaining text)`.
///
/// A leading number (`10 Main St`) wins over a trailing one; the trailing form is
/// only looked for at the end of the first comma-separated segment
/// (`Hauptstraße 5, Berlin`).
#[must_use]
pub fn split_house_number(text: &str) -> (Option<String>, String) {
    if let Some(caps) = LEADING_NUMBER_RE.captures(text) {
        return (Some(caps[1].to_string()), caps[2].trim().to_string());
    }

    let (first, rest) = match text.split_once(',') {
        Some((first, rest)) => (first, Some(rest)),
        None => (text, None),
    };
    if let Some(caps) = TRAILING_NUMBER_RE.captures(first) {
        let street = caps[1].trim();
        let remaining = match rest {
            Some(rest) => format!("{street},{rest}"),
            None => street.to_string(),
        };
        return (Some(caps[2].to_string()), remaining);
    }

    (None, text.trim().to_string())
}
