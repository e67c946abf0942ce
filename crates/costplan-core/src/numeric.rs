//! Lenient numeric and label parsing
//!
//! Persisted and imported numbers are not trusted: strings with comma
//! decimal separators, trailing percent signs, `null` and non-numeric
//! junk all have to be accepted. Anything that cannot be read as a number
//! becomes 0 instead of an error.
//!
//! Enum labels (scope, priority, type, charge type) get the same
//! treatment: a blank or unrecognised label reads as absent.

use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// Parse a user-entered number.
///
/// Normalizes `,` to `.`, strips `%` and surrounding whitespace. The value
/// is returned as written: `"20%"` yields `20.0`, not `0.2`.
/// Unparsable or non-finite input yields 0.
///
/// ```rust
/// use costplan_core::numeric::parse_number;
///
/// assert_eq!(parse_number("12,5%"), 12.5);
/// assert_eq!(parse_number(" 3 "), 3.0);
/// assert_eq!(parse_number("n/a"), 0.0);
/// ```
pub fn parse_number(raw: &str) -> f64 {
    try_parse_number(raw).unwrap_or(0.0)
}

/// Like [`parse_number`] but reports unparsable input as `None`
pub fn try_parse_number(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', ".").replace('%', "");
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

/// Deserialize a number, falling back to 0 for anything malformed
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawNumber::deserialize(deserializer)? {
        RawNumber::Number(value) if value.is_finite() => value,
        RawNumber::Text(text) => parse_number(&text),
        _ => 0.0,
    })
}

/// Deserialize an optional number; malformed values become `None`
pub fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawNumber::deserialize(deserializer)? {
        RawNumber::Number(value) if value.is_finite() => Some(value),
        RawNumber::Text(text) => try_parse_number(&text),
        _ => None,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLabel {
    Text(String),
    Other(serde::de::IgnoredAny),
}

/// Deserialize an optional enum label through its `FromStr` impl.
///
/// Blank, unrecognised and non-string values become `None`.
pub fn lenient_label<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    Ok(match RawLabel::deserialize(deserializer)? {
        RawLabel::Text(text) => text.parse().ok(),
        RawLabel::Other(_) => None,
    })
}

/// Deserialize an enum label, falling back to the type's default
pub fn lenient_label_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    Ok(lenient_label(deserializer)?.unwrap_or_default())
}
