//! Tolerant parsing for hand-edited or imported documents.

use serde::{Deserialize, Deserializer, de::IgnoredAny};

use crate::domain::validation::optional_text;

/// A count as it may appear in stored data: a number, a numeric string, or
/// something else entirely.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum LenientCount {
    Int(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

impl LenientCount {
    /// The non-negative integer this value represents, if it is numeric.
    ///
    /// Fractions truncate and negatives clamp to zero.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn to_count(&self) -> Option<u32> {
        let value = match self {
            Self::Int(n) => *n,
            Self::Float(f) if f.is_finite() => *f as i64,
            Self::Text(s) => leading_integer(s)?,
            Self::Float(_) | Self::Other(_) => return None,
        };
        Some(value.clamp(0, i64::from(u32::MAX)) as u32)
    }
}

/// The integer at the start of `text`, ignoring leading whitespace and
/// anything after the digits: `"12.7"` is 12 and `"5 units"` is 5.
fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Deserialize a value that may be `null`, reading `null` as the default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize optional text, reading blank or `null` values as absent.
pub(crate) fn blank_as_none<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(optional_text(Option::<String>::deserialize(deserializer)?))
}

/// Deserialize a requested quantity, reading non-numeric values as one unit.
pub(crate) fn units<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(LenientCount::deserialize(deserializer)?
        .to_count()
        .unwrap_or(1))
}

/// Coerce free-form user input to a quantity.
///
/// Only the leading integer counts, so `"12.7"` is 12 and `"5 units"` is 5.
/// Input that does not start with a number is treated as zero; negative
/// input clamps to zero.
#[must_use]
pub fn coerce_units(input: &str) -> u32 {
    LenientCount::Text(input.to_string()).to_count().unwrap_or(0)
}
