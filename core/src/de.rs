//! Lenient request decoding.
//!
//! Clients send identifiers and counts either as JSON numbers or as strings,
//! and use `""` for "not provided". These helpers fold all of those into
//! `Option`s so validation only has to look at one shape.

use crate::error::{BanquetError, Result};
use serde::{Deserialize, Deserializer, de::Error as _};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

/// 2^63; whole floats in `[-2^63, 2^63)` convert to `i64` exactly.
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

/// Decode an integer id given as number, numeric string, blank or null.
///
/// # Errors
///
/// Fails on non-numeric text.
pub fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Int(n)) => Ok(Some(n)),
        #[allow(clippy::cast_possible_truncation)]
        Some(Scalar::Float(f)) if f.fract() == 0.0 && (-TWO_POW_63..TWO_POW_63).contains(&f) => {
            Ok(Some(f as i64))
        }
        Some(Scalar::Float(f)) => Err(D::Error::custom(format!("invalid id: {f}"))),
        Some(Scalar::Bool(b)) => Err(D::Error::custom(format!("invalid id: {b}"))),
        Some(Scalar::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                trimmed
                    .parse()
                    .map(Some)
                    .map_err(|_| D::Error::custom(format!("invalid id: {s}")))
            }
        }
    }
}

/// Decode a head count given as number, numeric string, blank or null.
///
/// # Errors
///
/// Fails on text that is not an integer or a value outside `i32`.
pub fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(id) = lenient_id(deserializer)? else {
        return Ok(None);
    };
    i32::try_from(id)
        .map(Some)
        .map_err(|_| D::Error::custom(format!("count out of range: {id}")))
}

/// Decode free text, treating blank strings as absent and numbers as text.
///
/// # Errors
///
/// Fails only when the value is an array or object.
pub fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        None => None,
        Some(Scalar::Int(n)) => Some(n.to_string()),
        Some(Scalar::Float(f)) => Some(f.to_string()),
        Some(Scalar::Bool(b)) => Some(b.to_string()),
        Some(Scalar::Text(s)) if s.trim().is_empty() => None,
        Some(Scalar::Text(s)) => Some(s),
    })
}

/// Parse an id taken from a query string or path segment.
///
/// # Errors
///
/// - [`BanquetError::MissingFields`] when absent or blank
/// - [`BanquetError::InvalidIdFormat`] when not an integer
pub fn parse_id(field: &'static str, raw: Option<&str>) -> Result<i64> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let Some(raw) = raw else {
        return Err(BanquetError::MissingFields(vec![field]));
    };
    raw.parse().map_err(|_| BanquetError::InvalidIdFormat {
        field,
        value: raw.to_string(),
    })
}

/// Accumulates the names of absent required fields in the order checked.
#[derive(Debug, Default)]
pub struct Required {
    missing: Vec<&'static str>,
}

impl Required {
    /// Record `name` as missing when `value` is `None`.
    pub fn take<T>(&mut self, name: &'static str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.missing.push(name);
        }
        value
    }

    /// Like [`Required::take`] but also treats whitespace-only text as absent.
    pub fn text(&mut self, name: &'static str, value: Option<String>) -> Option<String> {
        self.take(name, value.filter(|s| !s.trim().is_empty()))
    }

    /// The error to report once any field is missing.
    #[must_use]
    pub fn into_error(self) -> BanquetError {
        BanquetError::MissingFields(self.missing)
    }
}
