//! Lenient numeric deserializers for artifacts written by the batch pipeline.
//!
//! The pipeline is not consistent about numeric encoding: ids sometimes arrive
//! as `5`, `5.0` or `"5"`. These helpers accept every such spelling and reject
//! `null`, arrays, objects, unparseable strings and non-finite floats.

use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

pub fn int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Loose::deserialize(deserializer)
        .map_err(|_| <D::Error as de::Error>::custom("expected an integer"))?;
    match value {
        Loose::Bool(b) => Ok(i64::from(b)),
        Loose::Int(n) => Ok(n),
        Loose::Float(f) => {
            // Truncate toward zero, refusing anything that cannot land in i64.
            if f.is_finite() && f.trunc() >= i64::MIN as f64 && f.trunc() < i64::MAX as f64 {
                Ok(f.trunc() as i64)
            } else {
                Err(de::Error::custom(format!("{f} is not a representable integer")))
            }
        }
        Loose::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| de::Error::custom(format!("invalid integer literal: {s:?}"))),
    }
}

pub fn float<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Loose::deserialize(deserializer)
        .map_err(|_| <D::Error as de::Error>::custom("expected a number"))?;
    match value {
        Loose::Bool(b) => Ok(if b { 1.0 } else { 0.0 }),
        Loose::Int(n) => Ok(n as f64),
        Loose::Float(f) if f.is_finite() => Ok(f),
        Loose::Float(f) => Err(de::Error::custom(format!("{f} is not a finite number"))),
        Loose::Str(s) => parse_float(&s)
            .ok_or_else(|| de::Error::custom(format!("invalid float literal: {s:?}"))),
    }
}

/// Integer field filled in by a client: whole-number floats such as `5.0`
/// are accepted, fractional ones are not.
pub fn whole_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Loose::deserialize(deserializer)
        .map_err(|_| <D::Error as de::Error>::custom("expected an integer"))?;
    match value {
        Loose::Int(n) => Ok(n),
        Loose::Float(f)
            if f.is_finite()
                && f.fract() == 0.0
                && f >= i64::MIN as f64
                && f < i64::MAX as f64 =>
        {
            Ok(f as i64)
        }
        Loose::Float(f) => Err(de::Error::custom(format!("{f} is not a whole number"))),
        Loose::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| de::Error::custom(format!("invalid integer literal: {s:?}"))),
        Loose::Bool(_) => Err(de::Error::custom("expected an integer, got a boolean")),
    }
}

/// Like [`int`] for keys that may be absent; an explicit `null` is still rejected.
pub fn opt_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    int(deserializer).map(Some)
}

/// Parses a float the way the pipeline writes it, tolerating surrounding
/// whitespace. `nan` and `inf` spellings are refused: they cannot be served as JSON.
pub fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}
