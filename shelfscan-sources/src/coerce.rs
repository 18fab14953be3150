//! Lenient field deserializers for vendor JSON.
//!
//! Vendors disagree on whether a price is a number or a string, and some
//! send `null` where an array belongs. These helpers accept either so one
//! odd field never sinks a whole response.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use shelfscan_core::{non_empty, parse_price, sanitize_price};

/// Reads a string, number, or null as an optional non-blank string.
pub fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => non_empty(Some(&s)),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Reads a price given as a number or a string.
///
/// Anything that is not a usable price becomes `None`.
pub fn loose_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => parse_price(&s),
        Some(Value::Number(n)) => sanitize_price(n.as_f64()),
        _ => None,
    })
}

/// Reads an array that may be `null` or missing as a `Vec`.
pub fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads an array, keeping only its non-blank strings.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => non_empty(Some(&s)),
            _ => None,
        })
        .collect())
}

/// Reads a count given as a number or a numeric string.
pub fn loose_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
