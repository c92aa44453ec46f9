// ============================================================
// Layer 3: Lenient Field Decoding
// ============================================================
// Catalog records are crowd-sourced. The same field can show up
// as a number, a numeric string, null, or something unexpected
// entirely. These serde helpers turn every such variant into
// either a usable value or "absent", so decoding one record
// never fails because one optional field is malformed.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Number or numeric string → `Some(f64)`; anything else → `None`.
pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|n| n.is_finite()))
}

/// String or number → `Some(String)`; anything else → `None`.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

/// Array of strings (non-strings dropped) or a comma-separated string.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let items = match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };
    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

/// Boolean, or a 0/1 number, as used by hand-written example files.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_f64().map(|x| x != 0.0).unwrap_or(false)),
        Value::Null => Ok(false),
        other => Err(D::Error::custom(format!("expected a boolean or 0/1, got {other}"))),
    }
}
