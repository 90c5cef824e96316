//! Tolerant property lookup.
//!
//! Each candidate key is tried with three passes before moving on to the
//! next one: exact key, case-insensitive key, and finally a "normalized"
//! key with everything but `[a-z0-9]` stripped. The normalized pass is what
//! lets `"Animal Nam"` find `"animal_name"`-style columns.
//!
//! Absence is an expected outcome; nothing here fails.

use serde_json::Value;
use shelter_map_source_models::Properties;

/// Returns the first value found for any of `candidates`, in order.
///
/// An exact key match wins as long as its value is not `null`. The
/// case-insensitive and normalized passes consider only the first matching
/// key in the bag and require a truthy value (not `null`, `false`, `0`,
/// `NaN` or `""`).
#[must_use]
pub fn resolve<'a, S: AsRef<str>>(props: &'a Properties, candidates: &[S]) -> Option<&'a Value> {
    for candidate in candidates {
        let key = candidate.as_ref();

        if let Some(value) = props.get(key)
            && !value.is_null()
        {
            return Some(value);
        }

        let lower = key.to_lowercase();
        if let Some((_, value)) = props.iter().find(|(k, _)| k.to_lowercase() == lower)
            && is_truthy(value)
        {
            return Some(value);
        }

        let normalized = normalize_key(key);
        if let Some((_, value)) = props.iter().find(|(k, _)| normalize_key(k) == normalized)
            && is_truthy(value)
        {
            return Some(value);
        }
    }
    None
}

/// Resolves a value and renders it as text.
///
/// Strings are returned as-is, numbers and booleans are formatted. Blank
/// strings, arrays and objects count as missing.
#[must_use]
pub fn resolve_text<S: AsRef<str>>(props: &Properties, candidates: &[S]) -> Option<String> {
    value_text(resolve(props, candidates)?)
}

/// Resolves a value as a number. Numeric strings are parsed.
#[must_use]
pub fn resolve_number<S: AsRef<str>>(props: &Properties, candidates: &[S]) -> Option<f64> {
    value_number(resolve(props, candidates)?)
}

/// Renders a scalar JSON value as text.
#[must_use]
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Reads a JSON number, or a string holding one.
#[must_use]
pub fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Lower-cases `key` and strips every character outside `[a-z0-9]`.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    key.to_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

/// Truthiness of a JSON value: `null`, `false`, `0`, `NaN` and `""` are
/// falsy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
