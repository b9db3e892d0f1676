//! Lenient deserializers for hand-written package documents.
//!
//! Package authors write `epoch: 0` as often as `epoch: "0"`, and leave
//! keys such as `packages:` present but empty. These helpers normalize
//! both cases so the rest of the crate only ever sees strings and
//! (possibly empty) collections.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

/// Deserialize an optional value, mapping `null` / missing to `T::default()`.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize any YAML scalar (string, number, bool) into a `String`.
///
/// `null` becomes the empty string. Sequences and mappings are rejected.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(String::new()),
        other => scalar_to_string(&other).ok_or_else(|| {
            serde::de::Error::custom(format!("expected a scalar value, found {other:?}"))
        }),
    }
}

/// Deserialize a mapping of scalars into `String -> String`.
///
/// Entries whose value is not a scalar (nested lists or maps) are dropped;
/// nothing in the graph engine reads them.
pub fn string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| scalar_to_string(&value).map(|v| (key, v)))
        .collect())
}

/// Deserialize a mapping whose values must all be scalars.
///
/// `null` values become empty strings. A nested list or map is an error
/// naming its key.
pub fn scalar_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Value>> = Option::deserialize(deserializer)?;
    raw.unwrap_or_default()
        .into_iter()
        .map(|(key, value)| match value {
            Value::Null => Ok((key, String::new())),
            other => scalar_to_string(&other).map(|v| (key.clone(), v)).ok_or_else(|| {
                serde::de::Error::custom(format!("value of {key:?} must be a scalar, found {other:?}"))
            }),
        })
        .collect()
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}
