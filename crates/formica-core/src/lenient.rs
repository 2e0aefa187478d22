//! Forgiving decoders for saved records.
//!
//! A checkpoint written by an older build, or edited by hand, may hold a
//! record that no longer fits its type. These helpers are used with
//! `#[serde(deserialize_with = ...)]` so one bad entry costs that entry
//! instead of the whole document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode a list, dropping entries that do not fit `T`.
///
/// A value that is not a list at all decodes as empty.
pub fn skip_invalid<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Decode a value, falling back to `T::default()` when it does not fit.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}
