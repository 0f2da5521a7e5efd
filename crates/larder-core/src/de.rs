//! Lenient query-string deserializers.

use serde::{Deserialize, Deserializer};

/// Deserialize an optional boolean flag written as `1`/`0`/`true`/`false`.
/// Any other value is a deserialization error.
pub fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some("1" | "true" | "True") => Ok(Some(true)),
        Some("0" | "false" | "False") => Ok(Some(false)),
        Some(other) => Err(serde::de::Error::invalid_value(
            serde::de::Unexpected::Str(other),
            &"one of 1, 0, true, false",
        )),
    }
}

/// Deserialize an optional positive integer, treating unparsable input as absent.
pub fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| v.trim().parse::<u64>().ok()))
}
