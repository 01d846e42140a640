//! Deserializers for server and push fields whose JSON type is not fixed.

use serde::{Deserialize, Deserializer};

/// Reads an identifier that may arrive as a string or a number.
///
/// Anything else (`null`, booleans, objects) and empty strings read as
/// `None` instead of failing the surrounding object.
pub fn id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(id_from_value(&value))
}

/// Text form of a JSON identifier, see [`id`].
pub fn id_from_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
