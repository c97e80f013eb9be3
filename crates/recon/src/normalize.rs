use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ExtractError;

/// Field-specific value transform, applied before the unconditional uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Full state/territory name to its postal abbreviation.
    State,
    /// "Family, Given" to "GIVEN FAMILY".
    PersonName,
}

impl Transform {
    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::State => abbreviate_state(text),
            Self::PersonName => reorder_person_name(text),
        }
    }
}

const STATE_ABBREVIATIONS: [(&str, &str); 8] = [
    ("australian capital territory", "ACT"),
    ("new south wales", "NSW"),
    ("northern territory", "NT"),
    ("queensland", "QLD"),
    ("south australia", "SA"),
    ("tasmania", "TAS"),
    ("victoria", "VIC"),
    ("western australia", "WA"),
];

/// Case-insensitive full-name lookup. Unknown input is returned unchanged.
pub fn abbreviate_state(value: &str) -> String {
    let key = value.to_lowercase();
    STATE_ABBREVIATIONS
        .iter()
        .find(|(full, _)| *full == key)
        .map(|(_, abbr)| (*abbr).to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Reorder "Family, Given" into "GIVEN FAMILY"; anything else is uppercased as-is.
///
/// Only a single comma with non-blank text on both sides is treated as a
/// family/given split.
pub fn reorder_person_name(value: &str) -> String {
    let parts: Vec<&str> = value.split(',').collect();
    if let [family, given] = parts.as_slice() {
        let (family, given) = (family.trim(), given.trim());
        if !family.is_empty() && !given.is_empty() {
            return format!("{} {}", given.to_uppercase(), family.to_uppercase());
        }
    }
    value.to_uppercase()
}

/// Null and whitespace-only strings count as absent.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Render a raw scalar into its final observation text.
///
/// Strings go through `transform` then uppercase. Numbers and booleans skip
/// the transform and are uppercased as text. Nested values are rejected.
pub fn normalize_value(
    transform: Option<Transform>,
    key: &str,
    value: &Value,
) -> Result<String, ExtractError> {
    match value {
        Value::String(text) => {
            let text = match transform {
                Some(t) => t.apply(text),
                None => text.clone(),
            };
            Ok(text.to_uppercase())
        }
        Value::Number(n) => Ok(n.to_string().to_uppercase()),
        Value::Bool(b) => Ok(b.to_string().to_uppercase()),
        Value::Null => Ok(String::new()),
        Value::Array(_) | Value::Object(_) => Err(ExtractError::NonScalarValue {
            key: key.to_string(),
        }),
    }
}
