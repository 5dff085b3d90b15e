// src/validator.rs
use serde_json::Value;

use crate::errors::ValidationError;

/// Checks the shape of a decoded API response and returns its `homeworks` list.
///
/// Records inside the list are returned untouched; malformed records are
/// reported later by [`crate::status::parse_status`].
pub fn extract_homeworks(response: &Value) -> Result<&Vec<Value>, ValidationError> {
    let map = response.as_object().ok_or(ValidationError::NotAMapping)?;
    let homeworks = map.get("homeworks").ok_or(ValidationError::MissingKey)?;
    homeworks.as_array().ok_or(ValidationError::NotASequence)
}
