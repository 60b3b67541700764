//! Internal helpers for input normalization.
//!
//! These utilities are **not** part of the public API.

use crate::ValidationError;

/// Trim a required name, rejecting blank input.
pub(crate) fn normalize_required_name(
    value: &str,
    label: &'static str,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName(label));
    }
    Ok(trimmed.to_string())
}
