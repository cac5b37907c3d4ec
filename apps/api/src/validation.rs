use crate::errors::AppError;

/// Returns the trimmed value, or a validation error naming `field` when it is
/// missing or blank.
pub fn required_text(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("'{field}' is required")))
}
