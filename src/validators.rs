/// Input validators for request bodies and path segments
///
/// Every required string field goes through `required_field` first, so a
/// missing or blank value always yields "'<field>' cannot be left blank!".

use crate::error::ValidationError;

const MAX_USERNAME_LENGTH: usize = 80;
const MAX_STORE_NAME_LENGTH: usize = 80;

/// Unwrap an optional field, rejecting missing and whitespace-only values.
/// The value itself is returned untrimmed.
pub fn required_field<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::EmptyField(field.to_string())),
    }
}

/// Validates a username
/// - Trims surrounding whitespace
/// - Checks length constraints
/// - Rejects control characters
pub fn is_valid_username(username: &str) -> Result<String, ValidationError> {
    validate_identifier(username, "username", MAX_USERNAME_LENGTH)
}

/// Validates a store name taken from the request path
pub fn is_valid_store_name(name: &str) -> Result<String, ValidationError> {
    validate_identifier(name, "name", MAX_STORE_NAME_LENGTH)
}

fn validate_identifier(value: &str, field: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field.to_string()));
    }

    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong(field.to_string(), max));
    }

    // null bytes included
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::SuspiciousContent(field.to_string()));
    }

    Ok(trimmed.to_string())
}
