//! Input validation shared by the route handlers

use workly_db::utils::normalize_skills;

use crate::error::ApiError;

/// Maximum allowed length for names and titles
pub const MAX_NAME_LENGTH: usize = 128;
/// Maximum allowed password length (prevent DoS with very large passwords)
pub const MAX_PASSWORD_LENGTH: usize = 256;
/// Minimum allowed password length
pub const MIN_PASSWORD_LENGTH: usize = 8;
/// Maximum allowed email length
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Trim a required text field and reject it when empty
pub fn required(field: &str, value: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::Validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

/// Like [`required`], for fields that are optional in an update but may not be blanked
pub fn optional(field: &str, value: Option<&str>) -> Result<Option<String>, ApiError> {
    value.map(|v| required(field, v)).transpose()
}

/// Required name or title with an upper bound
pub fn name(field: &str, value: &str) -> Result<String, ApiError> {
    let value = required(field, value)?;
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ApiError::Validation(format!(
            "{} exceeds maximum length of {} characters",
            field, MAX_NAME_LENGTH
        )));
    }
    Ok(value)
}

/// Trimmed, lowercased email. Only the shape `local@domain` is checked.
pub fn email(value: &str) -> Result<String, ApiError> {
    let value = required("email", value)?.to_lowercase();
    if value.len() > MAX_EMAIL_LENGTH {
        return Err(ApiError::Validation(format!(
            "email exceeds maximum length of {} characters",
            MAX_EMAIL_LENGTH
        )));
    }
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(value)
        }
        _ => Err(ApiError::Validation("email is invalid".to_string())),
    }
}

/// Validate password length
pub fn password(value: &str) -> Result<(), ApiError> {
    if value.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::Validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    if value.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::Validation(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Skill list with at least one non-blank entry, deduplicated
pub fn skills(values: &[String]) -> Result<Vec<String>, ApiError> {
    let skills = normalize_skills(values);
    if skills.is_empty() {
        return Err(ApiError::Validation("At least one skill is required".to_string()));
    }
    Ok(skills)
}

/// Positive identifier supplied in a request body
pub fn id(field: &str, value: i64) -> Result<i64, ApiError> {
    if value <= 0 {
        return Err(ApiError::Validation(format!("{} is required", field)));
    }
    Ok(value)
}
