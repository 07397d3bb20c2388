//! Protocol identifier validation.
//!
//! Rules run in order and the first failure wins:
//! empty, non-numeric, too short, too long, duplicate.

use thiserror::Error;

use super::RecordStore;

/// Minimum protocol length in digits.
pub const MIN_PROTOCOL_LEN: usize = 3;
/// Maximum protocol length in digits.
pub const MAX_PROTOCOL_LEN: usize = 20;

/// Why a candidate identifier was refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Protocol cannot be empty")]
    Empty,

    #[error("Protocol must contain only digits")]
    NonNumeric,

    #[error("Protocol must have at least {} digits", MIN_PROTOCOL_LEN)]
    TooShort,

    #[error("Protocol must have at most {} digits", MAX_PROTOCOL_LEN)]
    TooLong,

    #[error("Protocol already exists")]
    Duplicate,
}

impl ValidationError {
    /// Stable short reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::Empty => "empty",
            ValidationError::NonNumeric => "non-numeric",
            ValidationError::TooShort => "too short",
            ValidationError::TooLong => "too long",
            ValidationError::Duplicate => "duplicate",
        }
    }
}

/// Check everything except uniqueness. Returns the trimmed identifier.
pub fn check_format(candidate: &str) -> Result<&str, ValidationError> {
    let trimmed = candidate.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }
    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::NonNumeric);
    }
    // digits only, so byte length == char count
    if trimmed.len() < MIN_PROTOCOL_LEN {
        return Err(ValidationError::TooShort);
    }
    if trimmed.len() > MAX_PROTOCOL_LEN {
        return Err(ValidationError::TooLong);
    }

    Ok(trimmed)
}

/// Validate a candidate against the store. Returns the trimmed identifier.
///
/// The validator does not know which record is being edited: callers that
/// allow renaming to the current value must compare before calling.
pub fn validate<'a>(candidate: &'a str, store: &RecordStore) -> Result<&'a str, ValidationError> {
    let id = check_format(candidate)?;
    if store.contains(id) {
        return Err(ValidationError::Duplicate);
    }
    Ok(id)
}
