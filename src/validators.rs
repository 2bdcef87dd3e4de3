//! Client-side input validation.
//!
//! A failed validation blocks submission before any network call is made;
//! the server re-validates everything on its side.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

/// Maximum length accepted for team and key names.
pub const MAX_NAME_LENGTH: usize = 80;

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmailEmpty);
    }

    if email.len() > 254 {
        return Err(ValidationError::EmailTooLong);
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::EmailInvalidFormat);
    }

    Ok(())
}

/// Validates a team or service-key name: required, bounded length.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::NameEmpty);
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong);
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmailEmpty,
    EmailTooLong,
    EmailInvalidFormat,
    NameEmpty,
    NameTooLong,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmailEmpty => write!(f, "Email cannot be empty"),
            ValidationError::EmailTooLong => write!(f, "Email is too long (max 254 characters)"),
            ValidationError::EmailInvalidFormat => write!(f, "Invalid email format"),
            ValidationError::NameEmpty => write!(f, "Name cannot be empty"),
            ValidationError::NameTooLong => {
                write!(f, "Name is too long (max {MAX_NAME_LENGTH} characters)")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for crate::TeamError {
    fn from(err: ValidationError) -> Self {
        crate::TeamError::Validation(err.to_string())
    }
}
