use crate::error::CoreError;

/// Validation errors for request payloads
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Password too short: minimum {min} characters required")]
    PasswordTooShort { min: usize },

    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    #[error("{0}")]
    Invalid(String),
}

impl From<ValidationError> for CoreError {
    fn from(err: ValidationError) -> Self {
        CoreError::Validation(err.to_string())
    }
}

pub const MIN_PASSWORD_LEN: usize = 6;

/// Cheap shape check: one `@`, something before it, a dotted domain after.
pub fn is_plausible_email(raw: &str) -> bool {
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !raw.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

pub fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Missing { field });
    }
    Ok(())
}

pub fn require_non_negative(field: &'static str, value: Option<i32>) -> Result<(), ValidationError> {
    match value {
        Some(v) if v < 0 => Err(ValidationError::Negative { field }),
        _ => Ok(()),
    }
}
