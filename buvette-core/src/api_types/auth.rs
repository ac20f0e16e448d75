use serde::{Deserialize, Serialize};

use crate::domain::validation::{MIN_PASSWORD_LEN, ValidationError, is_plausible_email};
use crate::types::users::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    /// Logins are e-mail addresses, except for bare service accounts such as
    /// the seeded `admin`, which are exempt from the password length rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let login = self.email.trim();
        if login.is_empty() {
            return Err(ValidationError::Missing { field: "email" });
        }
        if self.password.is_empty() {
            return Err(ValidationError::Missing { field: "password" });
        }
        if login.contains('@') {
            if !is_plausible_email(login) {
                return Err(ValidationError::InvalidEmail(login.to_string()));
            }
            if self.password.chars().count() < MIN_PASSWORD_LEN {
                return Err(ValidationError::PasswordTooShort {
                    min: MIN_PASSWORD_LEN,
                });
            }
        } else if login.chars().any(|c| !(c.is_alphanumeric() || c == '_' || c == '-' || c == '.')) {
            return Err(ValidationError::InvalidEmail(login.to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn email_logins_need_a_real_password() {
        assert!(login("rb@example.com", "password123").validate().is_ok());
        assert_eq!(
            login("rb@example.com", "short").validate(),
            Err(ValidationError::PasswordTooShort { min: 6 })
        );
        assert!(login("rb@example", "password123").validate().is_err());
    }

    #[test]
    fn bare_account_names_are_accepted() {
        assert!(login("admin", "admin").validate().is_ok());
        assert!(login("ad min", "admin").validate().is_err());
        assert!(login("", "admin").validate().is_err());
        assert!(login("admin", "").validate().is_err());
    }
}
