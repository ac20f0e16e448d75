use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, Salt,
        SaltString,
    },
};
use rand::{TryRngCore, rngs::OsRng};
use thiserror::Error;

/// Argon2id hashing for user passwords.
#[derive(Debug)]
pub struct PasswordCrypto {
    argon2: Argon2<'static>,
}

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing error: {0}")]
    Hash(String),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
}

impl From<PasswordHashError> for PasswordError {
    fn from(err: PasswordHashError) -> Self {
        PasswordError::Hash(err.to_string())
    }
}

impl Default for PasswordCrypto {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordCrypto {
    const SALT_LENGTH: usize = Salt::RECOMMENDED_LENGTH;

    pub fn new() -> Self {
        Self::with_params(Params::default())
    }

    /// Cheaper parameters keep test suites fast.
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::default(), params),
        }
    }

    /// Produce a PHC string with a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        let mut salt_bytes = [0u8; Self::SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|err| PasswordError::Hash(err.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)?;
        Ok(self
            .argon2
            .hash_password(password.as_bytes(), &salt)?
            .to_string())
    }

    pub fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|err| PasswordError::MalformedHash(err.to_string()))?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
pub(crate) fn fast_crypto() -> PasswordCrypto {
    PasswordCrypto::with_params(Params::new(8, 1, 1, None).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_passwords_and_verifies() {
        let crypto = fast_crypto();
        let hash = crypto.hash_password("buvette2024").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(crypto.verify_password("buvette2024", &hash).unwrap());
        assert!(!crypto.verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn salts_differ_between_hashes() {
        let crypto = fast_crypto();
        let first = crypto.hash_password("same").unwrap();
        let second = crypto.hash_password("same").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let crypto = fast_crypto();
        assert!(matches!(
            crypto.verify_password("x", "not-a-phc-string"),
            Err(PasswordError::MalformedHash(_))
        ));
    }
}
