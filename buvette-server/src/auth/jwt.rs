use std::time::Duration;

use buvette_core::domain::Role;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::infra::config::AuthConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a decimal string.
    pub sub: String,
    pub roles: Vec<Role>,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub kind: TokenKind,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token rejected: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("expected a {expected:?} token")]
    WrongKind { expected: TokenKind },
    #[error("token subject is not a user id")]
    BadSubject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SigningKeys {
    fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }
}

/// Issues and checks the HS256 access/refresh token pair.
pub struct TokenService {
    access: SigningKeys,
    refresh: SigningKeys,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl", &self.access.ttl)
            .field("refresh_ttl", &self.refresh.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access: SigningKeys::new(&config.access_secret, config.access_ttl),
            refresh: SigningKeys::new(&config.refresh_secret, config.refresh_ttl),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    fn keys(&self, kind: TokenKind) -> &SigningKeys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    pub fn issue(
        &self,
        kind: TokenKind,
        user_id: i64,
        roles: &[Role],
    ) -> Result<String, TokenError> {
        let keys = self.keys(kind);
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(keys.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: user_id.to_string(),
            roles: roles.to_vec(),
            iat: now,
            exp: now.saturating_add(ttl),
            jti: Uuid::new_v4().to_string(),
            kind,
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)?)
    }

    pub fn issue_pair(&self, user_id: i64, roles: &[Role]) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue(TokenKind::Access, user_id, roles)?,
            refresh_token: self.issue(TokenKind::Refresh, user_id, roles)?,
        })
    }

    /// Checks signature, expiry and that the token is of the expected kind.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.keys(kind).decoding, &self.validation)?;
        let claims = data.claims;
        if claims.kind != kind {
            return Err(TokenError::WrongKind { expected: kind });
        }
        if claims.user_id().is_none() {
            return Err(TokenError::BadSubject);
        }
        Ok(claims)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify(token, TokenKind::Access)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify(token, TokenKind::Refresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&AuthConfig {
            access_secret: "access".into(),
            refresh_secret: "refresh".into(),
            ..AuthConfig::default()
        })
    }

    #[test]
    fn access_token_round_trips_claims() {
        let tokens = service();
        let token = tokens
            .issue(TokenKind::Access, 42, &[Role::Rb, Role::Log])
            .unwrap();
        let claims = tokens.verify_access(&token).unwrap();
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.roles, vec![Role::Rb, Role::Log]);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let tokens = service();
        let pair = tokens.issue_pair(7, &[Role::Admin]).unwrap();
        assert!(tokens.verify_access(&pair.refresh_token).is_err());
        assert!(tokens.verify_refresh(&pair.access_token).is_err());
        assert!(tokens.verify_refresh(&pair.refresh_token).is_ok());
    }

    #[test]
    fn kind_is_checked_when_secrets_match() {
        let tokens = TokenService::new(&AuthConfig {
            access_secret: "shared".into(),
            refresh_secret: "shared".into(),
            ..AuthConfig::default()
        });
        let refresh = tokens.issue(TokenKind::Refresh, 1, &[]).unwrap();
        assert!(matches!(
            tokens.verify_access(&refresh),
            Err(TokenError::WrongKind {
                expected: TokenKind::Access
            })
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "3".into(),
            roles: vec![],
            iat: now - 7200,
            exp: now - 3600,
            jti: Uuid::new_v4().to_string(),
            kind: TokenKind::Access,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"access"),
        )
        .unwrap();
        assert!(matches!(tokens.verify_access(&token), Err(TokenError::Jwt(_))));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let tokens = service();
        let mut token = tokens.issue(TokenKind::Access, 1, &[]).unwrap();
        token.push('x');
        assert!(tokens.verify_access(&token).is_err());
    }
}
