use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use buvette_core::domain::{Role, roles::has_any_role};
use tracing::debug;

use super::jwt::Claims;
use crate::infra::{app_state::AppState, errors::AppError};

/// Identity of the caller, taken from a verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub roles: Vec<Role>,
}

impl AuthUser {
    pub fn has_any_role(&self, required: &[Role]) -> bool {
        has_any_role(&self.roles, required)
    }
}

impl TryFrom<Claims> for AuthUser {
    type Error = AppError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .user_id()
            .ok_or_else(|| AppError::unauthorized("Invalid token"))?;
        Ok(Self {
            id,
            roles: claims.roles,
        })
    }
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&request)?;
    let claims = state.tokens().verify_access(token).map_err(|err| {
        debug!("access token rejected: {err}");
        AppError::unauthorized("Invalid or expired token")
    })?;
    let user = AuthUser::try_from(claims)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn extract_bearer_token(request: &Request) -> Result<&str, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized("Expected a Bearer token"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with(header_value: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header_value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn bearer_token_is_extracted() {
        let request = request_with(Some("Bearer abc.def"));
        assert_eq!(extract_bearer_token(&request).unwrap(), "abc.def");
    }

    #[test]
    fn missing_or_foreign_scheme_is_unauthorized() {
        assert!(extract_bearer_token(&request_with(None)).is_err());
        assert!(extract_bearer_token(&request_with(Some("Basic Zm9v"))).is_err());
        assert!(extract_bearer_token(&request_with(Some("Bearer "))).is_err());
    }

    #[test]
    fn role_check_uses_held_roles() {
        let user = AuthUser {
            id: 1,
            roles: vec![Role::Log],
        };
        assert!(user.has_any_role(&[Role::Admin, Role::Log]));
        assert!(!user.has_any_role(&[Role::ChefOps]));
    }
}
