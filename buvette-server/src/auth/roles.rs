use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use buvette_core::domain::Role;
use std::future::Future;
use std::pin::Pin;

use super::middleware::AuthUser;
use crate::infra::errors::AppError;

/// Route layer admitting callers holding at least one of `roles`.
/// Runs after `auth_middleware`, which inserts the `AuthUser` extension.
pub fn require_roles(
    roles: &'static [Role],
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Response> + Send>>
+ Clone
+ Send
+ Sync
+ 'static {
    move |request: Request, next: Next| Box::pin(check_roles(request, next, roles))
}

async fn check_roles(request: Request, next: Next, roles: &[Role]) -> Response {
    let Some(user) = request.extensions().get::<AuthUser>() else {
        return AppError::unauthorized("Authentication required").into_response();
    };

    if !user.has_any_role(roles) {
        let names: Vec<&str> = roles.iter().map(|role| role.as_str()).collect();
        return AppError::forbidden(format!(
            "One of these roles required: {}",
            names.join(", ")
        ))
        .into_response();
    }

    next.run(request).await
}
