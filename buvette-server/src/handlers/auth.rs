use axum::{Json, extract::State};
use buvette_core::api_types::{
    ApiResponse,
    auth::{AuthTokens, LoginRequest, RefreshRequest},
};
use tracing::{info, warn};

use crate::{
    AppState,
    infra::errors::{AppError, AppResult},
};

pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthTokens>>> {
    request.validate()?;

    let credentials = state
        .unit_of_work()
        .users
        .find_credentials(request.email.trim())
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

    let valid = state
        .passwords()
        .verify_password(&request.password, &credentials.password_hash)
        .map_err(|err| {
            warn!("password check failed for user {}: {err}", credentials.user.id);
            AppError::unauthorized("Invalid credentials")
        })?;
    if !valid {
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let user = credentials.user;
    let pair = state
        .tokens()
        .issue_pair(user.id, &user.roles)
        .map_err(|err| AppError::internal(format!("Failed to issue tokens: {err}")))?;

    info!("user {} logged in", user.id);
    Ok(Json(ApiResponse::success(AuthTokens {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        user: Some(user),
    })))
}

pub async fn refresh_handler(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> AppResult<Json<ApiResponse<AuthTokens>>> {
    let token = request
        .refresh_token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::bad_request("refresh_token is required"))?;

    let claims = state
        .tokens()
        .verify_refresh(token)
        .map_err(|_| AppError::unauthorized("Invalid refresh token"))?;
    let user_id = claims
        .user_id()
        .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;

    let pair = state
        .tokens()
        .issue_pair(user_id, &claims.roles)
        .map_err(|err| AppError::internal(format!("Failed to issue tokens: {err}")))?;

    Ok(Json(ApiResponse::success(AuthTokens {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        user: None,
    })))
}

/// Tokens are stateless; the client just drops them.
pub async fn logout_handler() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("Logged out"))
}
