use axum::{Extension, Json, extract::State};
use buvette_core::{api_types::ApiResponse, types::users::User};

use crate::{
    AppState,
    auth::AuthUser,
    infra::errors::{AppError, AppResult},
};

pub async fn current_user_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = state
        .unit_of_work()
        .users
        .get_user(auth.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(ApiResponse::success(user)))
}
