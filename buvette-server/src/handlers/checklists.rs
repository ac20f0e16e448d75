use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use buvette_core::{
    api_types::{ApiResponse, checklists::FillChecklistRequest},
    domain::WorkflowStatus,
    types::{ChecklistResponse, ChecklistTemplate},
};

use crate::{
    AppState,
    infra::errors::{AppError, AppResult},
};

pub async fn list_templates_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<ChecklistTemplate>>>> {
    let templates = state.unit_of_work().checklists.list_templates().await?;
    Ok(Json(ApiResponse::success(templates)))
}

pub async fn get_template_handler(
    State(state): State<AppState>,
    Path(template_id): Path<i64>,
) -> AppResult<Json<ApiResponse<ChecklistTemplate>>> {
    let template = state
        .unit_of_work()
        .checklists
        .get_template(template_id)
        .await?
        .ok_or_else(|| AppError::not_found("Checklist template not found"))?;
    Ok(Json(ApiResponse::success(template)))
}

pub async fn fill_checklist_handler(
    State(state): State<AppState>,
    Path((event_id, buvette_id, template_id)): Path<(i64, i64, i64)>,
    Json(request): Json<FillChecklistRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ChecklistResponse>>)> {
    let response = state
        .unit_of_work()
        .checklists
        .create_response(event_id, buvette_id, template_id, &request.items)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

pub async fn get_response_handler(
    State(state): State<AppState>,
    Path(response_id): Path<i64>,
) -> AppResult<Json<ApiResponse<ChecklistResponse>>> {
    let response = state
        .unit_of_work()
        .checklists
        .get_response(response_id)
        .await?
        .ok_or_else(|| AppError::not_found("Checklist response not found"))?;
    Ok(Json(ApiResponse::success(response)))
}

pub async fn submit_response_handler(
    state: State<AppState>,
    path: Path<i64>,
) -> AppResult<Json<ApiResponse<ChecklistResponse>>> {
    move_response(state, path, WorkflowStatus::Submitted).await
}

pub async fn validate_response_handler(
    state: State<AppState>,
    path: Path<i64>,
) -> AppResult<Json<ApiResponse<ChecklistResponse>>> {
    move_response(state, path, WorkflowStatus::Validated).await
}

async fn move_response(
    State(state): State<AppState>,
    Path(response_id): Path<i64>,
    status: WorkflowStatus,
) -> AppResult<Json<ApiResponse<ChecklistResponse>>> {
    let response = state
        .unit_of_work()
        .checklists
        .set_response_status(response_id, status)
        .await?
        .ok_or_else(|| AppError::not_found("Checklist response not found"))?;
    Ok(Json(ApiResponse::success(response)))
}
