use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use buvette_core::{
    api_types::{
        ApiResponse,
        timesheets::{
            BuvetteQuery, DraftTimesheetRequest, KioskSubmission, ReplaceShiftsRequest,
            ShiftInput, into_new_shifts,
        },
    },
    domain::WorkflowStatus,
    types::{Shift, Timesheet, TimesheetDetails},
};
use tracing::info;

use crate::{
    AppState,
    auth::AuthUser,
    infra::errors::{AppError, AppResult},
};

pub async fn event_timesheets_handler(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<TimesheetDetails>>>> {
    let timesheets = state
        .unit_of_work()
        .timesheets
        .list_for_event(event_id)
        .await?;
    Ok(Json(ApiResponse::success(timesheets)))
}

/// `data` is `null` when the buvette has no timesheet yet.
pub async fn buvette_timesheet_handler(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    Query(query): Query<BuvetteQuery>,
) -> AppResult<Json<ApiResponse<Option<TimesheetDetails>>>> {
    let buvette_id = query
        .buvette_id
        .ok_or_else(|| AppError::bad_request("buvette_id is required"))?;
    let timesheet = state
        .unit_of_work()
        .timesheets
        .find_for_buvette(event_id, buvette_id)
        .await?;
    Ok(Json(ApiResponse::success(timesheet)))
}

/// Kiosk submission: clock times are read against the event date and the
/// buvette's timesheet is (re)submitted with the posted shifts.
pub async fn kiosk_submit_handler(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    Json(submission): Json<KioskSubmission>,
) -> AppResult<(StatusCode, Json<ApiResponse<TimesheetDetails>>)> {
    let uow = state.unit_of_work();
    let event = uow
        .events
        .get_event(event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;
    uow.catalog
        .get_buvette(submission.buvette_id)
        .await?
        .ok_or_else(|| {
            AppError::bad_request(format!("Buvette {} not found", submission.buvette_id))
        })?;

    let shifts = submission
        .shifts
        .into_iter()
        .map(|shift| shift.into_new_shift(event.date))
        .collect::<Result<Vec<_>, _>>()?;

    let responsable_id = uow
        .events
        .get_event_buvette(event.id, submission.buvette_id)
        .await?
        .and_then(|link| link.responsable_id);

    let timesheet = uow
        .timesheets
        .submit_from_kiosk(event.id, submission.buvette_id, responsable_id, &shifts)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(timesheet))))
}

pub async fn create_draft_handler(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<DraftTimesheetRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<TimesheetDetails>>)> {
    let uow = state.unit_of_work();
    uow.events
        .get_event(event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;

    let shifts = into_new_shifts(request.shifts)?;
    let timesheet = uow
        .timesheets
        .create_draft(event_id, request.buvette_id, request.responsable_id, &shifts)
        .await?;
    info!(
        "user {} drafted timesheet {} for buvette {}",
        user.id, timesheet.timesheet.id, request.buvette_id
    );
    Ok((StatusCode::CREATED, Json(ApiResponse::success(timesheet))))
}

pub async fn get_timesheet_handler(
    State(state): State<AppState>,
    Path(timesheet_id): Path<i64>,
) -> AppResult<Json<ApiResponse<TimesheetDetails>>> {
    let timesheet = state
        .unit_of_work()
        .timesheets
        .get_timesheet(timesheet_id)
        .await?
        .ok_or_else(|| AppError::not_found("Timesheet not found"))?;
    Ok(Json(ApiResponse::success(timesheet)))
}

pub async fn replace_shifts_handler(
    State(state): State<AppState>,
    Path(timesheet_id): Path<i64>,
    Json(request): Json<ReplaceShiftsRequest>,
) -> AppResult<Json<ApiResponse<TimesheetDetails>>> {
    let shifts = into_new_shifts(request.shifts)?;
    let timesheet = state
        .unit_of_work()
        .timesheets
        .replace_shifts(timesheet_id, &shifts)
        .await?;
    Ok(Json(ApiResponse::success(timesheet)))
}

pub async fn submit_timesheet_handler(
    State(state): State<AppState>,
    Path(timesheet_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Timesheet>>> {
    let timesheet = state
        .unit_of_work()
        .timesheets
        .set_status(timesheet_id, WorkflowStatus::Submitted, None)
        .await?
        .ok_or_else(|| AppError::not_found("Timesheet not found"))?;
    Ok(Json(ApiResponse::success(timesheet)))
}

pub async fn validate_timesheet_handler(
    State(state): State<AppState>,
    Path(timesheet_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<ApiResponse<Timesheet>>> {
    let timesheet = state
        .unit_of_work()
        .timesheets
        .set_status(timesheet_id, WorkflowStatus::Validated, Some(user.id))
        .await?
        .ok_or_else(|| AppError::not_found("Timesheet not found"))?;
    info!("timesheet {timesheet_id} validated by user {}", user.id);
    Ok(Json(ApiResponse::success(timesheet)))
}

pub async fn add_shift_handler(
    State(state): State<AppState>,
    Path(timesheet_id): Path<i64>,
    Json(input): Json<ShiftInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<Shift>>)> {
    let shift = input.into_new_shift()?;
    let created = state
        .unit_of_work()
        .timesheets
        .add_shift(timesheet_id, &shift)
        .await?
        .ok_or_else(|| AppError::not_found("Timesheet not found"))?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}
