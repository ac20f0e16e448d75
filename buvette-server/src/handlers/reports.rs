//! Per-event dashboards for the back office.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use buvette_core::{
    api_types::{
        ApiResponse,
        reports::{ExportFormat, ExportQuery},
    },
    domain::reports::{
        BuvetteChecklistSummary, BuvetteInventorySummary, BuvetteStaffing, TimesheetSummary,
        checklist_summary, detailed_staffing, hours_csv, hours_export, inventory_summary,
        timesheet_summary,
    },
};

use crate::{
    AppState,
    infra::errors::{AppError, AppResult},
};

pub async fn timesheet_summary_handler(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> AppResult<Json<ApiResponse<TimesheetSummary>>> {
    let reports = state
        .unit_of_work()
        .timesheets
        .reports_for_event(event_id)
        .await?;
    Ok(Json(ApiResponse::success(timesheet_summary(&reports))))
}

pub async fn detailed_staffing_handler(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<BuvetteStaffing>>>> {
    let uow = state.unit_of_work();
    let links = uow.events.list_event_buvettes(event_id).await?;
    let assignments = uow.staff.list_assignments(event_id).await?;
    let reports = uow.timesheets.reports_for_event(event_id).await?;
    Ok(Json(ApiResponse::success(detailed_staffing(
        &links,
        &assignments,
        &reports,
    ))))
}

pub async fn inventory_summary_handler(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<BuvetteInventorySummary>>>> {
    let deltas = state.unit_of_work().inventory.event_deltas(event_id).await?;
    Ok(Json(ApiResponse::success(inventory_summary(&deltas))))
}

pub async fn checklist_summary_handler(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<BuvetteChecklistSummary>>>> {
    let reports = state
        .unit_of_work()
        .checklists
        .reports_for_event(event_id)
        .await?;
    Ok(Json(ApiResponse::success(checklist_summary(&reports))))
}

/// Payroll export of every shift. `?format=csv` downloads the rows only.
pub async fn hours_export_handler(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    let uow = state.unit_of_work();
    let event = uow
        .events
        .get_event(event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;
    let reports = uow.timesheets.reports_for_event(event.id).await?;
    let export = hours_export(&event, &reports);

    match query.format {
        ExportFormat::Json => Ok(Json(ApiResponse::success(export)).into_response()),
        ExportFormat::Csv => {
            let body = hours_csv(&export.rows)?;
            let disposition = format!(
                "attachment; filename=\"heures-{}-{}.csv\"",
                event.id,
                event.date.format("%Y-%m-%d")
            );
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                body,
            )
                .into_response())
        }
    }
}
