use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use buvette_core::{
    api_types::{
        ApiResponse,
        events::{ArrivalTimeRequest, AssignStaffRequest, CreateEventRequest, LinkBuvetteRequest},
    },
    types::{Buvette, EventBuvette, EventWithBuvettes, StaffAssignment, staff::NewAssignment},
};
use tracing::info;

use crate::{
    AppState,
    infra::errors::{AppError, AppResult},
};

pub async fn list_events_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<EventWithBuvettes>>>> {
    let events = state.unit_of_work().events.list_events().await?;
    Ok(Json(ApiResponse::success(events)))
}

pub async fn create_event_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<EventWithBuvettes>>)> {
    let new_event = request.into_new_event()?;
    for &buvette_id in &new_event.buvette_ids {
        require_buvette(&state, buvette_id).await?;
    }

    let event = state.unit_of_work().events.create_event(&new_event).await?;
    info!(
        "created event {} ({}) with {} buvettes",
        event.event.id,
        event.event.name,
        event.buvettes.len()
    );
    Ok((StatusCode::CREATED, Json(ApiResponse::success(event))))
}

pub async fn get_event_handler(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> AppResult<Json<ApiResponse<EventWithBuvettes>>> {
    let event = state
        .unit_of_work()
        .events
        .get_event_with_buvettes(event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;
    Ok(Json(ApiResponse::success(event)))
}

pub async fn event_buvettes_handler(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<EventBuvette>>>> {
    let links = state
        .unit_of_work()
        .events
        .list_event_buvettes(event_id)
        .await?;
    Ok(Json(ApiResponse::success(links)))
}

pub async fn link_buvette_handler(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    Json(request): Json<LinkBuvetteRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<EventBuvette>>)> {
    let uow = state.unit_of_work();
    uow.events
        .get_event(event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;
    require_buvette(&state, request.buvette_id).await?;
    uow.users
        .get_user(request.responsable_id)
        .await?
        .ok_or_else(|| {
            AppError::bad_request(format!("User {} not found", request.responsable_id))
        })?;

    let link = uow
        .events
        .link_buvette(event_id, request.buvette_id, Some(request.responsable_id))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(link))))
}

pub async fn list_assignments_handler(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<StaffAssignment>>>> {
    let assignments = state.unit_of_work().staff.list_assignments(event_id).await?;
    Ok(Json(ApiResponse::success(assignments)))
}

/// Places a staff member at a buvette. The slot is the next free position
/// and the arrival time comes from that buvette's schedule.
pub async fn assign_staff_handler(
    State(state): State<AppState>,
    Path((event_id, buvette_id)): Path<(i64, i64)>,
    Json(request): Json<AssignStaffRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<StaffAssignment>>)> {
    let staff_id = request
        .staff_id
        .ok_or_else(|| AppError::bad_request("staff_id is required"))?;

    let uow = state.unit_of_work();
    let event = uow
        .events
        .get_event(event_id)
        .await?
        .ok_or_else(|| AppError::bad_request(format!("Event {event_id} not found")))?;
    let buvette = require_buvette(&state, buvette_id).await?;
    let staff = uow
        .staff
        .get_staff(staff_id)
        .await?
        .ok_or_else(|| AppError::bad_request(format!("Staff member {staff_id} not found")))?;

    if let Some(existing) = uow.staff.find_event_assignment(event.id, staff.id).await? {
        return Err(AppError::conflict(format!(
            "{} is already assigned to {} for this event",
            staff.full_name(),
            existing.buvette.name
        )));
    }

    let taken = uow
        .staff
        .count_buvette_assignments(event.id, buvette.id)
        .await?;
    let slot = usize::try_from(taken).unwrap_or(0);
    let assignment = NewAssignment {
        event_id: event.id,
        buvette_id: buvette.id,
        staff_id: staff.id,
        arrival_time: state.schedules().arrival_time_for_slot(&buvette.name, slot),
        slot_index: i32::try_from(taken + 1).unwrap_or(i32::MAX),
    };
    let created = uow.staff.create_assignment(&assignment).await?;

    info!(
        "assigned staff {} to buvette {} for event {} (slot {})",
        staff.id, buvette.id, event.id, assignment.slot_index
    );
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn update_arrival_handler(
    State(state): State<AppState>,
    Path((event_id, buvette_id, staff_id)): Path<(i64, i64, i64)>,
    Json(request): Json<ArrivalTimeRequest>,
) -> AppResult<Json<ApiResponse<StaffAssignment>>> {
    let arrival_time = request.normalized()?;
    let assignment = state
        .unit_of_work()
        .staff
        .update_arrival_time(event_id, buvette_id, staff_id, arrival_time.as_deref())
        .await?
        .ok_or_else(|| AppError::not_found("Assignment not found"))?;
    Ok(Json(ApiResponse::success(assignment)))
}

pub async fn remove_assignment_handler(
    State(state): State<AppState>,
    Path((event_id, buvette_id, staff_id)): Path<(i64, i64, i64)>,
) -> AppResult<Json<ApiResponse<()>>> {
    let removed = state
        .unit_of_work()
        .staff
        .delete_assignment(event_id, buvette_id, staff_id)
        .await?;
    if !removed {
        return Err(AppError::not_found("Assignment not found"));
    }
    Ok(Json(ApiResponse::message("Assignment removed")))
}

async fn require_buvette(state: &AppState, buvette_id: i64) -> AppResult<Buvette> {
    state
        .unit_of_work()
        .catalog
        .get_buvette(buvette_id)
        .await?
        .ok_or_else(|| AppError::bad_request(format!("Buvette {buvette_id} not found")))
}
