use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use buvette_core::{
    api_types::{ApiResponse, staff::RosterQuery},
    types::{
        StaffMember, UserSummary,
        staff::{RosterEntry, RosterKind, StaffMemberInput},
    },
};
use tracing::info;

use crate::{
    AppState,
    infra::errors::{AppError, AppResult},
};

pub async fn list_staff_members_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<StaffMember>>>> {
    let members = state.unit_of_work().staff.list_staff().await?;
    Ok(Json(ApiResponse::success(members)))
}

pub async fn create_staff_member_handler(
    State(state): State<AppState>,
    Json(input): Json<StaffMemberInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<StaffMember>>)> {
    input.validate()?;
    let member = state.unit_of_work().staff.create_staff(&input).await?;
    info!("created staff member {} ({})", member.id, member.full_name());
    Ok((StatusCode::CREATED, Json(ApiResponse::success(member))))
}

pub async fn update_staff_member_handler(
    State(state): State<AppState>,
    Path(staff_id): Path<i64>,
    Json(input): Json<StaffMemberInput>,
) -> AppResult<Json<ApiResponse<StaffMember>>> {
    input.validate()?;
    let member = state
        .unit_of_work()
        .staff
        .update_staff(staff_id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Staff member not found"))?;
    Ok(Json(ApiResponse::success(member)))
}

pub async fn delete_staff_member_handler(
    State(state): State<AppState>,
    Path(staff_id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !state.unit_of_work().staff.delete_staff(staff_id).await? {
        return Err(AppError::not_found("Staff member not found"));
    }
    info!("deleted staff member {staff_id}");
    Ok(Json(ApiResponse::message("Staff member deleted")))
}

/// Everyone who can appear on a kiosk timesheet. Filtering by event and
/// buvette narrows the staff side only.
pub async fn roster_handler(
    State(state): State<AppState>,
    Query(query): Query<RosterQuery>,
) -> AppResult<Json<ApiResponse<Vec<RosterEntry>>>> {
    let uow = state.unit_of_work();
    let staff = match query.assignment_filter() {
        Some((event_id, buvette_id)) => uow
            .staff
            .list_buvette_assignments(event_id, buvette_id)
            .await?
            .into_iter()
            .map(|assignment| assignment.staff)
            .collect(),
        None => uow.staff.list_staff().await?,
    };
    let users = uow.users.list_users().await?;
    Ok(Json(ApiResponse::success(build_roster(&staff, &users))))
}

fn build_roster(staff: &[StaffMember], users: &[UserSummary]) -> Vec<RosterEntry> {
    let staff_entries = staff.iter().map(|member| RosterEntry {
        id: format!("staff_{}", member.id),
        original_id: member.id,
        kind: RosterKind::Staff,
        first_name: member.first_name.clone(),
        last_name: member.last_name.clone(),
        email: member.email.clone(),
        display_name: format!("{} (Staff)", member.full_name()),
    });
    let user_entries = users.iter().map(|user| RosterEntry {
        id: format!("user_{}", user.id),
        original_id: user.id,
        kind: RosterKind::User,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email: Some(user.email.clone()),
        display_name: format!("{} (Responsable)", user.full_name()),
    });
    staff_entries.chain(user_entries).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: i64, first: &str, last: &str) -> StaffMember {
        StaffMember {
            id,
            first_name: first.into(),
            last_name: last.into(),
            email: None,
            phone: None,
            hourly_rate: None,
            contract_number: None,
            staff_type: "EXTRA".into(),
        }
    }

    #[test]
    fn roster_prefixes_ids_by_kind() {
        let staff = vec![member(3, "Léa", "Rochat")];
        let users = vec![UserSummary {
            id: 3,
            first_name: "Chef".into(),
            last_name: "Ops".into(),
            email: "chef@example.com".into(),
        }];
        let roster = build_roster(&staff, &users);
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].id, "staff_3");
        assert_eq!(roster[0].kind, RosterKind::Staff);
        assert_eq!(roster[0].display_name, "Léa Rochat (Staff)");
        assert_eq!(roster[1].id, "user_3");
        assert_eq!(roster[1].email.as_deref(), Some("chef@example.com"));
        assert_eq!(roster[1].display_name, "Chef Ops (Responsable)");
    }

    #[test]
    fn roster_serializes_kind_as_type() {
        let roster = build_roster(&[member(1, "A", "B")], &[]);
        let json = serde_json::to_value(&roster[0]).unwrap();
        assert_eq!(json["type"], "staff");
        assert_eq!(json["original_id"], 1);
    }
}
