use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use buvette_core::{
    api_types::{
        ApiResponse, BatchResult,
        inventory::{InventorySheet, SaveSheetRequest, SnapshotQuery, SnapshotRequest, build_sheet},
    },
    domain::reports::{RestockLine, restock_lines},
    types::{InventorySnapshot, inventory::DeltaWithRefs},
};
use tracing::info;

use crate::{
    AppState,
    infra::errors::AppResult,
};

/// Stocked products merged with the counts recorded so far.
pub async fn inventory_sheet_handler(
    State(state): State<AppState>,
    Path((event_id, buvette_id)): Path<(i64, i64)>,
) -> AppResult<Json<ApiResponse<InventorySheet>>> {
    let uow = state.unit_of_work();
    let links = uow.catalog.list_buvette_products(buvette_id).await?;
    let deltas = uow.inventory.buvette_deltas(event_id, buvette_id).await?;
    Ok(Json(ApiResponse::success(build_sheet(
        event_id, buvette_id, &links, &deltas,
    ))))
}

pub async fn save_inventory_sheet_handler(
    State(state): State<AppState>,
    Path((event_id, buvette_id)): Path<(i64, i64)>,
    Json(request): Json<SaveSheetRequest>,
) -> AppResult<Json<ApiResponse<BatchResult>>> {
    request.validate()?;
    let written = state
        .unit_of_work()
        .inventory
        .save_sheet(event_id, buvette_id, &request.items)
        .await?;
    let count = usize::try_from(written).unwrap_or(request.items.len());
    info!("saved {count} inventory lines for event {event_id} buvette {buvette_id}");
    Ok(Json(ApiResponse::success(BatchResult {
        success: true,
        count,
    })))
}

pub async fn create_snapshot_handler(
    State(state): State<AppState>,
    Path((event_id, buvette_id)): Path<(i64, i64)>,
    Json(request): Json<SnapshotRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<InventorySnapshot>>)> {
    let (kind, items) = request.into_items()?;
    let snapshot = state
        .unit_of_work()
        .inventory
        .create_snapshot(event_id, buvette_id, kind, &items)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(snapshot))))
}

pub async fn list_snapshots_handler(
    State(state): State<AppState>,
    Path((event_id, buvette_id)): Path<(i64, i64)>,
    Query(query): Query<SnapshotQuery>,
) -> AppResult<Json<ApiResponse<Vec<InventorySnapshot>>>> {
    let snapshots = state
        .unit_of_work()
        .inventory
        .list_snapshots(event_id, buvette_id, query.kind)
        .await?;
    Ok(Json(ApiResponse::success(snapshots)))
}

pub async fn shortages_handler(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<DeltaWithRefs>>>> {
    let shortages = state.unit_of_work().inventory.shortages(event_id).await?;
    Ok(Json(ApiResponse::success(shortages)))
}

pub async fn restock_handler(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<RestockLine>>>> {
    let deltas = state.unit_of_work().inventory.event_deltas(event_id).await?;
    Ok(Json(ApiResponse::success(restock_lines(&deltas))))
}
