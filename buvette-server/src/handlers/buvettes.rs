use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use buvette_core::{
    api_types::{
        ApiResponse,
        catalog::{LinkProductRequest, ReorderProductsRequest},
    },
    domain::validation::require_non_negative,
    types::{Buvette, BuvetteProduct, Product},
};
use tracing::info;

use crate::{
    AppState,
    infra::errors::{AppError, AppResult},
};

pub async fn list_buvettes_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Buvette>>>> {
    let buvettes = state.unit_of_work().catalog.list_active_buvettes().await?;
    Ok(Json(ApiResponse::success(buvettes)))
}

pub async fn buvettes_by_sport_handler(
    State(state): State<AppState>,
    Path(sport): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<Buvette>>>> {
    let sport = sport.trim().to_uppercase();
    let buvettes = state
        .unit_of_work()
        .catalog
        .list_buvettes_by_sport(&sport)
        .await?;
    Ok(Json(ApiResponse::success(buvettes)))
}

pub async fn list_products_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let products = state.unit_of_work().catalog.list_active_products().await?;
    Ok(Json(ApiResponse::success(products)))
}

pub async fn buvette_products_handler(
    State(state): State<AppState>,
    Path(buvette_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<BuvetteProduct>>>> {
    let links = state
        .unit_of_work()
        .catalog
        .list_buvette_products(buvette_id)
        .await?;
    Ok(Json(ApiResponse::success(links)))
}

pub async fn link_product_handler(
    State(state): State<AppState>,
    Path(buvette_id): Path<i64>,
    Json(request): Json<LinkProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<BuvetteProduct>>)> {
    require_non_negative("display_order", request.display_order)?;
    require_non_negative("default_stock", request.default_stock)?;

    let link = state
        .unit_of_work()
        .catalog
        .upsert_buvette_product(
            buvette_id,
            request.product_id,
            request.display_order,
            request.default_stock,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(link))))
}

pub async fn unlink_product_handler(
    State(state): State<AppState>,
    Path((buvette_id, product_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    let removed = state
        .unit_of_work()
        .catalog
        .remove_buvette_product(buvette_id, product_id)
        .await?;
    if !removed {
        return Err(AppError::not_found(format!(
            "Product {product_id} is not stocked by buvette {buvette_id}"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reorder_products_handler(
    State(state): State<AppState>,
    Path(buvette_id): Path<i64>,
    Json(request): Json<ReorderProductsRequest>,
) -> AppResult<Json<ApiResponse<Vec<BuvetteProduct>>>> {
    let catalog = &state.unit_of_work().catalog;
    catalog
        .reorder_buvette_products(buvette_id, &request.items)
        .await?;
    info!(
        "reordered {} products of buvette {buvette_id}",
        request.items.len()
    );
    let links = catalog.list_buvette_products(buvette_id).await?;
    Ok(Json(ApiResponse::success(links)))
}
