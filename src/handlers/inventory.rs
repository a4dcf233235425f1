use axum::{
    extract::State,
    response::Response,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::{Capability, Viewer},
    entities::product,
    errors::ServiceError,
    handlers::common::{created_response, detail_path, Page},
    lifecycle::StatusView,
    services::{
        inventory::{InventoryService, MovementRow, RecordMovementRequest, RECENT_MOVEMENTS},
        products::ProductRow,
    },
    ApiResponse, ApiResult, AppState,
};

/// Inventory page
#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryOverview {
    pub products: Vec<ProductRow>,
    pub recent_movements: Vec<MovementRow>,
    #[schema(value_type = Vec<Object>)]
    pub low_stock: Vec<product::Model>,
    pub movement_kinds: Vec<StatusView>,
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory",
    responses(
        (status = 200, description = "Stock levels, latest movements and low-stock list", body = ApiResponse<Page<InventoryOverview>>),
        (status = 303, description = "Not signed in or section not permitted"),
    ),
    security(("Bearer" = [])),
    tag = "inventory"
)]
pub async fn inventory_overview(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Page<InventoryOverview>> {
    let services = &state.services;
    let (products, recent_movements, low_stock) = tokio::try_join!(
        services.products.list(),
        services.inventory.recent_movements(RECENT_MOVEMENTS),
        services.inventory.low_stock(),
    )?;

    let overview = InventoryOverview {
        products: products.into_iter().map(ProductRow::from).collect(),
        recent_movements,
        low_stock,
        movement_kinds: InventoryService::movement_kinds(),
    };
    Ok(Json(ApiResponse::success(Page::new(
        &viewer,
        &[Capability::AdjustInventory, Capability::ManageProducts],
        overview,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/inventory/movements",
    request_body = RecordMovementRequest,
    responses(
        (status = 201, description = "Movement booked; Location points at the product"),
        (status = 403, description = "Caller cannot adjust inventory", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "inventory"
)]
pub async fn record_movement(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(payload): Json<RecordMovementRequest>,
) -> Result<Response, ServiceError> {
    viewer.require(Capability::AdjustInventory)?;
    let entry = state
        .services
        .inventory
        .record_movement(payload, Some(viewer.profile_id))
        .await?;
    Ok(created_response(detail_path("products", entry.product_id), entry))
}
