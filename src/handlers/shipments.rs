use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use serde::Serialize;
use strum::IntoEnumIterator;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::{Capability, Viewer},
    entities::{shipment, shipping_carrier},
    errors::ServiceError,
    handlers::common::{created_response, detail_path, Page},
    lifecycle::{Badged, ShipmentStatus, StatusView},
    services::shipments::{
        CreateShipmentRequest, ShipmentDetail, ShipmentRow, ShippableOrder,
        UpdateShipmentStatusRequest,
    },
    ApiResponse, ApiResult, AppState,
};

/// Shipment form: orders ready to ship and active carriers
#[derive(Debug, Serialize, ToSchema)]
pub struct ShipmentForm {
    pub orders: Vec<ShippableOrder>,
    #[schema(value_type = Vec<Object>)]
    pub carriers: Vec<shipping_carrier::Model>,
    pub statuses: Vec<StatusView>,
}

#[utoipa::path(
    get,
    path = "/api/v1/shipping",
    responses(
        (status = 200, description = "Shipments visible to the caller, newest first", body = ApiResponse<Page<Vec<ShipmentRow>>>),
    ),
    security(("Bearer" = [])),
    tag = "shipping"
)]
pub async fn list_shipments(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Page<Vec<ShipmentRow>>> {
    let rows = state.services.shipments.list(viewer.scope(), None).await?;
    Ok(Json(ApiResponse::success(Page::new(
        &viewer,
        &[Capability::ManageShipments],
        rows,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/shipping/new",
    responses(
        (status = 200, description = "Shippable orders and carriers", body = ApiResponse<Page<ShipmentForm>>),
        (status = 403, description = "Caller cannot manage shipments", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "shipping"
)]
pub async fn new_shipment_form(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Page<ShipmentForm>> {
    viewer.require(Capability::ManageShipments)?;
    let shipments = &state.services.shipments;
    let (orders, carriers) = tokio::try_join!(shipments.shippable_orders(), shipments.carriers())?;
    let form = ShipmentForm {
        orders,
        carriers,
        statuses: ShipmentStatus::iter().map(Badged::view).collect(),
    };
    Ok(Json(ApiResponse::success(Page::new(
        &viewer,
        &[Capability::ManageShipments],
        form,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/shipping",
    request_body = CreateShipmentRequest,
    responses(
        (status = 201, description = "Shipment created; with a tracking number the order is marked shipped"),
        (status = 400, description = "Carrier does not offer the service", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller cannot manage shipments", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order or carrier not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "shipping"
)]
pub async fn create_shipment(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(payload): Json<CreateShipmentRequest>,
) -> Result<Response, ServiceError> {
    viewer.require(Capability::ManageShipments)?;
    let shipment = state
        .services
        .shipments
        .create_shipment(payload, viewer.profile_id)
        .await?;
    Ok(created_response(detail_path("shipping", shipment.id), shipment))
}

#[utoipa::path(
    get,
    path = "/api/v1/shipping/{id}",
    params(("id" = Uuid, Path, description = "Shipment id")),
    responses(
        (status = 200, description = "Shipment with order, carrier and lines", body = ApiResponse<Page<ShipmentDetail>>),
        (status = 404, description = "Shipment not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "shipping"
)]
pub async fn get_shipment(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
) -> ApiResult<Page<ShipmentDetail>> {
    let detail = state.services.shipments.detail(id, viewer.scope()).await?;
    Ok(Json(ApiResponse::success(Page::new(
        &viewer,
        &[Capability::ManageShipments],
        detail,
    ))))
}

#[utoipa::path(
    put,
    path = "/api/v1/shipping/{id}/status",
    params(("id" = Uuid, Path, description = "Shipment id")),
    request_body = UpdateShipmentStatusRequest,
    responses(
        (status = 200, description = "Status written"),
        (status = 400, description = "Unknown status", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller cannot manage shipments", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "shipping"
)]
pub async fn update_shipment_status(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateShipmentStatusRequest>,
) -> ApiResult<shipment::Model> {
    viewer.require(Capability::ManageShipments)?;
    let updated = state.services.shipments.update_status(id, payload).await?;
    Ok(Json(ApiResponse::success(updated)))
}
