use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use serde::Serialize;
use strum::IntoEnumIterator;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::{Capability, Viewer},
    entities::{customer, order},
    errors::ServiceError,
    handlers::common::{created_response, detail_path, Page},
    lifecycle::{Badged, OrderStatus, StatusView},
    services::{
        orders::{
            CreateOrderRequest, OrderDetail, OrderRow, UpdateOrderRequest,
            UpdateOrderStatusRequest,
        },
        products::CatalogEntry,
    },
    ApiResponse, ApiResult, AppState,
};

const LIST_ACTIONS: [Capability; 2] = [Capability::CreateOrder, Capability::PlaceOrder];
const DETAIL_ACTIONS: [Capability; 3] = [
    Capability::EditOrder,
    Capability::UpdateOrderStatus,
    Capability::RequestCustomization,
];

/// Everything the staff order form offers
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderForm {
    #[schema(value_type = Vec<Object>)]
    pub customers: Vec<customer::Model>,
    pub products: Vec<CatalogEntry>,
    pub statuses: Vec<StatusView>,
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    responses(
        (status = 200, description = "Orders visible to the caller, newest first", body = ApiResponse<Page<Vec<OrderRow>>>),
        (status = 303, description = "Not signed in"),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Page<Vec<OrderRow>>> {
    let rows = state.services.orders.list(viewer.scope()).await?;
    Ok(Json(ApiResponse::success(Page::new(&viewer, &LIST_ACTIONS, rows))))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/new",
    responses(
        (status = 200, description = "Customers and catalogue for order entry", body = ApiResponse<Page<OrderForm>>),
        (status = 403, description = "Caller cannot create orders", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn new_order_form(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Page<OrderForm>> {
    viewer.require(Capability::CreateOrder)?;
    let (customers, products) = tokio::try_join!(
        state.services.customers.list(None),
        state
            .services
            .products
            .order_catalog(state.config.low_stock_catalog_threshold),
    )?;
    let form = OrderForm {
        customers,
        products,
        statuses: OrderStatus::iter().map(Badged::view).collect(),
    };
    Ok(Json(ApiResponse::success(Page::new(
        &viewer,
        &[Capability::CreateOrder],
        form,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created; Location points at its detail view"),
        (status = 403, description = "Caller cannot create orders", body = crate::errors::ErrorResponse),
        (status = 404, description = "Customer or product not found", body = crate::errors::ErrorResponse),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Response, ServiceError> {
    viewer.require(Capability::CreateOrder)?;
    let created = state
        .services
        .orders
        .create_order(payload, viewer.profile_id)
        .await?;
    info!(order_number = %created.order.order_number, "order entered");
    Ok(created_response(detail_path("orders", created.order.id), created))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with customer, lines, shipments and invoice", body = ApiResponse<Page<OrderDetail>>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
) -> ApiResult<Page<OrderDetail>> {
    let detail = state.services.orders.detail(id, viewer.scope()).await?;
    Ok(Json(ApiResponse::success(Page::new(&viewer, &DETAIL_ACTIONS, detail))))
}

#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated"),
        (status = 403, description = "Caller cannot edit orders", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderRequest>,
) -> ApiResult<order::Model> {
    viewer.require(Capability::EditOrder)?;
    let updated = state.services.orders.update_order(id, payload).await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status written"),
        (status = 400, description = "Unknown status", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller cannot change order status", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> ApiResult<order::Model> {
    viewer.require(Capability::UpdateOrderStatus)?;
    let updated = state.services.orders.update_status(id, payload).await?;
    Ok(Json(ApiResponse::success(updated)))
}
