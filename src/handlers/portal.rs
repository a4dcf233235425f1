//! Self-service ordering for client accounts.

use axum::{extract::State, response::Response, Json};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::{Capability, Viewer},
    errors::ServiceError,
    handlers::common::{created_response, detail_path, Page},
    services::{
        orders::{PaymentMethod, PlaceOrderRequest, ShippingMethod},
        products::CatalogEntry,
    },
    ApiResponse, ApiResult, AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ShippingOption {
    pub method: ShippingMethod,
    #[schema(value_type = String)]
    pub fee: Decimal,
}

/// What the portal order form offers
#[derive(Debug, Serialize, ToSchema)]
pub struct PortalOrderForm {
    pub products: Vec<CatalogEntry>,
    pub shipping_options: Vec<ShippingOption>,
    pub payment_methods: Vec<PaymentMethod>,
    pub currency: String,
    /// False until staff link the account to a customer
    pub account_linked: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/portal/orders/new",
    responses(
        (status = 200, description = "Catalogue with availability, shipping and payment options", body = ApiResponse<Page<PortalOrderForm>>),
        (status = 403, description = "Caller cannot place portal orders", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "portal"
)]
pub async fn place_order_form(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Page<PortalOrderForm>> {
    viewer.require(Capability::PlaceOrder)?;
    let orders = &state.services.orders;
    let settings = orders.settings();
    let products = state
        .services
        .products
        .order_catalog(state.config.low_stock_catalog_threshold)
        .await?;

    let form = PortalOrderForm {
        products,
        shipping_options: [ShippingMethod::Standard, ShippingMethod::Express]
            .into_iter()
            .map(|method| ShippingOption {
                method,
                fee: settings.shipping_fee(method),
            })
            .collect(),
        payment_methods: vec![
            PaymentMethod::Razorpay,
            PaymentMethod::Upi,
            PaymentMethod::Neft,
            PaymentMethod::Cheque,
        ],
        currency: settings.currency.clone(),
        account_linked: viewer.customer_id.is_some(),
    };
    Ok(Json(ApiResponse::success(Page::new(
        &viewer,
        &[Capability::PlaceOrder],
        form,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/portal/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed; Location points at its detail view"),
        (status = 400, description = "Account not linked to a customer", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller cannot place portal orders", body = crate::errors::ErrorResponse),
        (status = 400, description = "No items or invalid quantities", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "portal"
)]
pub async fn place_order(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<Response, ServiceError> {
    viewer.require(Capability::PlaceOrder)?;
    let placed = state
        .services
        .orders
        .place_order(payload, viewer.customer_id, viewer.profile_id)
        .await?;
    Ok(created_response(detail_path("orders", placed.order.id), placed))
}
