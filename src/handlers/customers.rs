use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    auth::{Capability, DataScope, Viewer},
    entities::{customer, profile},
    errors::ServiceError,
    handlers::common::{created_response, detail_path, Page},
    services::{customers::CreateCustomerRequest, orders::OrderRow},
    ApiResponse, ApiResult, AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct CustomerSearch {
    /// Matches company or contact name
    pub search: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerDetail {
    #[schema(value_type = Object)]
    pub customer: customer::Model,
    pub orders: Vec<OrderRow>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LinkProfileRequest {
    pub profile_id: Uuid,
}

#[utoipa::path(
    get,
    path = "/api/v1/customers",
    params(CustomerSearch),
    responses(
        (status = 200, description = "Customers ordered by company"),
        (status = 303, description = "Not signed in or section not permitted"),
    ),
    security(("Bearer" = [])),
    tag = "customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<CustomerSearch>,
) -> ApiResult<Page<Vec<customer::Model>>> {
    let customers = state
        .services
        .customers
        .list(query.search.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(Page::new(
        &viewer,
        &[Capability::ManageCustomers],
        customers,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created"),
        (status = 403, description = "Caller cannot manage customers", body = crate::errors::ErrorResponse),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<Response, ServiceError> {
    viewer.require(Capability::ManageCustomers)?;
    let customer = state.services.customers.create(payload).await?;
    Ok(created_response(detail_path("customers", customer.id), customer))
}

#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer with their orders", body = ApiResponse<Page<CustomerDetail>>),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
) -> ApiResult<Page<CustomerDetail>> {
    let (customer, orders) = tokio::try_join!(
        state.services.customers.get(id),
        state.services.orders.list(DataScope::Customer(Some(id))),
    )?;
    Ok(Json(ApiResponse::success(Page::new(
        &viewer,
        &[Capability::ManageCustomers, Capability::CreateOrder],
        CustomerDetail { customer, orders },
    ))))
}

/// Links a client profile to this customer so its portal shows their rows.
#[utoipa::path(
    post,
    path = "/api/v1/customers/{id}/portal-profile",
    params(("id" = Uuid, Path, description = "Customer id")),
    request_body = LinkProfileRequest,
    responses(
        (status = 200, description = "Profile linked"),
        (status = 400, description = "Profile is not a client account", body = crate::errors::ErrorResponse),
        (status = 404, description = "Customer or profile not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "customers"
)]
pub async fn link_portal_profile(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
    Json(payload): Json<LinkProfileRequest>,
) -> ApiResult<profile::Model> {
    viewer.require(Capability::ManageCustomers)?;
    let customer = state.services.customers.get(id).await?;
    let linked = state
        .services
        .profiles
        .link_customer(payload.profile_id, customer.id)
        .await?;
    Ok(Json(ApiResponse::success(linked)))
}
