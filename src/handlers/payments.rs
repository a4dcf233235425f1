use axum::{
    extract::{Query, State},
    response::Response,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    auth::{Capability, Viewer},
    errors::ServiceError,
    handlers::common::{created_response, detail_path, Page},
    services::payments::{PaymentRow, RecordPaymentRequest},
    ApiResponse, ApiResult, AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct PaymentListQuery {
    /// Cap on the number of rows
    pub limit: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/payments",
    params(PaymentListQuery),
    responses(
        (status = 200, description = "Payments newest first", body = ApiResponse<Page<Vec<PaymentRow>>>),
        (status = 303, description = "Not signed in or section not permitted"),
    ),
    security(("Bearer" = [])),
    tag = "payments"
)]
pub async fn list_payments(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<PaymentListQuery>,
) -> ApiResult<Page<Vec<PaymentRow>>> {
    let rows = state.services.payments.list(query.limit).await?;
    Ok(Json(ApiResponse::success(Page::new(
        &viewer,
        &[Capability::RecordPayment],
        rows,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/payments",
    request_body = RecordPaymentRequest,
    responses(
        (status = 201, description = "Payment recorded; Location points at the invoice"),
        (status = 403, description = "Caller cannot record payments", body = crate::errors::ErrorResponse),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "payments"
)]
pub async fn record_payment(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(payload): Json<RecordPaymentRequest>,
) -> Result<Response, ServiceError> {
    viewer.require(Capability::RecordPayment)?;
    let payment = state
        .services
        .payments
        .record_payment(payload, viewer.profile_id)
        .await?;
    Ok(created_response(detail_path("invoices", payment.invoice_id), payment))
}
