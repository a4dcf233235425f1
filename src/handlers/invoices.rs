use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::{Capability, Viewer},
    entities::{invoice, payment_term},
    errors::ServiceError,
    handlers::common::{created_response, detail_path, Page},
    services::invoicing::{
        CreateInvoiceRequest, InvoiceDetail, InvoiceRow, InvoiceableOrder,
        UpdateInvoiceStatusRequest,
    },
    ApiResponse, ApiResult, AppState,
};

const INVOICE_ACTIONS: [Capability; 3] = [
    Capability::CreateInvoice,
    Capability::UpdateInvoiceStatus,
    Capability::RecordPayment,
];

/// Invoice form: eligible orders, payment terms and defaults
#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceForm {
    pub orders: Vec<InvoiceableOrder>,
    #[schema(value_type = Vec<Object>)]
    pub payment_terms: Vec<payment_term::Model>,
    pub default_terms: String,
    pub issue_date: chrono::NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateInvoiceRequest {
    pub order_id: Uuid,
}

#[utoipa::path(
    get,
    path = "/api/v1/invoices",
    responses(
        (status = 200, description = "Invoices visible to the caller, newest first", body = ApiResponse<Page<Vec<InvoiceRow>>>),
    ),
    security(("Bearer" = [])),
    tag = "invoices"
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Page<Vec<InvoiceRow>>> {
    let rows = state.services.invoices.list(viewer.scope()).await?;
    Ok(Json(ApiResponse::success(Page::new(&viewer, &INVOICE_ACTIONS, rows))))
}

#[utoipa::path(
    get,
    path = "/api/v1/invoices/new",
    responses(
        (status = 200, description = "Orders awaiting an invoice plus payment terms", body = ApiResponse<Page<InvoiceForm>>),
        (status = 403, description = "Caller cannot create invoices", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "invoices"
)]
pub async fn new_invoice_form(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Page<InvoiceForm>> {
    viewer.require(Capability::CreateInvoice)?;
    let invoices = &state.services.invoices;
    let (orders, payment_terms) =
        tokio::try_join!(invoices.invoiceable_orders(), invoices.payment_terms())?;

    let form = InvoiceForm {
        orders,
        payment_terms,
        default_terms: invoices.default_terms().to_string(),
        issue_date: Utc::now().date_naive(),
    };
    Ok(Json(ApiResponse::success(Page::new(
        &viewer,
        &[Capability::CreateInvoice],
        form,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/invoices",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice generated with terms and due date"),
        (status = 403, description = "Caller cannot create invoices", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order or payment term not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order already invoiced", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "invoices"
)]
pub async fn create_invoice(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(payload): Json<CreateInvoiceRequest>,
) -> Result<Response, ServiceError> {
    viewer.require(Capability::CreateInvoice)?;
    let invoice = state
        .services
        .invoices
        .create_invoice(payload, viewer.profile_id)
        .await?;
    Ok(created_response(detail_path("invoices", invoice.id), invoice))
}

/// Remote procedure: draft invoice from an order's amounts.
#[utoipa::path(
    post,
    path = "/api/v1/rpc/generate_invoice_from_order",
    request_body = GenerateInvoiceRequest,
    responses(
        (status = 201, description = "Draft invoice generated"),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order already invoiced", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "invoices"
)]
pub async fn generate_invoice_from_order(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(payload): Json<GenerateInvoiceRequest>,
) -> Result<Response, ServiceError> {
    viewer.require(Capability::CreateInvoice)?;
    let invoice = state
        .services
        .invoices
        .generate_from_order(payload.order_id, Some(viewer.profile_id))
        .await?;
    Ok(created_response(detail_path("invoices", invoice.id), invoice))
}

#[utoipa::path(
    get,
    path = "/api/v1/invoices/{id}",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice with lines and payments", body = ApiResponse<Page<InvoiceDetail>>),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "invoices"
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
) -> ApiResult<Page<InvoiceDetail>> {
    let detail = state.services.invoices.detail(id, viewer.scope()).await?;
    Ok(Json(ApiResponse::success(Page::new(&viewer, &INVOICE_ACTIONS, detail))))
}

#[utoipa::path(
    put,
    path = "/api/v1/invoices/{id}/status",
    params(("id" = Uuid, Path, description = "Invoice id")),
    request_body = UpdateInvoiceStatusRequest,
    responses(
        (status = 200, description = "Status written"),
        (status = 400, description = "Unknown status", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller cannot change invoice status", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "invoices"
)]
pub async fn update_invoice_status(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInvoiceStatusRequest>,
) -> ApiResult<invoice::Model> {
    viewer.require(Capability::UpdateInvoiceStatus)?;
    let updated = state.services.invoices.update_status(id, payload).await?;
    Ok(Json(ApiResponse::success(updated)))
}
