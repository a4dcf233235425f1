use axum::{extract::State, Json};

use crate::{
    auth::{Capability, Viewer},
    handlers::common::Page,
    services::analytics::BillingView,
    ApiResponse, ApiResult, AppState,
};

#[utoipa::path(
    get,
    path = "/api/v1/billing",
    responses(
        (status = 200, description = "Invoiced, paid, outstanding and overdue figures", body = ApiResponse<Page<BillingView>>),
        (status = 303, description = "Not signed in or section not permitted"),
    ),
    security(("Bearer" = [])),
    tag = "billing"
)]
pub async fn billing_overview(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Page<BillingView>> {
    let view = state
        .services
        .analytics
        .billing(state.config.recent_activity_limit)
        .await?;
    Ok(Json(ApiResponse::success(Page::new(
        &viewer,
        &[Capability::CreateInvoice, Capability::RecordPayment],
        view,
    ))))
}
