use axum::{extract::State, Json};

use crate::{
    aggregates::MonthlyRevenue,
    auth::Viewer,
    handlers::common::Page,
    services::analytics::AnalyticsView,
    ApiResponse, ApiResult, AppState,
};

#[utoipa::path(
    get,
    path = "/api/v1/analytics",
    responses(
        (status = 200, description = "Key metrics, monthly revenue, top customers and stock alerts", body = ApiResponse<Page<AnalyticsView>>),
        (status = 303, description = "Not signed in or section not permitted"),
    ),
    security(("Bearer" = [])),
    tag = "analytics"
)]
pub async fn analytics_overview(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Page<AnalyticsView>> {
    let view = state.services.analytics.snapshot().await?;
    Ok(Json(ApiResponse::success(Page::new(&viewer, &[], view))))
}

/// Remote procedure: revenue per month of order date, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/rpc/get_monthly_revenue",
    responses(
        (status = 200, description = "Revenue and order count per month", body = ApiResponse<Vec<MonthlyRevenue>>),
        (status = 303, description = "Not signed in or section not permitted"),
    ),
    security(("Bearer" = [])),
    tag = "analytics"
)]
pub async fn monthly_revenue(State(state): State<AppState>) -> ApiResult<Vec<MonthlyRevenue>> {
    let months = state.services.analytics.monthly_revenue().await?;
    Ok(Json(ApiResponse::success(months)))
}
