use axum::{extract::State, Json};

use crate::{
    auth::{Capability, Viewer},
    handlers::common::Page,
    services::analytics::DashboardView,
    ApiResponse, ApiResult, AppState,
};

const DASHBOARD_ACTIONS: [Capability; 3] = [
    Capability::CreateOrder,
    Capability::PlaceOrder,
    Capability::RequestCustomization,
];

#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard cards and recent orders", body = ApiResponse<Page<DashboardView>>),
        (status = 303, description = "Not signed in"),
    ),
    security(("Bearer" = [])),
    tag = "dashboard"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Page<DashboardView>> {
    let view = state
        .services
        .analytics
        .dashboard(&viewer, state.config.recent_activity_limit)
        .await?;
    Ok(Json(ApiResponse::success(Page::new(&viewer, &DASHBOARD_ACTIONS, view))))
}
