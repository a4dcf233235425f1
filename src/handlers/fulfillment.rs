use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    auth::{Capability, Viewer},
    entities::fulfillment_task,
    errors::ServiceError,
    handlers::common::Page,
    services::fulfillment::{CreateTaskRequest, TaskRow, UpdateTaskStatusRequest},
    ApiResponse, ApiResult, AppState,
};

#[utoipa::path(
    get,
    path = "/api/v1/fulfillment",
    responses(
        (status = 200, description = "Task queue by priority, then age", body = ApiResponse<Page<Vec<TaskRow>>>),
        (status = 303, description = "Not signed in or section not permitted"),
    ),
    security(("Bearer" = [])),
    tag = "fulfillment"
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Page<Vec<TaskRow>>> {
    let rows = state.services.fulfillment.list().await?;
    Ok(Json(ApiResponse::success(Page::new(
        &viewer,
        &[Capability::ManageFulfillment],
        rows,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/fulfillment/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task queued"),
        (status = 403, description = "Caller cannot manage fulfillment", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "fulfillment"
)]
pub async fn create_task(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<ApiResponse<fulfillment_task::Model>>), ServiceError> {
    viewer.require(Capability::ManageFulfillment)?;
    let task = state.services.fulfillment.create_task(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(task))))
}

#[utoipa::path(
    put,
    path = "/api/v1/fulfillment/tasks/{id}/status",
    params(("id" = Uuid, Path, description = "Task id")),
    request_body = UpdateTaskStatusRequest,
    responses(
        (status = 200, description = "Status written"),
        (status = 400, description = "Unknown status", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller cannot manage fulfillment", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "fulfillment"
)]
pub async fn update_task_status(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTaskStatusRequest>,
) -> ApiResult<fulfillment_task::Model> {
    viewer.require(Capability::ManageFulfillment)?;
    let updated = state.services.fulfillment.update_status(id, payload).await?;
    Ok(Json(ApiResponse::success(updated)))
}
