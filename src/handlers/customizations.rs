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
    entities::{customization_comment, customization_request, workflow_step},
    errors::ServiceError,
    handlers::common::{created_response, detail_path, Page},
    lifecycle::{Badged, Priority, StatusView},
    services::customizations::{
        AddCommentRequest, CreateCustomizationRequest, CustomizationDetail, CustomizationRow,
        EligibleItem, ReviewCustomizationRequest, UpdateStepRequest,
    },
    ApiResponse, ApiResult, AppState,
};

const DETAIL_ACTIONS: [Capability; 3] = [
    Capability::EditCustomization,
    Capability::UpdateWorkflowStep,
    Capability::CommentCustomization,
];

/// Request form: customizable order lines and priorities
#[derive(Debug, Serialize, ToSchema)]
pub struct CustomizationForm {
    pub items: Vec<EligibleItem>,
    pub priorities: Vec<StatusView>,
}

#[utoipa::path(
    get,
    path = "/api/v1/customizations",
    responses(
        (status = 200, description = "Requests visible to the caller, newest first", body = ApiResponse<Page<Vec<CustomizationRow>>>),
    ),
    security(("Bearer" = [])),
    tag = "customizations"
)]
pub async fn list_customizations(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Page<Vec<CustomizationRow>>> {
    let rows = state.services.customizations.list(&viewer).await?;
    Ok(Json(ApiResponse::success(Page::new(
        &viewer,
        &[Capability::RequestCustomization, Capability::EditCustomization],
        rows,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/customizations/new",
    responses(
        (status = 200, description = "Pending lines whose product is customizable", body = ApiResponse<Page<CustomizationForm>>),
        (status = 403, description = "Caller cannot request customizations", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "customizations"
)]
pub async fn new_customization_form(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Page<CustomizationForm>> {
    viewer.require(Capability::RequestCustomization)?;
    let items = state.services.customizations.eligible_items(&viewer).await?;
    let form = CustomizationForm {
        items,
        priorities: Priority::iter().map(Badged::view).collect(),
    };
    Ok(Json(ApiResponse::success(Page::new(
        &viewer,
        &[Capability::RequestCustomization],
        form,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/customizations",
    request_body = CreateCustomizationRequest,
    responses(
        (status = 201, description = "Request filed with its four workflow steps"),
        (status = 403, description = "Caller cannot request customizations", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order item not found", body = crate::errors::ErrorResponse),
        (status = 400, description = "Required fields missing", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "customizations"
)]
pub async fn create_customization(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(payload): Json<CreateCustomizationRequest>,
) -> Result<Response, ServiceError> {
    viewer.require(Capability::RequestCustomization)?;
    let request = state.services.customizations.create(payload, &viewer).await?;
    Ok(created_response(detail_path("customizations", request.id), request))
}

#[utoipa::path(
    get,
    path = "/api/v1/customizations/{id}",
    params(("id" = Uuid, Path, description = "Customization request id")),
    responses(
        (status = 200, description = "Request with item, steps and comments", body = ApiResponse<Page<CustomizationDetail>>),
        (status = 404, description = "Request not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "customizations"
)]
pub async fn get_customization(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
) -> ApiResult<Page<CustomizationDetail>> {
    let detail = state.services.customizations.detail(id, &viewer).await?;
    Ok(Json(ApiResponse::success(Page::new(&viewer, &DETAIL_ACTIONS, detail))))
}

#[utoipa::path(
    put,
    path = "/api/v1/customizations/{id}/review",
    params(("id" = Uuid, Path, description = "Customization request id")),
    request_body = ReviewCustomizationRequest,
    responses(
        (status = 200, description = "Review recorded"),
        (status = 403, description = "Caller cannot review customizations", body = crate::errors::ErrorResponse),
        (status = 404, description = "Request not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "customizations"
)]
pub async fn review_customization(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewCustomizationRequest>,
) -> ApiResult<customization_request::Model> {
    viewer.require(Capability::EditCustomization)?;
    let updated = state
        .services
        .customizations
        .review(id, payload, viewer.profile_id)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    put,
    path = "/api/v1/customizations/steps/{id}",
    params(("id" = Uuid, Path, description = "Workflow step id")),
    request_body = UpdateStepRequest,
    responses(
        (status = 200, description = "Step updated"),
        (status = 400, description = "Unknown status", body = crate::errors::ErrorResponse),
        (status = 404, description = "Step not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "customizations"
)]
pub async fn update_workflow_step(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStepRequest>,
) -> ApiResult<workflow_step::Model> {
    viewer.require(Capability::UpdateWorkflowStep)?;
    let updated = state
        .services
        .customizations
        .update_step(id, payload, &viewer)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    post,
    path = "/api/v1/customizations/{id}/comments",
    params(("id" = Uuid, Path, description = "Customization request id")),
    request_body = AddCommentRequest,
    responses(
        (status = 201, description = "Comment added"),
        (status = 403, description = "Clients cannot post internal comments", body = crate::errors::ErrorResponse),
        (status = 404, description = "Request not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "customizations"
)]
pub async fn add_comment(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddCommentRequest>,
) -> Result<Response, ServiceError> {
    viewer.require(Capability::CommentCustomization)?;
    let comment: customization_comment::Model = state
        .services
        .customizations
        .add_comment(id, payload, &viewer)
        .await?;
    Ok(created_response(detail_path("customizations", id), comment))
}
