use axum::{extract::State, response::Response, Json};
use serde::Serialize;
use serde_json::{json, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::{navigation_for, Navigation, Role, Viewer},
    errors::ServiceError,
    handlers::common::created_response,
    services::profiles::{LoginRequest, LoginResponse, RegisterRequest},
    ApiResponse, ApiResult, AppState, API_PREFIX,
};

/// Signed-in caller with avatar initials and navigation
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub customer_id: Option<Uuid>,
    pub initials: String,
    pub navigation: Navigation,
}

impl From<&Viewer> for MeResponse {
    fn from(viewer: &Viewer) -> Self {
        Self {
            id: viewer.profile_id,
            email: viewer.email.clone(),
            full_name: viewer.full_name.clone(),
            role: viewer.role,
            customer_id: viewer.customer_id,
            initials: viewer.initials(),
            navigation: navigation_for(viewer.role),
        }
    }
}

/// Landing target for unauthenticated redirects
#[utoipa::path(
    get,
    path = "/api/v1/auth/login",
    responses((status = 200, description = "Sign-in instructions")),
    tag = "auth"
)]
pub async fn login_page() -> Json<ApiResponse<Value>> {
    Json(ApiResponse::success(json!({
        "message": "Sign in to continue",
        "login": format!("{API_PREFIX}/auth/login"),
        "register": format!("{API_PREFIX}/auth/register"),
        "fields": ["email", "password"],
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Profile created"),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, ServiceError> {
    let profile = state.services.profiles.register(payload).await?;
    Ok(created_response(format!("{API_PREFIX}/auth/me"), profile))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session token issued", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let session = state.services.profiles.login(payload).await?;
    Ok(Json(ApiResponse::success(session)))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current profile", body = ApiResponse<MeResponse>),
        (status = 303, description = "Not signed in"),
    ),
    security(("Bearer" = [])),
    tag = "auth"
)]
pub async fn me(viewer: Viewer) -> ApiResult<MeResponse> {
    Ok(Json(ApiResponse::success(MeResponse::from(&viewer))))
}

/// Navigation shell for the caller's role
#[utoipa::path(
    get,
    path = "/api/v1/navigation",
    responses((status = 200, description = "Navigation entries", body = ApiResponse<Navigation>)),
    security(("Bearer" = [])),
    tag = "auth"
)]
pub async fn navigation(viewer: Viewer) -> ApiResult<Navigation> {
    Ok(Json(ApiResponse::success(navigation_for(viewer.role))))
}
