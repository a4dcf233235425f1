use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::{navigation_for, Capability, Navigation, Viewer},
    ApiResponse, API_PREFIX,
};

/// View model of one page: the caller's navigation shell, the actions they
/// may take on the page, and the page data.
#[derive(Debug, Serialize, ToSchema)]
pub struct Page<T> {
    pub navigation: Navigation,
    pub actions: Vec<Capability>,
    pub data: T,
}

impl<T> Page<T> {
    pub fn new(viewer: &Viewer, wanted: &[Capability], data: T) -> Self {
        Self {
            navigation: navigation_for(viewer.role),
            actions: viewer.actions(wanted),
            data,
        }
    }
}

/// Absolute path of a record's detail view.
pub fn detail_path(collection: &str, id: impl std::fmt::Display) -> String {
    format!("{API_PREFIX}/{collection}/{id}")
}

/// `201 Created` pointing at the new record's detail view
pub fn created_response<T: Serialize>(location: String, data: T) -> Response {
    (
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ApiResponse::success(data)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn detail_paths_sit_under_the_api_prefix() {
        let id = Uuid::nil();
        assert_eq!(
            detail_path("orders", id),
            "/api/v1/orders/00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn created_response_sets_location() {
        let response = created_response("/api/v1/orders/1".to_string(), "ok");
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/api/v1/orders/1"
        );
    }
}
