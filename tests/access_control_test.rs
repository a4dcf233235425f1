mod common;

use axum::http::{header, Method, StatusCode};
use oms_portal::auth::Role;
use rstest::rstest;

use common::{body_json, TestApp};

fn location(response: &axum::response::Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn anonymous_requests_redirect_to_login() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/dashboard", None, None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/api/v1/auth/login"));

    let response = app
        .request(Method::GET, "/api/v1/orders", None, Some("not-a-token"))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn login_page_is_public() {
    let app = TestApp::new().await;
    let response = app.request(Method::GET, "/api/v1/auth/login", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[rstest]
#[case(Role::Client, "/api/v1/inventory")]
#[case(Role::Client, "/api/v1/customers")]
#[case(Role::Client, "/api/v1/analytics")]
#[case(Role::Client, "/api/v1/fulfillment")]
#[case(Role::Sales, "/api/v1/inventory")]
#[case(Role::Finance, "/api/v1/customers")]
#[tokio::test]
async fn disallowed_sections_redirect_to_dashboard(#[case] role: Role, #[case] uri: &str) {
    let app = TestApp::new().await;
    let response = app.request_as(role, Method::GET, uri, None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER, "{role} -> {uri}");
    assert_eq!(location(&response), Some("/api/v1/dashboard"));
}

#[rstest]
#[case(Role::Admin, "/api/v1/analytics")]
#[case(Role::Ops, "/api/v1/inventory")]
#[case(Role::Finance, "/api/v1/billing")]
#[case(Role::Sales, "/api/v1/customers")]
#[case(Role::Client, "/api/v1/dashboard")]
#[case(Role::Client, "/api/v1/support")]
#[tokio::test]
async fn permitted_sections_render(#[case] role: Role, #[case] uri: &str) {
    let app = TestApp::new().await;
    let response = app.request_as(role, Method::GET, uri, None).await;
    assert_eq!(response.status(), StatusCode::OK, "{role} -> {uri}");
}

#[tokio::test]
async fn writes_without_capability_are_forbidden() {
    let app = TestApp::new().await;
    let response = app
        .request_as(
            Role::Finance,
            Method::POST,
            "/api/v1/orders",
            Some(serde_json::json!({
                "customer_id": app.customer.id,
                "items": [],
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn client_navigation_uses_portal_labels() {
    let app = TestApp::new().await;
    let response = app
        .request_as(Role::Client, Method::GET, "/api/v1/navigation", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let entries = body["data"]["entries"].as_array().cloned().unwrap_or_default();
    assert!(!entries.is_empty());
    let sections: Vec<_> = entries
        .iter()
        .filter_map(|e| e["section"].as_str())
        .collect();
    assert!(!sections.contains(&"inventory"));
    assert!(!sections.contains(&"analytics"));
}

#[tokio::test]
async fn login_issues_a_usable_token() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some(serde_json::json!({
                "email": "ops@portal.test",
                "password": "correct-horse-battery",
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let token = body["data"]["access_token"].as_str().expect("token").to_string();

    let me = app.request(Method::GET, "/api/v1/auth/me", None, Some(&token)).await;
    assert_eq!(me.status(), StatusCode::OK);
    let me = body_json(me).await;
    assert_eq!(me["data"]["role"], "ops");
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some(serde_json::json!({
                "email": "ops@portal.test",
                "password": "wrong-password",
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
