mod common;

use axum::http::{Method, StatusCode};
use oms_portal::auth::Role;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use common::{body_json, TestApp};

/// Places a portal order for one customizable product and returns the line id.
async fn customizable_line(app: &TestApp) -> String {
    let hoodie = app.seed_product("HOOD-1", dec!(40.00), 20, true).await;
    let placed = app
        .request_as(
            Role::Client,
            Method::POST,
            "/api/v1/portal/orders",
            Some(json!({
                "items": [{ "product_id": hoodie.id, "quantity": 2 }],
                "payment_method": "upi",
            })),
        )
        .await;
    assert_eq!(placed.status(), StatusCode::CREATED);
    body_json(placed).await["data"]["items"][0]["id"]
        .as_str()
        .expect("order item id")
        .to_string()
}

async fn file_request(app: &TestApp, item_id: &str) -> String {
    file_request_as(app, Role::Client, item_id).await
}

async fn file_request_as(app: &TestApp, role: Role, item_id: &str) -> String {
    let response = app
        .request_as(
            role,
            Method::POST,
            "/api/v1/customizations",
            Some(json!({
                "order_item_id": item_id,
                "request_type": "embroidery",
                "title": "Logo on chest",
                "description": "Company logo, left chest, navy thread",
                "specifications": "{\"thread\": \"navy\"}",
                "priority": "high",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"]
        .as_str()
        .expect("request id")
        .to_string()
}

async fn detail(app: &TestApp, role: Role, id: &str) -> Value {
    let response = app
        .request_as(role, Method::GET, &format!("/api/v1/customizations/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["data"].clone()
}

#[tokio::test]
async fn new_request_gets_four_pending_steps_in_order() {
    let app = TestApp::new().await;
    let item_id = customizable_line(&app).await;

    let form = app
        .request_as(Role::Client, Method::GET, "/api/v1/customizations/new", None)
        .await;
    assert_eq!(form.status(), StatusCode::OK);
    let form = body_json(form).await;
    let eligible = form["data"]["data"]["items"].as_array().cloned().unwrap_or_default();
    assert!(eligible.iter().any(|i| i["order_item_id"] == json!(item_id)));

    let id = file_request(&app, &item_id).await;
    let view = detail(&app, Role::Client, &id).await;

    let steps = view["steps"].as_array().cloned().unwrap_or_default();
    let names: Vec<_> = steps
        .iter()
        .map(|s| s["step"]["step_name"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(
        names,
        ["Initial Review", "Design Phase", "Approval", "Production Setup"]
    );
    assert!(steps.iter().all(|s| s["step"]["status"] == "pending"));
    assert_eq!(view["request"]["status"], "pending");
    assert_eq!(view["request"]["specifications"]["thread"], "navy");
}

#[tokio::test]
async fn missing_fields_are_reported() {
    let app = TestApp::new().await;
    let item_id = customizable_line(&app).await;
    let response = app
        .request_as(
            Role::Client,
            Method::POST,
            "/api/v1/customizations",
            Some(json!({ "order_item_id": item_id, "title": "Only a title" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn internal_comments_stay_with_staff() {
    let app = TestApp::new().await;
    let item_id = customizable_line(&app).await;
    let id = file_request(&app, &item_id).await;
    let comments = format!("/api/v1/customizations/{id}/comments");

    let internal = app
        .request_as(
            Role::Ops,
            Method::POST,
            &comments,
            Some(json!({ "comment": "Check thread stock first", "is_internal": true })),
        )
        .await;
    assert_eq!(internal.status(), StatusCode::CREATED);

    let public = app
        .request_as(
            Role::Client,
            Method::POST,
            &comments,
            Some(json!({ "comment": "Please use the new logo" })),
        )
        .await;
    assert_eq!(public.status(), StatusCode::CREATED);

    let sneaky = app
        .request_as(
            Role::Client,
            Method::POST,
            &comments,
            Some(json!({ "comment": "hidden?", "is_internal": true })),
        )
        .await;
    assert_eq!(sneaky.status(), StatusCode::FORBIDDEN);

    let staff_view = detail(&app, Role::Ops, &id).await;
    assert_eq!(staff_view["comments"].as_array().map(Vec::len), Some(2));

    let client_view = detail(&app, Role::Client, &id).await;
    let seen = client_view["comments"].as_array().cloned().unwrap_or_default();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0]["comment"]["comment"], "Please use the new logo");
}

#[tokio::test]
async fn review_and_step_updates() {
    let app = TestApp::new().await;
    let item_id = customizable_line(&app).await;
    let id = file_request(&app, &item_id).await;

    let denied = app
        .request_as(
            Role::Client,
            Method::PUT,
            &format!("/api/v1/customizations/{id}/review"),
            Some(json!({ "status": "approved" })),
        )
        .await;
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let reviewed = app
        .request_as(
            Role::Ops,
            Method::PUT,
            &format!("/api/v1/customizations/{id}/review"),
            Some(json!({
                "status": "approved",
                "review_notes": "Looks good",
                "estimated_cost": "25.00",
                "estimated_days": 4,
            })),
        )
        .await;
    assert_eq!(reviewed.status(), StatusCode::OK);
    let reviewed = body_json(reviewed).await;
    assert_eq!(reviewed["data"]["status"], "approved");
    assert!(!reviewed["data"]["approved_at"].is_null());

    let view = detail(&app, Role::Ops, &id).await;
    let first_step = view["steps"][0]["step"]["id"].as_str().expect("step id").to_string();

    let done = app
        .request_as(
            Role::Ops,
            Method::PUT,
            &format!("/api/v1/customizations/steps/{first_step}"),
            Some(json!({ "status": "completed", "notes": "Reviewed" })),
        )
        .await;
    assert_eq!(done.status(), StatusCode::OK);
    let done = body_json(done).await;
    assert_eq!(done["data"]["status"], "completed");
    assert!(!done["data"]["completed_at"].is_null());
}

#[tokio::test]
async fn clients_cannot_touch_steps_of_requests_they_did_not_file() {
    let app = TestApp::new().await;
    let item_id = customizable_line(&app).await;
    let id = file_request_as(&app, Role::Admin, &item_id).await;

    let hidden = app
        .request_as(Role::Client, Method::GET, &format!("/api/v1/customizations/{id}"), None)
        .await;
    assert_eq!(hidden.status(), StatusCode::NOT_FOUND);

    let view = detail(&app, Role::Admin, &id).await;
    let step = view["steps"][0]["step"]["id"].as_str().expect("step id").to_string();

    let response = app
        .request_as(
            Role::Client,
            Method::PUT,
            &format!("/api/v1/customizations/steps/{step}"),
            Some(json!({ "status": "completed" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let view = detail(&app, Role::Admin, &id).await;
    assert_eq!(view["steps"][0]["step"]["status"], "pending");
}

#[tokio::test]
async fn status_only_step_update_keeps_notes() {
    let app = TestApp::new().await;
    let item_id = customizable_line(&app).await;
    let id = file_request(&app, &item_id).await;
    let view = detail(&app, Role::Ops, &id).await;
    let step = view["steps"][1]["step"]["id"].as_str().expect("step id").to_string();
    let uri = format!("/api/v1/customizations/steps/{step}");

    let started = app
        .request_as(
            Role::Ops,
            Method::PUT,
            &uri,
            Some(json!({ "status": "in_progress", "notes": "Mockup sent" })),
        )
        .await;
    assert_eq!(started.status(), StatusCode::OK);

    let done = app
        .request_as(Role::Ops, Method::PUT, &uri, Some(json!({ "status": "completed" })))
        .await;
    assert_eq!(done.status(), StatusCode::OK);
    let done = body_json(done).await;
    assert_eq!(done["data"]["status"], "completed");
    assert_eq!(done["data"]["notes"], "Mockup sent");
}
