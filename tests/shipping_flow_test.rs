mod common;

use axum::http::{Method, StatusCode};
use oms_portal::auth::Role;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use common::{body_json, TestApp};

async fn confirmed_order(app: &TestApp, sku: &str) -> String {
    let product = app.seed_product(sku, dec!(15.00), 40, false).await;
    let created = app
        .request_as(
            Role::Admin,
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "customer_id": app.customer.id,
                "items": [{ "product_id": product.id, "quantity": 4 }],
            })),
        )
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let id = body_json(created).await["data"]["order"]["id"]
        .as_str()
        .expect("order id")
        .to_string();

    let confirmed = app
        .request_as(
            Role::Ops,
            Method::PUT,
            &format!("/api/v1/orders/{id}/status"),
            Some(json!({ "status": "confirmed" })),
        )
        .await;
    assert_eq!(confirmed.status(), StatusCode::OK);
    id
}

async fn carrier(app: &TestApp, name: &str) -> Value {
    let form = app
        .request_as(Role::Ops, Method::GET, "/api/v1/shipping/new", None)
        .await;
    assert_eq!(form.status(), StatusCode::OK);
    body_json(form).await["data"]["data"]["carriers"]
        .as_array()
        .and_then(|all| all.iter().find(|c| c["name"] == name).cloned())
        .expect("seeded carrier")
}

#[tokio::test]
async fn tracking_number_marks_order_shipped() {
    let app = TestApp::new().await;
    let order_id = confirmed_order(&app, "SHIP-A").await;
    let ups = carrier(&app, "UPS").await;

    let shipped = app
        .request_as(
            Role::Ops,
            Method::POST,
            "/api/v1/shipping",
            Some(json!({
                "order_id": order_id,
                "carrier_id": ups["id"],
                "service_type": "ground",
                "tracking_number": "1Z999AA10123456784",
                "weight_lbs": "6.5",
            })),
        )
        .await;
    assert_eq!(shipped.status(), StatusCode::CREATED);
    let shipment = body_json(shipped).await["data"].clone();
    assert!(shipment["shipment_number"]
        .as_str()
        .unwrap_or_default()
        .starts_with("SHP-"));
    assert_eq!(shipment["status"], "pending");
    assert_eq!(shipment["ship_to_company"], "Acme Corp");

    let order = app
        .request_as(Role::Ops, Method::GET, &format!("/api/v1/orders/{order_id}"), None)
        .await;
    let order = body_json(order).await["data"]["data"].clone();
    assert_eq!(order["order"]["status"], "shipped");
    assert!(!order["order"]["shipped_date"].is_null());
    assert_eq!(order["shipments"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn shipment_without_tracking_leaves_order_alone() {
    let app = TestApp::new().await;
    let order_id = confirmed_order(&app, "SHIP-B").await;

    let created = app
        .request_as(
            Role::Ops,
            Method::POST,
            "/api/v1/shipping",
            Some(json!({ "order_id": order_id })),
        )
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);

    let order = app
        .request_as(Role::Ops, Method::GET, &format!("/api/v1/orders/{order_id}"), None)
        .await;
    assert_eq!(body_json(order).await["data"]["data"]["order"]["status"], "confirmed");
}

#[tokio::test]
async fn carrier_must_offer_the_service() {
    let app = TestApp::new().await;
    let order_id = confirmed_order(&app, "SHIP-C").await;
    let fedex = carrier(&app, "FedEx").await;

    let response = app
        .request_as(
            Role::Ops,
            Method::POST,
            "/api/v1/shipping",
            Some(json!({
                "order_id": order_id,
                "carrier_id": fedex["id"],
                "service_type": "2nd_day_air",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delivery_stamps_the_shipment() {
    let app = TestApp::new().await;
    let order_id = confirmed_order(&app, "SHIP-D").await;
    let created = app
        .request_as(
            Role::Ops,
            Method::POST,
            "/api/v1/shipping",
            Some(json!({ "order_id": order_id })),
        )
        .await;
    let shipment_id = body_json(created).await["data"]["id"]
        .as_str()
        .expect("shipment id")
        .to_string();

    let delivered = app
        .request_as(
            Role::Ops,
            Method::PUT,
            &format!("/api/v1/shipping/{shipment_id}/status"),
            Some(json!({ "status": "delivered" })),
        )
        .await;
    assert_eq!(delivered.status(), StatusCode::OK);
    let shipment = body_json(delivered).await["data"].clone();
    assert_eq!(shipment["status"], "delivered");
    assert!(!shipment["delivered_date"].is_null());
}

#[tokio::test]
async fn sales_cannot_create_shipments() {
    let app = TestApp::new().await;
    let order_id = confirmed_order(&app, "SHIP-E").await;
    let response = app
        .request_as(
            Role::Sales,
            Method::POST,
            "/api/v1/shipping",
            Some(json!({ "order_id": order_id })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
