mod common;

use axum::http::{header, Method, StatusCode};
use oms_portal::{auth::Role, services::customers::CreateCustomerRequest};
use rstest::rstest;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use common::{body_json, decimal, TestApp};

#[tokio::test]
async fn staff_order_total_is_sum_of_line_totals() {
    let app = TestApp::new().await;
    let shirt = app.seed_product("TEE-1", dec!(10.00), 50, false).await;
    let mug = app.seed_product("MUG-1", dec!(5.50), 50, false).await;

    let response = app
        .request_as(
            Role::Sales,
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "customer_id": app.customer.id,
                "items": [
                    { "product_id": shirt.id, "quantity": 2 },
                    { "product_id": mug.id, "quantity": 1 },
                ],
                "tax_amount": "2.00",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("location header");

    let body = body_json(response).await;
    let order = &body["data"]["order"];
    assert_eq!(decimal(&order["total_amount"]), dec!(25.50));
    assert_eq!(order["status"], "pending");
    assert!(order["order_number"].as_str().unwrap_or_default().starts_with("ORD-"));
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(2));

    let id = order["id"].as_str().expect("order id");
    assert_eq!(location, format!("/api/v1/orders/{id}"));
}

#[tokio::test]
async fn portal_order_without_items_returns_form_message() {
    let app = TestApp::new().await;
    let response = app
        .request_as(
            Role::Client,
            Method::POST,
            "/api/v1/portal/orders",
            Some(json!({
                "items": [],
                "payment_method": "upi",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Please add at least one item to your order");
}

#[tokio::test]
async fn portal_order_quotes_shipping_separately() {
    let app = TestApp::new().await;
    let shirt = app.seed_product("TEE-2", dec!(12.00), 50, false).await;

    let response = app
        .request_as(
            Role::Client,
            Method::POST,
            "/api/v1/portal/orders",
            Some(json!({
                "items": [{ "product_id": shirt.id, "quantity": 3 }],
                "shipping_method": "express",
                "payment_method": "neft",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let order = &body["data"]["order"];
    assert_eq!(decimal(&order["total_amount"]), dec!(36.00));
    assert_eq!(decimal(&order["shipping_amount"]), dec!(15.00));
    assert_eq!(order["customer_id"], json!(app.customer.id));
}

#[tokio::test]
async fn unlinked_client_cannot_place_orders() {
    let app = TestApp::new().await;
    let shirt = app.seed_product("TEE-3", dec!(12.00), 50, false).await;
    let response = app
        .request(
            Method::POST,
            "/api/v1/portal/orders",
            Some(json!({
                "items": [{ "product_id": shirt.id, "quantity": 1 }],
                "payment_method": "cheque",
            })),
            Some(app.unlinked_client_token()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn clients_only_see_their_own_orders() {
    let app = TestApp::new().await;
    let shirt = app.seed_product("TEE-4", dec!(9.00), 50, false).await;
    let other = app
        .state
        .services
        .customers
        .create(CreateCustomerRequest {
            company_name: "Globex".to_string(),
            contact_name: "Sam Ortiz".to_string(),
            email: None,
            phone: None,
            address_line1: None,
            address_line2: None,
            city: None,
            state: None,
            postal_code: None,
            country: None,
        })
        .await
        .expect("second customer");

    let foreign = app
        .request_as(
            Role::Admin,
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "customer_id": other.id,
                "items": [{ "product_id": shirt.id, "quantity": 1 }],
            })),
        )
        .await;
    assert_eq!(foreign.status(), StatusCode::CREATED);
    let foreign_id = body_json(foreign).await["data"]["order"]["id"]
        .as_str()
        .expect("order id")
        .to_string();

    let own = app
        .request_as(
            Role::Client,
            Method::POST,
            "/api/v1/portal/orders",
            Some(json!({
                "items": [{ "product_id": shirt.id, "quantity": 1 }],
                "payment_method": "razorpay",
            })),
        )
        .await;
    assert_eq!(own.status(), StatusCode::CREATED);

    let list = app
        .request_as(Role::Client, Method::GET, "/api/v1/orders", None)
        .await;
    assert_eq!(list.status(), StatusCode::OK);
    let list = body_json(list).await;
    let rows = list["data"]["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["order"]["customer_id"], json!(app.customer.id));

    let hidden = app
        .request_as(
            Role::Client,
            Method::GET,
            &format!("/api/v1/orders/{foreign_id}"),
            None,
        )
        .await;
    assert_eq!(hidden.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_status_is_rejected() {
    let app = TestApp::new().await;
    let shirt = app.seed_product("TEE-5", dec!(9.00), 50, false).await;
    let created = app
        .request_as(
            Role::Admin,
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "customer_id": app.customer.id,
                "items": [{ "product_id": shirt.id, "quantity": 1 }],
            })),
        )
        .await;
    let id = body_json(created).await["data"]["order"]["id"]
        .as_str()
        .expect("order id")
        .to_string();

    let response = app
        .request_as(
            Role::Ops,
            Method::PUT,
            &format!("/api/v1/orders/{id}/status"),
            Some(json!({ "status": "teleported" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[case(json!({ "unit_price": "79228162514264337593543950335", "quantity": 2 }), json!({}))]
#[case(json!({ "quantity": 1 }), json!({ "tax_amount": "-2.00" }))]
#[case(json!({ "quantity": 1 }), json!({ "discount_amount": "-0.01" }))]
#[tokio::test]
async fn out_of_range_amounts_are_rejected(#[case] line: Value, #[case] amounts: Value) {
    let app = TestApp::new().await;
    let shirt = app.seed_product("TEE-6", dec!(9.00), 50, false).await;

    let mut item = line;
    item["product_id"] = json!(shirt.id);
    let mut body = json!({
        "customer_id": app.customer.id,
        "items": [item],
    });
    if let (Some(body), Some(extra)) = (body.as_object_mut(), amounts.as_object()) {
        body.extend(extra.clone());
    }

    let response = app
        .request_as(Role::Sales, Method::POST, "/api/v1/orders", Some(body))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let list = app
        .request_as(Role::Sales, Method::GET, "/api/v1/orders", None)
        .await;
    let rows = body_json(list).await["data"]["data"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    assert!(rows.is_empty());
}
