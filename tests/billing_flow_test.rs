mod common;

use axum::http::{Method, StatusCode};
use oms_portal::auth::Role;
use rust_decimal_macros::dec;
use serde_json::json;

use common::{body_json, decimal, TestApp};

async fn staff_order(app: &TestApp, sku: &str) -> String {
    let product = app.seed_product(sku, dec!(20.00), 100, false).await;
    let response = app
        .request_as(
            Role::Sales,
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "customer_id": app.customer.id,
                "items": [{ "product_id": product.id, "quantity": 5 }],
                "tax_amount": "8.00",
                "shipping_amount": "12.00",
                "discount_amount": "10.00",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["order"]["id"]
        .as_str()
        .expect("order id")
        .to_string()
}

#[tokio::test]
async fn invoice_due_date_follows_payment_terms() {
    let app = TestApp::new().await;
    let order_id = staff_order(&app, "INV-A").await;

    let response = app
        .request_as(
            Role::Finance,
            Method::POST,
            "/api/v1/invoices",
            Some(json!({
                "order_id": order_id,
                "payment_terms": "Net 30",
                "issue_date": "2026-01-15",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let invoice = body_json(response).await["data"].clone();

    assert_eq!(invoice["due_date"], "2026-02-14");
    assert_eq!(invoice["payment_terms"], "Net 30");
    assert_eq!(invoice["status"], "draft");
    assert!(invoice["invoice_number"]
        .as_str()
        .unwrap_or_default()
        .starts_with("INV-"));
}

#[tokio::test]
async fn generated_invoice_copies_the_order_total() {
    let app = TestApp::new().await;
    let order_id = staff_order(&app, "INV-F").await;

    let order = app
        .request_as(Role::Finance, Method::GET, &format!("/api/v1/orders/{order_id}"), None)
        .await;
    assert_eq!(order.status(), StatusCode::OK);
    let order_total = decimal(&body_json(order).await["data"]["data"]["order"]["total_amount"]);
    assert_eq!(order_total, dec!(100.00));

    let generated = app
        .request_as(
            Role::Finance,
            Method::POST,
            "/api/v1/rpc/generate_invoice_from_order",
            Some(json!({ "order_id": order_id })),
        )
        .await;
    assert_eq!(generated.status(), StatusCode::CREATED);
    let invoice = body_json(generated).await["data"].clone();

    assert_eq!(decimal(&invoice["total_amount"]), order_total);
    assert_eq!(decimal(&invoice["tax_amount"]), dec!(8.00));
    assert_eq!(decimal(&invoice["shipping_amount"]), dec!(12.00));
    assert_eq!(decimal(&invoice["discount_amount"]), dec!(10.00));
    // 100 - 8 - 12 + 10
    assert_eq!(decimal(&invoice["subtotal"]), dec!(90.00));
}

#[tokio::test]
async fn an_order_is_invoiced_once() {
    let app = TestApp::new().await;
    let order_id = staff_order(&app, "INV-B").await;

    let first = app
        .request_as(
            Role::Finance,
            Method::POST,
            "/api/v1/rpc/generate_invoice_from_order",
            Some(json!({ "order_id": order_id })),
        )
        .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .request_as(
            Role::Finance,
            Method::POST,
            "/api/v1/invoices",
            Some(json!({ "order_id": order_id })),
        )
        .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_terms_are_rejected() {
    let app = TestApp::new().await;
    let order_id = staff_order(&app, "INV-C").await;
    let response = app
        .request_as(
            Role::Finance,
            Method::POST,
            "/api/v1/invoices",
            Some(json!({ "order_id": order_id, "payment_terms": "Net 999" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn billing_summary_tracks_overdue_and_paid_invoices() {
    let app = TestApp::new().await;
    let order_id = staff_order(&app, "INV-D").await;

    let created = app
        .request_as(
            Role::Finance,
            Method::POST,
            "/api/v1/invoices",
            Some(json!({
                "order_id": order_id,
                "payment_terms": "Net 15",
                "issue_date": "2020-01-01",
            })),
        )
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let invoice_id = body_json(created).await["data"]["id"]
        .as_str()
        .expect("invoice id")
        .to_string();

    let billing = app
        .request_as(Role::Finance, Method::GET, "/api/v1/billing", None)
        .await;
    assert_eq!(billing.status(), StatusCode::OK);
    let summary = body_json(billing).await["data"]["data"]["summary"].clone();
    assert_eq!(summary["overdue_count"], 1);
    assert_eq!(decimal(&summary["outstanding"]), dec!(100.00));
    assert_eq!(summary["collected_share"], "0.0%");

    let payment = app
        .request_as(
            Role::Finance,
            Method::POST,
            "/api/v1/payments",
            Some(json!({
                "invoice_id": invoice_id,
                "amount": "100.00",
                "payment_method": "neft",
                "transaction_id": "UTR-0001",
            })),
        )
        .await;
    assert_eq!(payment.status(), StatusCode::CREATED);

    let paid = app
        .request_as(
            Role::Finance,
            Method::PUT,
            &format!("/api/v1/invoices/{invoice_id}/status"),
            Some(json!({ "status": "paid" })),
        )
        .await;
    assert_eq!(paid.status(), StatusCode::OK);

    let billing = app
        .request_as(Role::Finance, Method::GET, "/api/v1/billing", None)
        .await;
    let view = body_json(billing).await["data"]["data"].clone();
    assert_eq!(view["summary"]["overdue_count"], 0);
    assert_eq!(decimal(&view["summary"]["total_paid"]), dec!(100.00));
    assert_eq!(view["summary"]["collected_share"], "100.0%");
    assert_eq!(view["recent_payments"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn clients_see_only_their_invoices() {
    let app = TestApp::new().await;
    let order_id = staff_order(&app, "INV-E").await;
    let created = app
        .request_as(
            Role::Finance,
            Method::POST,
            "/api/v1/invoices",
            Some(json!({ "order_id": order_id })),
        )
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);

    let list = app
        .request_as(Role::Client, Method::GET, "/api/v1/invoices", None)
        .await;
    assert_eq!(list.status(), StatusCode::OK);
    let rows = body_json(list).await["data"]["data"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["invoice"]["customer_id"], json!(app.customer.id));
}
