mod common;

use axum::http::{Method, StatusCode};
use futures::future::join_all;
use oms_portal::{
    auth::Role,
    entities::{inventory_transaction, product},
    lifecycle::InventoryMovement,
    services::inventory::RecordMovementRequest,
};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::json;
use uuid::Uuid;

use common::{body_json, TestApp};

async fn ledger_sum(app: &TestApp, product_id: Uuid) -> i32 {
    inventory_transaction::Entity::find()
        .filter(inventory_transaction::Column::ProductId.eq(product_id))
        .all(&*app.state.db)
        .await
        .expect("ledger rows")
        .iter()
        .map(|row| row.quantity_delta)
        .sum()
}

async fn stock(app: &TestApp, product_id: Uuid) -> i32 {
    product::Entity::find_by_id(product_id)
        .one(&*app.state.db)
        .await
        .expect("product lookup")
        .expect("product exists")
        .stock_quantity
}

fn movement(product_id: Uuid, kind: InventoryMovement, quantity: i32) -> RecordMovementRequest {
    RecordMovementRequest {
        product_id,
        transaction_type: kind,
        quantity,
        notes: None,
    }
}

#[tokio::test]
async fn opening_stock_is_a_ledger_entry() {
    let app = TestApp::new().await;
    let product = app.seed_product("LED-1", dec!(3.00), 25, false).await;

    assert_eq!(product.stock_quantity, 25);
    assert_eq!(ledger_sum(&app, product.id).await, 25);
}

#[tokio::test]
async fn concurrent_movements_keep_the_ledger_consistent() {
    let app = TestApp::new().await;
    let product = app.seed_product("LED-2", dec!(3.00), 10, false).await;
    let inventory = app.state.services.inventory.clone();
    let product_id = product.id;

    let tasks = (0..12).map(|i| {
        let inventory = inventory.clone();
        let kind = if i % 3 == 0 {
            InventoryMovement::In
        } else {
            InventoryMovement::Out
        };
        tokio::spawn(async move {
            inventory
                .record_movement(movement(product_id, kind, 4), None)
                .await
        })
    });

    for joined in join_all(tasks).await {
        let entry = joined.expect("task joins").expect("movement booked");
        assert!(entry.resulting_level >= 0);
    }

    let level = stock(&app, product.id).await;
    assert!(level >= 0);
    assert_eq!(ledger_sum(&app, product.id).await, level);
}

#[tokio::test]
async fn outbound_stops_at_zero() {
    let app = TestApp::new().await;
    let product = app.seed_product("LED-3", dec!(3.00), 3, false).await;

    let entry = app
        .state
        .services
        .inventory
        .record_movement(movement(product.id, InventoryMovement::Out, 10), None)
        .await
        .expect("movement booked");

    assert_eq!(entry.quantity, 10);
    assert_eq!(entry.quantity_delta, -3);
    assert_eq!(entry.resulting_level, 0);
    assert_eq!(stock(&app, product.id).await, 0);
}

#[tokio::test]
async fn adjustment_sets_an_absolute_level() {
    let app = TestApp::new().await;
    let product = app.seed_product("LED-4", dec!(3.00), 30, false).await;

    let response = app
        .request_as(
            Role::Ops,
            Method::POST,
            "/api/v1/inventory/movements",
            Some(json!({
                "product_id": product.id,
                "transaction_type": "adjustment",
                "quantity": 12,
                "notes": "Cycle count",
            })),
        )
        .await;
    assert!(response.status().is_success());

    assert_eq!(stock(&app, product.id).await, 12);
    assert_eq!(ledger_sum(&app, product.id).await, 12);
}

#[tokio::test]
async fn only_stock_keepers_record_movements() {
    let app = TestApp::new().await;
    let product = app.seed_product("LED-5", dec!(3.00), 30, false).await;

    let response = app
        .request_as(
            Role::Finance,
            Method::POST,
            "/api/v1/inventory/movements",
            Some(json!({
                "product_id": product.id,
                "transaction_type": "in",
                "quantity": 5,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(stock(&app, product.id).await, 30);
}

#[tokio::test]
async fn fulfillment_queue_runs_by_priority() {
    let app = TestApp::new().await;
    let product = app.seed_product("LED-6", dec!(3.00), 30, false).await;
    let created = app
        .request_as(
            Role::Admin,
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "customer_id": app.customer.id,
                "items": [{ "product_id": product.id, "quantity": 1 }],
            })),
        )
        .await;
    let order_id = body_json(created).await["data"]["order"]["id"]
        .as_str()
        .expect("order id")
        .to_string();

    for (task_type, priority) in [("pack", 7), ("pick", 1), ("label", 4)] {
        let response = app
            .request_as(
                Role::Ops,
                Method::POST,
                "/api/v1/fulfillment/tasks",
                Some(json!({
                    "order_id": order_id,
                    "task_type": task_type,
                    "priority": priority,
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let queue = app
        .request_as(Role::Ops, Method::GET, "/api/v1/fulfillment", None)
        .await;
    assert_eq!(queue.status(), StatusCode::OK);
    let rows = body_json(queue).await["data"]["data"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    let order: Vec<_> = rows
        .iter()
        .map(|r| r["task"]["task_type"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(order, ["pick", "label", "pack"]);
}
