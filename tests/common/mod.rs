#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    response::Response,
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use oms_portal::{
    auth::Role,
    config::AppConfig,
    db,
    entities::{customer, product},
    services::{customers::CreateCustomerRequest, products::CreateProductRequest},
    AppState,
};

/// Application over a private in-memory SQLite database with one signed-in
/// profile per role. The client profile is linked to `customer`.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub customer: customer::Model,
    admin: String,
    sales: String,
    ops: String,
    finance: String,
    client: String,
    unlinked_client: String,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "test_secret_key_for_portal_tests_only_32chars".to_string(),
            "test".to_string(),
        );
        // One shared connection keeps every query on the same in-memory database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = oms_portal::build_router(state.clone());

        let customer = state
            .services
            .customers
            .create(
                CreateCustomerRequest {
                    company_name: "Acme Corp".to_string(),
                    contact_name: "Jordan Lee".to_string(),
                    email: Some("buyer@acme.test".to_string()),
                    phone: None,
                    address_line1: Some("1 Main St".to_string()),
                    address_line2: None,
                    city: Some("Springfield".to_string()),
                    state: Some("IL".to_string()),
                    postal_code: Some("62701".to_string()),
                    country: Some("US".to_string()),
                },
            )
            .await
            .expect("seed customer");

        let admin = token_for(&state, "admin@portal.test", Role::Admin, None).await;
        let sales = token_for(&state, "sales@portal.test", Role::Sales, None).await;
        let ops = token_for(&state, "ops@portal.test", Role::Ops, None).await;
        let finance = token_for(&state, "finance@portal.test", Role::Finance, None).await;
        let client = token_for(&state, "client@acme.test", Role::Client, Some(customer.id)).await;
        let unlinked_client = token_for(&state, "walkin@portal.test", Role::Client, None).await;

        Self {
            router,
            state,
            customer,
            admin,
            sales,
            ops,
            finance,
            client,
            unlinked_client,
        }
    }

    pub fn token(&self, role: Role) -> &str {
        match role {
            Role::Admin => &self.admin,
            Role::Sales => &self.sales,
            Role::Ops => &self.ops,
            Role::Finance => &self.finance,
            Role::Client => &self.client,
        }
    }

    pub fn unlinked_client_token(&self) -> &str {
        &self.unlinked_client
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn request_as(
        &self,
        role: Role,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response {
        self.request(method, uri, body, Some(self.token(role))).await
    }

    pub async fn seed_product(&self, sku: &str, price: Decimal, stock: i32, customizable: bool) -> product::Model {
        self.state
            .services
            .products
            .create(
                CreateProductRequest {
                    name: format!("Product {sku}"),
                    sku: sku.to_string(),
                    base_price: price,
                    description: None,
                    category: Some("Apparel".to_string()),
                    is_customizable: customizable,
                    stock_quantity: stock,
                    min_stock_level: 5,
                    is_active: true,
                },
                None,
            )
            .await
            .expect("seed product")
    }
}

async fn token_for(state: &AppState, email: &str, role: Role, customer_id: Option<Uuid>) -> String {
    let profiles = &state.services.profiles;
    let profile = profiles
        .create_profile(email, "correct-horse-battery", Some(format!("{role} user")), role)
        .await
        .expect("seed profile");
    let profile = match customer_id {
        Some(customer_id) => profiles
            .link_customer(profile.id, customer_id)
            .await
            .expect("link client profile"),
        None => profile,
    };
    state
        .auth
        .issue_token(&profile)
        .expect("issue token")
        .access_token
}

/// Reads a JSON response body.
pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body is JSON")
}

/// Parses a decimal that serde wrote as a JSON string.
pub fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .or_else(|| value.as_f64().and_then(|f| Decimal::try_from(f).ok()))
        .unwrap_or_else(|| panic!("not a decimal: {value}"))
}
