//! Order management and client portal backend
//!
//! Staff and client accounts share one API. Every route under `/api/v1`
//! except sign-in resolves a [`auth::Viewer`], and each page family is
//! gated by the [`auth::Section`] it belongs to.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod aggregates;
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod lifecycle;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::ToSchema;

use crate::auth::{AuthConfig, AuthRouterExt, AuthService, Section};
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::handlers::AppServices;

/// Prefix shared by every versioned route
pub const API_PREFIX: &str = "/api/v1";

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: AppConfig,
    pub auth: Arc<AuthService>,
    pub services: AppServices,
}

impl AppState {
    pub fn new(db: Arc<DbPool>, config: AppConfig) -> Self {
        let auth = Arc::new(AuthService::new(AuthConfig::from_app_config(&config)));
        let services = AppServices::new(db.clone(), &config, auth.clone());
        Self {
            db,
            config,
            auth,
            services,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Routes reachable without a session.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/auth/login",
            get(handlers::auth::login_page).post(handlers::auth::login),
        )
        .route("/auth/register", post(handlers::auth::register))
        .route("/status", get(api_status))
}

/// Authenticated routes, each family behind its section.
fn section_routes() -> Router<AppState> {
    use handlers::{
        analytics, billing, customers, customizations, dashboard, fulfillment, inventory,
        invoices, orders, payments, portal, products, shipments, support,
    };

    let account = Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route("/navigation", get(handlers::auth::navigation));

    let dashboard = Router::new()
        .route("/dashboard", get(dashboard::dashboard))
        .require_section(Section::Dashboard);

    let orders = Router::new()
        .route("/orders", get(orders::list_orders).post(orders::create_order))
        .route("/orders/new", get(orders::new_order_form))
        .route("/orders/:id", get(orders::get_order).put(orders::update_order))
        .route("/orders/:id/status", put(orders::update_order_status))
        .route("/portal/orders", post(portal::place_order))
        .route("/portal/orders/new", get(portal::place_order_form))
        .require_section(Section::Orders);

    let customers = Router::new()
        .route(
            "/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route("/customers/:id", get(customers::get_customer))
        .route(
            "/customers/:id/portal-profile",
            post(customers::link_portal_profile),
        )
        .require_section(Section::Customers);

    let products = Router::new()
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route("/products/:id", get(products::get_product))
        .require_section(Section::Products);

    let inventory = Router::new()
        .route("/inventory", get(inventory::inventory_overview))
        .route("/inventory/movements", post(inventory::record_movement))
        .require_section(Section::Inventory);

    let fulfillment = Router::new()
        .route("/fulfillment", get(fulfillment::list_tasks))
        .route("/fulfillment/tasks", post(fulfillment::create_task))
        .route(
            "/fulfillment/tasks/:id/status",
            put(fulfillment::update_task_status),
        )
        .require_section(Section::Fulfillment);

    let shipping = Router::new()
        .route(
            "/shipping",
            get(shipments::list_shipments).post(shipments::create_shipment),
        )
        .route("/shipping/new", get(shipments::new_shipment_form))
        .route("/shipping/:id", get(shipments::get_shipment))
        .route("/shipping/:id/status", put(shipments::update_shipment_status))
        .require_section(Section::Shipping);

    let billing = Router::new()
        .route("/billing", get(billing::billing_overview))
        .require_section(Section::Billing);

    let invoices = Router::new()
        .route(
            "/invoices",
            get(invoices::list_invoices).post(invoices::create_invoice),
        )
        .route("/invoices/new", get(invoices::new_invoice_form))
        .route("/invoices/:id", get(invoices::get_invoice))
        .route("/invoices/:id/status", put(invoices::update_invoice_status))
        .route(
            "/rpc/generate_invoice_from_order",
            post(invoices::generate_invoice_from_order),
        )
        .require_section(Section::Invoices);

    let payments = Router::new()
        .route(
            "/payments",
            get(payments::list_payments).post(payments::record_payment),
        )
        .require_section(Section::Payments);

    let customizations = Router::new()
        .route(
            "/customizations",
            get(customizations::list_customizations).post(customizations::create_customization),
        )
        .route(
            "/customizations/new",
            get(customizations::new_customization_form),
        )
        .route("/customizations/:id", get(customizations::get_customization))
        .route(
            "/customizations/:id/review",
            put(customizations::review_customization),
        )
        .route(
            "/customizations/:id/comments",
            post(customizations::add_comment),
        )
        .route(
            "/customizations/steps/:id",
            put(customizations::update_workflow_step),
        )
        .require_section(Section::Customizations);

    let analytics = Router::new()
        .route("/analytics", get(analytics::analytics_overview))
        .route("/rpc/get_monthly_revenue", get(analytics::monthly_revenue))
        .require_section(Section::Analytics);

    let support = Router::new()
        .route("/support", get(support::support))
        .require_section(Section::Support);

    Router::new()
        .merge(account)
        .merge(dashboard)
        .merge(orders)
        .merge(customers)
        .merge(products)
        .merge(inventory)
        .merge(fulfillment)
        .merge(shipping)
        .merge(billing)
        .merge(invoices)
        .merge(payments)
        .merge(customizations)
        .merge(analytics)
        .merge(support)
}

/// Everything under `/api/v1`. Section guards run after authentication.
pub fn api_v1_routes(state: AppState) -> Router<AppState> {
    public_routes().merge(section_routes().with_auth(state))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins()
        .iter()
        .filter_map(|origin| origin.parse::<http::HeaderValue>().ok())
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

/// Full application: API, health probes, docs and the HTTP layers.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .nest(API_PREFIX, api_v1_routes(state.clone()))
        .nest("/health", health::health_routes())
        .merge(openapi::swagger_routes())
        .layer(cors)
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}

async fn api_status() -> Json<ApiResponse<Value>> {
    Json(ApiResponse::success(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_has_no_data() {
        let response = ApiResponse::<()>::error("oops".into());
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.message.as_deref(), Some("oops"));
    }

    #[test]
    fn validation_errors_carry_every_message() {
        let response = ApiResponse::<()>::validation_errors(vec!["a".into(), "b".into()]);
        assert_eq!(response.errors.map(|e| e.len()), Some(2));
    }
}
