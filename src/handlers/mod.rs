//! HTTP handlers, one module per page family.
//!
//! Page access is enforced by the router before a handler runs. Handlers only
//! check capabilities on writes and apply the caller's data scope on reads.

pub mod analytics;
pub mod auth;
pub mod billing;
pub mod common;
pub mod customers;
pub mod customizations;
pub mod dashboard;
pub mod fulfillment;
pub mod inventory;
pub mod invoices;
pub mod orders;
pub mod payments;
pub mod portal;
pub mod products;
pub mod shipments;
pub mod support;

use std::sync::Arc;

use crate::{
    auth::AuthService,
    config::AppConfig,
    db::DbPool,
    services::{
        analytics::AnalyticsService,
        customers::CustomerService,
        customizations::CustomizationService,
        fulfillment::FulfillmentService,
        inventory::InventoryService,
        invoicing::InvoiceService,
        orders::{OrderService, OrderSettings},
        payments::PaymentService,
        products::ProductService,
        profiles::ProfileService,
        shipments::ShipmentService,
    },
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer used by the HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub profiles: Arc<ProfileService>,
    pub customers: Arc<CustomerService>,
    pub products: Arc<ProductService>,
    pub inventory: Arc<InventoryService>,
    pub orders: Arc<OrderService>,
    pub invoices: Arc<InvoiceService>,
    pub payments: Arc<PaymentService>,
    pub shipments: Arc<ShipmentService>,
    pub customizations: Arc<CustomizationService>,
    pub fulfillment: Arc<FulfillmentService>,
    pub analytics: Arc<AnalyticsService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, config: &AppConfig, auth: Arc<AuthService>) -> Self {
        let orders = OrderService::new(db_pool.clone(), OrderSettings::from_app_config(config));

        Self {
            profiles: Arc::new(ProfileService::new(db_pool.clone(), auth)),
            customers: Arc::new(CustomerService::new(db_pool.clone())),
            products: Arc::new(ProductService::new(db_pool.clone())),
            inventory: Arc::new(InventoryService::new(db_pool.clone())),
            invoices: Arc::new(InvoiceService::new(
                db_pool.clone(),
                config.default_payment_terms.clone(),
            )),
            payments: Arc::new(PaymentService::new(db_pool.clone())),
            shipments: Arc::new(ShipmentService::new(db_pool.clone())),
            customizations: Arc::new(CustomizationService::new(db_pool.clone())),
            fulfillment: Arc::new(FulfillmentService::new(db_pool.clone())),
            analytics: Arc::new(AnalyticsService::new(db_pool, orders.clone())),
            orders: Arc::new(orders),
        }
    }
}
