use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::AppState;

/// Registers the bearer scheme referenced by `security(("Bearer" = []))`.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "Bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Order Management Portal API",
        version = "1.0.0",
        description = r#"
Back office and client portal for orders, inventory, invoicing, shipping and
product customization.

## Access

Sign in at `POST /api/v1/auth/login` and send the returned token as
`Authorization: Bearer <token>`. Requests without a valid session are
redirected (303) to the sign-in route. Signed-in users opening a section their
role does not include are redirected to the dashboard. Writes the role may not
perform return 403.

Client accounts only ever see rows belonging to their linked customer.
        "#,
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Sign-in, registration and the navigation shell"),
        (name = "dashboard", description = "Role-aware landing page"),
        (name = "orders", description = "Staff order entry and order pages"),
        (name = "portal", description = "Client self-service ordering"),
        (name = "customers", description = "Customer accounts and portal links"),
        (name = "products", description = "Product catalog"),
        (name = "inventory", description = "Stock levels and the movement ledger"),
        (name = "fulfillment", description = "Warehouse task queue"),
        (name = "shipping", description = "Shipments and carriers"),
        (name = "billing", description = "Receivables summary"),
        (name = "invoices", description = "Invoices and invoice generation"),
        (name = "payments", description = "Payments against invoices"),
        (name = "customizations", description = "Customization requests and their workflow"),
        (name = "analytics", description = "Business metrics"),
        (name = "support", description = "Help channels")
    ),
    paths(
        crate::handlers::auth::login_page,
        crate::handlers::auth::login,
        crate::handlers::auth::register,
        crate::handlers::auth::me,
        crate::handlers::auth::navigation,

        crate::handlers::dashboard::dashboard,

        crate::handlers::orders::list_orders,
        crate::handlers::orders::new_order_form,
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_order,
        crate::handlers::orders::update_order,
        crate::handlers::orders::update_order_status,
        crate::handlers::portal::place_order_form,
        crate::handlers::portal::place_order,

        crate::handlers::customers::list_customers,
        crate::handlers::customers::create_customer,
        crate::handlers::customers::get_customer,
        crate::handlers::customers::link_portal_profile,

        crate::handlers::products::list_products,
        crate::handlers::products::create_product,
        crate::handlers::products::get_product,

        crate::handlers::inventory::inventory_overview,
        crate::handlers::inventory::record_movement,

        crate::handlers::fulfillment::list_tasks,
        crate::handlers::fulfillment::create_task,
        crate::handlers::fulfillment::update_task_status,

        crate::handlers::shipments::list_shipments,
        crate::handlers::shipments::new_shipment_form,
        crate::handlers::shipments::create_shipment,
        crate::handlers::shipments::get_shipment,
        crate::handlers::shipments::update_shipment_status,

        crate::handlers::billing::billing_overview,

        crate::handlers::invoices::list_invoices,
        crate::handlers::invoices::new_invoice_form,
        crate::handlers::invoices::create_invoice,
        crate::handlers::invoices::generate_invoice_from_order,
        crate::handlers::invoices::get_invoice,
        crate::handlers::invoices::update_invoice_status,

        crate::handlers::payments::list_payments,
        crate::handlers::payments::record_payment,

        crate::handlers::customizations::list_customizations,
        crate::handlers::customizations::new_customization_form,
        crate::handlers::customizations::create_customization,
        crate::handlers::customizations::get_customization,
        crate::handlers::customizations::review_customization,
        crate::handlers::customizations::update_workflow_step,
        crate::handlers::customizations::add_comment,

        crate::handlers::analytics::analytics_overview,
        crate::handlers::analytics::monthly_revenue,

        crate::handlers::support::support,
    ),
    components(
        schemas(
            crate::auth::Role,
            crate::auth::Section,
            crate::auth::Capability,
            crate::lifecycle::Badge,
            crate::lifecycle::StatusView,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

pub fn swagger_routes() -> Router<AppState> {
    Router::new().merge(swagger_ui())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_section_routes() {
        let json = serde_json::to_string(&ApiDocV1::openapi()).expect("openapi serializes");
        assert!(json.contains("Order Management Portal API"));
        assert!(json.contains("/api/v1/orders"));
        assert!(json.contains("/api/v1/rpc/get_monthly_revenue"));
        assert!(json.contains("\"Bearer\""));
    }
}
