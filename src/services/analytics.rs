use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use tracing::{debug, instrument};
use utoipa::ToSchema;

use crate::{
    aggregates::{
        analytics_summary, billing_summary, customer_stats, dashboard_stats, monthly_revenue,
        payment_methods, AnalyticsSummary, BillingSummary, CustomerStat, DashboardStats,
        MonthlyRevenue, PaymentMethodStat,
    },
    auth::{DataScope, Viewer},
    db::DbPool,
    entities::{customer, customization_request, invoice, order, payment, product},
    errors::ServiceError,
    lifecycle::{view_raw, PaymentStatus},
};

use super::{
    db_err,
    invoicing::InvoiceRow,
    orders::{OrderRow, OrderService},
    payments::PaymentRow,
};

const TOP_CUSTOMERS: usize = 5;
const LOW_STOCK_ROWS: usize = 10;
const RECENT_ORDERS: u64 = 5;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardView {
    pub stats: DashboardStats,
    pub recent_orders: Vec<OrderRow>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BillingView {
    pub summary: BillingSummary,
    pub recent_invoices: Vec<InvoiceRow>,
    pub recent_payments: Vec<PaymentRow>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnalyticsView {
    pub summary: AnalyticsSummary,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub top_customers: Vec<CustomerStat>,
    #[schema(value_type = Vec<Object>)]
    pub low_stock: Vec<product::Model>,
    pub recent_orders: Vec<OrderRow>,
    pub payment_methods: Vec<PaymentMethodStat>,
}

/// Read-only figures for the dashboard, billing and analytics pages.
#[derive(Clone)]
pub struct AnalyticsService {
    db_pool: Arc<DbPool>,
    orders: OrderService,
}

impl AnalyticsService {
    pub fn new(db_pool: Arc<DbPool>, orders: OrderService) -> Self {
        Self { db_pool, orders }
    }

    /// Dashboard cards. Clients get figures for their own account only.
    #[instrument(skip(self, viewer), fields(role = %viewer.role))]
    pub async fn dashboard(&self, viewer: &Viewer, recent_limit: u64) -> Result<DashboardView, ServiceError> {
        let db = &*self.db_pool;
        let scope = viewer.scope();

        let mut customizations = customization_request::Entity::find();
        if viewer.is_client() {
            customizations =
                customizations.filter(customization_request::Column::RequestedBy.eq(viewer.profile_id));
        }

        let (orders, recent_orders, customizations, customers, products) = tokio::try_join!(
            self.orders.models(scope),
            self.orders.recent(scope, recent_limit),
            async {
                customizations
                    .all(db)
                    .await
                    .map_err(db_err("Failed to load customizations for dashboard"))
            },
            async {
                customer::Entity::find()
                    .count(db)
                    .await
                    .map_err(db_err("Failed to count customers"))
            },
            async {
                product::Entity::find()
                    .count(db)
                    .await
                    .map_err(db_err("Failed to count products"))
            },
        )?;

        Ok(DashboardView {
            stats: dashboard_stats(&orders, &customizations, customers, products),
            recent_orders,
        })
    }

    /// Billing cards over every invoice plus the latest invoices and payments.
    #[instrument(skip(self))]
    pub async fn billing(&self, recent_limit: u64) -> Result<BillingView, ServiceError> {
        let db = &*self.db_pool;
        let (invoices, payments) = tokio::try_join!(
            invoice::Entity::find()
                .order_by_desc(invoice::Column::CreatedAt)
                .find_also_related(customer::Entity)
                .all(db),
            payment::Entity::find()
                .find_also_related(invoice::Entity)
                .order_by_desc(payment::Column::CreatedAt)
                .limit(recent_limit)
                .all(db),
        )
        .map_err(db_err("Failed to load billing data"))?;

        let today = Utc::now().date_naive();
        let models: Vec<invoice::Model> = invoices.iter().map(|(i, _)| i.clone()).collect();
        let recent_invoices = invoices
            .into_iter()
            .take(recent_limit as usize)
            .map(|(invoice, customer)| InvoiceRow {
                status: invoice.status_view(),
                past_due: invoice.is_past_due(today),
                company_name: customer.map(|c| c.company_name),
                invoice,
            })
            .collect();
        let recent_payments = payments
            .into_iter()
            .map(|(payment, invoice)| PaymentRow {
                status: view_raw::<PaymentStatus>(&payment.payment_status),
                invoice_number: invoice.map(|i| i.invoice_number),
                payment,
            })
            .collect();

        Ok(BillingView {
            summary: billing_summary(&models, today),
            recent_invoices,
            recent_payments,
        })
    }

    /// Fixed concurrent fan-out of the analytics reads, then reduced.
    #[instrument(skip(self))]
    pub async fn snapshot(&self) -> Result<AnalyticsView, ServiceError> {
        let db = &*self.db_pool;
        let everything = DataScope::Everything;

        let (orders, products, customers, payments, recent_orders) = tokio::try_join!(
            self.orders.models(everything),
            async {
                product::Entity::find()
                    .order_by_asc(product::Column::Name)
                    .all(db)
                    .await
                    .map_err(db_err("Failed to load products for analytics"))
            },
            async {
                customer::Entity::find()
                    .all(db)
                    .await
                    .map_err(db_err("Failed to load customers for analytics"))
            },
            async {
                payment::Entity::find()
                    .all(db)
                    .await
                    .map_err(db_err("Failed to load payments for analytics"))
            },
            self.orders.recent(everything, RECENT_ORDERS),
        )?;

        let stats = customer_stats(&customers, &orders);
        let summary = analytics_summary(&orders, &products, &stats);
        debug!(orders = orders.len(), products = products.len(), "analytics reduced");

        Ok(AnalyticsView {
            summary,
            monthly_revenue: monthly_revenue(&orders),
            top_customers: stats.into_iter().take(TOP_CUSTOMERS).collect(),
            low_stock: products
                .into_iter()
                .filter(|p| p.is_low_stock())
                .take(LOW_STOCK_ROWS)
                .collect(),
            recent_orders,
            payment_methods: payment_methods(&payments),
        })
    }

    /// Revenue and order count per month of order date, oldest first.
    #[instrument(skip(self))]
    pub async fn monthly_revenue(&self) -> Result<Vec<MonthlyRevenue>, ServiceError> {
        let orders = order::Entity::find()
            .order_by_asc(order::Column::OrderDate)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load orders for monthly revenue"))?;
        Ok(monthly_revenue(&orders))
    }
}
