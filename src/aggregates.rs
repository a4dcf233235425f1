//! Figures shown on the dashboard, billing and analytics pages.
//!
//! Everything here is a pure reduction over rows that were already fetched,
//! so the page handlers stay free of arithmetic and the numbers can be tested
//! without a database.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entities::{customer, customization_request, invoice, order, payment, product},
    lifecycle::{CustomizationStatus, InvoiceStatus, OrderStatus, StockStatus},
};

/// `part / whole` as a percentage with one decimal, `"0.0%"` for an empty whole.
pub fn share(part: u64, whole: u64) -> String {
    if whole == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", part as f64 * 100.0 / whole as f64)
}

/// Mean of `total` over `count` items, zero when there are none.
pub fn average(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    (total / Decimal::from(count as u64)).round_dp(2)
}

fn count_status(orders: &[order::Model], status: OrderStatus) -> u64 {
    orders.iter().filter(|o| o.has_status(&[status])).count() as u64
}

fn revenue(orders: &[order::Model]) -> Decimal {
    orders.iter().map(|o| o.total_amount).sum()
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_orders: u64,
    #[schema(value_type = String)]
    pub total_revenue: Decimal,
    pub pending_orders: u64,
    pub pending_customizations: u64,
    pub total_customers: u64,
    pub total_products: u64,
}

pub fn dashboard_stats(
    orders: &[order::Model],
    customizations: &[customization_request::Model],
    total_customers: u64,
    total_products: u64,
) -> DashboardStats {
    let pending = CustomizationStatus::Pending.to_string();
    DashboardStats {
        total_orders: orders.len() as u64,
        total_revenue: revenue(orders),
        pending_orders: count_status(orders, OrderStatus::Pending),
        pending_customizations: customizations.iter().filter(|c| c.status == pending).count() as u64,
        total_customers,
        total_products,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BillingSummary {
    #[schema(value_type = String)]
    pub total_invoiced: Decimal,
    #[schema(value_type = String)]
    pub total_paid: Decimal,
    #[schema(value_type = String)]
    pub outstanding: Decimal,
    /// Stored `overdue` plus invoices past their due date
    pub overdue_count: u64,
    pub collected_share: String,
}

pub fn billing_summary(invoices: &[invoice::Model], today: NaiveDate) -> BillingSummary {
    let paid = InvoiceStatus::Paid.to_string();
    let total_invoiced: Decimal = invoices.iter().map(|i| i.total_amount).sum();
    let paid_invoices: Vec<&invoice::Model> = invoices.iter().filter(|i| i.status == paid).collect();
    let total_paid: Decimal = paid_invoices.iter().map(|i| i.total_amount).sum();

    BillingSummary {
        total_invoiced,
        total_paid,
        outstanding: total_invoiced - total_paid,
        overdue_count: invoices.iter().filter(|i| i.is_overdue(today)).count() as u64,
        collected_share: share(paid_invoices.len() as u64, invoices.len() as u64),
    }
}

/// Per-customer order totals
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CustomerStat {
    pub customer_id: Uuid,
    pub company_name: String,
    pub total_orders: u64,
    #[schema(value_type = String)]
    pub total_spent: Decimal,
}

/// Payments grouped by method
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PaymentMethodStat {
    pub payment_method: String,
    pub count: u64,
    #[schema(value_type = String)]
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AnalyticsSummary {
    pub total_orders: u64,
    #[schema(value_type = String)]
    pub total_revenue: Decimal,
    #[schema(value_type = String)]
    pub avg_order_value: Decimal,
    pub pending_orders: u64,
    pub pending_share: String,
    pub total_products: u64,
    pub low_stock_count: u64,
    pub out_of_stock_count: u64,
    pub low_stock_share: String,
    pub total_customers: u64,
    pub active_customers: u64,
    pub active_customer_share: String,
}

pub fn customer_stats(customers: &[customer::Model], orders: &[order::Model]) -> Vec<CustomerStat> {
    let mut totals: HashMap<Uuid, (u64, Decimal)> = HashMap::new();
    for order in orders {
        let entry = totals.entry(order.customer_id).or_default();
        entry.0 += 1;
        entry.1 += order.total_amount;
    }

    let mut stats: Vec<CustomerStat> = customers
        .iter()
        .map(|c| {
            let (total_orders, total_spent) = totals.get(&c.id).copied().unwrap_or_default();
            CustomerStat {
                customer_id: c.id,
                company_name: c.company_name.clone(),
                total_orders,
                total_spent,
            }
        })
        .collect();
    stats.sort_by(|a, b| b.total_spent.cmp(&a.total_spent).then_with(|| a.company_name.cmp(&b.company_name)));
    stats
}

pub fn payment_methods(payments: &[payment::Model]) -> Vec<PaymentMethodStat> {
    let mut grouped: BTreeMap<&str, (u64, Decimal)> = BTreeMap::new();
    for p in payments {
        let entry = grouped.entry(p.payment_method.as_str()).or_default();
        entry.0 += 1;
        entry.1 += p.amount;
    }
    grouped
        .into_iter()
        .map(|(method, (count, total))| PaymentMethodStat {
            payment_method: method.to_string(),
            count,
            total,
        })
        .collect()
}

pub fn analytics_summary(
    orders: &[order::Model],
    products: &[product::Model],
    customers: &[CustomerStat],
) -> AnalyticsSummary {
    let total_orders = orders.len() as u64;
    let total_revenue = revenue(orders);
    let pending_orders = count_status(orders, OrderStatus::Pending);
    let stock = |wanted: StockStatus| products.iter().filter(|p| p.stock_status() == wanted).count() as u64;
    let low_stock_count = stock(StockStatus::LowStock);
    let out_of_stock_count = stock(StockStatus::OutOfStock);
    let total_products = products.len() as u64;
    let total_customers = customers.len() as u64;
    let active_customers = customers.iter().filter(|c| c.total_orders > 0).count() as u64;

    AnalyticsSummary {
        total_orders,
        total_revenue,
        avg_order_value: average(total_revenue, orders.len()),
        pending_orders,
        pending_share: share(pending_orders, total_orders),
        total_products,
        low_stock_count,
        out_of_stock_count,
        low_stock_share: share(low_stock_count + out_of_stock_count, total_products),
        total_customers,
        active_customers,
        active_customer_share: share(active_customers, total_customers),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlyRevenue {
    /// `YYYY-MM`
    pub month: String,
    #[schema(value_type = String)]
    pub revenue: Decimal,
    pub order_count: u64,
}

/// Revenue per calendar month of `order_date`, cancelled orders excluded,
/// oldest month first.
pub fn monthly_revenue(orders: &[order::Model]) -> Vec<MonthlyRevenue> {
    let mut months: BTreeMap<(i32, u32), (Decimal, u64)> = BTreeMap::new();
    for order in orders.iter().filter(|o| !o.has_status(&[OrderStatus::Cancelled])) {
        let date = order.order_date.date_naive();
        let entry = months.entry((date.year(), date.month())).or_default();
        entry.0 += order.total_amount;
        entry.1 += 1;
    }
    months
        .into_iter()
        .map(|((year, month), (revenue, order_count))| MonthlyRevenue {
            month: format!("{year:04}-{month:02}"),
            revenue,
            order_count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
    }

    fn order(customer_id: Uuid, status: OrderStatus, total: Decimal, date: DateTime<Utc>) -> order::Model {
        order::Model {
            id: Uuid::new_v4(),
            order_number: "ORD-1-AAAA".into(),
            customer_id,
            status: status.to_string(),
            order_date: date,
            required_date: None,
            shipped_date: None,
            total_amount: total,
            tax_amount: Decimal::ZERO,
            shipping_amount: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            currency: "USD".into(),
            shipping_method: None,
            payment_method: None,
            notes: None,
            created_by: None,
            created_at: date,
            updated_at: date,
        }
    }

    fn invoice(status: InvoiceStatus, total: Decimal, due: Option<NaiveDate>) -> invoice::Model {
        let now = at(2024, 1, 1);
        invoice::Model {
            id: Uuid::new_v4(),
            invoice_number: "INV-20240101-AAAA".into(),
            order_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            status: status.to_string(),
            subtotal: total,
            tax_amount: Decimal::ZERO,
            shipping_amount: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            total_amount: total,
            currency: "USD".into(),
            payment_terms: Some("Net 30".into()),
            issue_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            due_date: due,
            paid_date: None,
            notes: None,
            terms_conditions: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    #[case(0, 0, "0.0%")]
    #[case(5, 0, "0.0%")]
    #[case(1, 3, "33.3%")]
    #[case(2, 2, "100.0%")]
    fn share_formats_one_decimal(#[case] part: u64, #[case] whole: u64, #[case] expected: &str) {
        assert_eq!(share(part, whole), expected);
    }

    #[test]
    fn average_of_nothing_is_zero() {
        assert_eq!(average(dec!(100), 0), Decimal::ZERO);
        assert_eq!(average(dec!(100), 3), dec!(33.33));
    }

    #[test]
    fn dashboard_counts_pending_work() {
        let c = Uuid::new_v4();
        let orders = vec![
            order(c, OrderStatus::Pending, dec!(10.00), at(2024, 1, 5)),
            order(c, OrderStatus::Shipped, dec!(25.50), at(2024, 1, 6)),
        ];
        let stats = dashboard_stats(&orders, &[], 1, 4);
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.total_revenue, dec!(35.50));
        assert_eq!(stats.pending_orders, 1);
        assert_eq!(stats.pending_customizations, 0);
        assert_eq!(stats.total_products, 4);
    }

    #[test]
    fn billing_counts_stored_and_derived_overdue() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let invoices = vec![
            invoice(InvoiceStatus::Paid, dec!(100), NaiveDate::from_ymd_opt(2024, 1, 31)),
            invoice(InvoiceStatus::Overdue, dec!(50), None),
            invoice(InvoiceStatus::Sent, dec!(30), NaiveDate::from_ymd_opt(2024, 2, 1)),
            invoice(InvoiceStatus::Sent, dec!(20), NaiveDate::from_ymd_opt(2024, 4, 1)),
        ];
        let summary = billing_summary(&invoices, today);
        assert_eq!(summary.total_invoiced, dec!(200));
        assert_eq!(summary.total_paid, dec!(100));
        assert_eq!(summary.outstanding, dec!(100));
        assert_eq!(summary.overdue_count, 2);
        assert_eq!(summary.collected_share, "25.0%");
    }

    #[test]
    fn monthly_revenue_skips_cancelled_and_sorts_oldest_first() {
        let c = Uuid::new_v4();
        let orders = vec![
            order(c, OrderStatus::Delivered, dec!(40), at(2024, 2, 10)),
            order(c, OrderStatus::Pending, dec!(10), at(2024, 1, 3)),
            order(c, OrderStatus::Cancelled, dec!(999), at(2024, 1, 4)),
            order(c, OrderStatus::Confirmed, dec!(5), at(2024, 2, 28)),
        ];
        let months = monthly_revenue(&orders);
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].month, "2024-01");
        assert_eq!(months[0].revenue, dec!(10));
        assert_eq!(months[1].month, "2024-02");
        assert_eq!(months[1].revenue, dec!(45));
        assert_eq!(months[1].order_count, 2);
    }

    #[test]
    fn active_customers_have_orders() {
        let now = at(2024, 1, 1);
        let customer = |name: &str| customer::Model {
            id: Uuid::new_v4(),
            company_name: name.into(),
            contact_name: "Contact".into(),
            email: None,
            phone: None,
            address_line1: None,
            address_line2: None,
            city: None,
            state: None,
            postal_code: None,
            country: None,
            created_at: now,
            updated_at: now,
        };
        let customers = vec![customer("Acme"), customer("Globex")];
        let orders = vec![order(customers[1].id, OrderStatus::Pending, dec!(12), now)];

        let stats = customer_stats(&customers, &orders);
        assert_eq!(stats[0].company_name, "Globex");
        assert_eq!(stats[0].total_spent, dec!(12));

        let summary = analytics_summary(&orders, &[], &stats);
        assert_eq!(summary.active_customers, 1);
        assert_eq!(summary.active_customer_share, "50.0%");
        assert_eq!(summary.avg_order_value, dec!(12));
        assert_eq!(summary.low_stock_share, "0.0%");
    }

    proptest! {
        #[test]
        fn share_never_exceeds_whole(part in 0u64..1_000, extra in 0u64..1_000) {
            let whole = part + extra;
            let text = share(part, whole);
            prop_assert!(text.ends_with('%'));
            let value: f64 = text.trim_end_matches('%').parse().unwrap();
            prop_assert!((0.0..=100.0).contains(&value));
        }

        #[test]
        fn outstanding_is_invoiced_minus_paid(totals in proptest::collection::vec((0i64..100_000, any::<bool>()), 0..20)) {
            let invoices: Vec<invoice::Model> = totals
                .iter()
                .map(|(cents, paid)| {
                    let status = if *paid { InvoiceStatus::Paid } else { InvoiceStatus::Sent };
                    invoice(status, Decimal::new(*cents, 2), None)
                })
                .collect();
            let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
            let summary = billing_summary(&invoices, today);
            prop_assert_eq!(summary.outstanding + summary.total_paid, summary.total_invoiced);
        }
    }
}
