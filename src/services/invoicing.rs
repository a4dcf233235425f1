/*!
 * # Invoicing
 *
 * Invoices are generated from orders, one per order. Generation copies the
 * order's amounts into a draft; the invoice form then applies payment terms
 * and dates. Both steps commit together.
 */

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::DataScope,
    db::DbPool,
    entities::{customer, invoice, order, order_item, payment, payment_term, product},
    errors::ServiceError,
    lifecycle::{note_transition, Badged, InvoiceStatus, OrderStatus, StatusView},
};

use super::{db_err, dated_number, scoped, visible_to};

/// Due date for an invoice issued on `issue_date` under `days` payment terms.
pub fn due_date(issue_date: NaiveDate, days: i32) -> Option<NaiveDate> {
    issue_date.checked_add_signed(Duration::days(i64::from(days)))
}

/// `total − tax − shipping + discount`, `None` on overflow.
fn backed_out_subtotal(
    total: Decimal,
    tax: Decimal,
    shipping: Decimal,
    discount: Decimal,
) -> Option<Decimal> {
    total
        .checked_sub(tax)?
        .checked_sub(shipping)?
        .checked_add(discount)
}

/// Subtotal shown on the invoice page, derived from the stored totals.
pub fn displayed_subtotal(invoice: &invoice::Model) -> Decimal {
    backed_out_subtotal(
        invoice.total_amount,
        invoice.tax_amount,
        invoice.shipping_amount,
        invoice.discount_amount,
    )
    .unwrap_or(invoice.subtotal)
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateInvoiceRequest {
    pub order_id: Uuid,
    /// Name of a payment term; the configured default when omitted
    pub payment_terms: Option<String>,
    /// Defaults to today
    pub issue_date: Option<NaiveDate>,
    #[validate(length(max = 2000, message = "Notes are too long"))]
    pub notes: Option<String>,
    #[validate(length(max = 5000, message = "Terms and conditions are too long"))]
    pub terms_conditions: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateInvoiceStatusRequest {
    pub status: String,
}

/// Row of the invoice list
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InvoiceRow {
    #[schema(value_type = Object)]
    pub invoice: invoice::Model,
    pub status: StatusView,
    pub company_name: Option<String>,
    pub past_due: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InvoiceLine {
    pub product_name: Option<String>,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    #[schema(value_type = String)]
    pub total_price: Decimal,
}

/// Invoice detail page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InvoiceDetail {
    #[schema(value_type = Object)]
    pub invoice: invoice::Model,
    pub status: StatusView,
    #[schema(value_type = String)]
    pub subtotal: Decimal,
    pub past_due: bool,
    #[schema(value_type = Option<Object>)]
    pub customer: Option<customer::Model>,
    #[schema(value_type = Option<Object>)]
    pub order: Option<order::Model>,
    pub lines: Vec<InvoiceLine>,
    #[schema(value_type = Vec<Object>)]
    pub payments: Vec<payment::Model>,
}

/// Order that can still be invoiced
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InvoiceableOrder {
    pub id: Uuid,
    pub order_number: String,
    pub company_name: Option<String>,
    pub status: StatusView,
    #[schema(value_type = String)]
    pub total_amount: Decimal,
}

/// Copies an order's amounts into a new draft invoice.
///
/// Fails with `Conflict` when the order already has an invoice.
pub async fn generate_invoice_from_order<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    created_by: Option<Uuid>,
) -> Result<invoice::Model, ServiceError> {
    let order = order::Entity::find_by_id(order_id)
        .one(conn)
        .await
        .map_err(db_err("Failed to load order for invoicing"))?
        .ok_or_else(|| ServiceError::not_found("Order", order_id))?;

    let existing = invoice::Entity::find()
        .filter(invoice::Column::OrderId.eq(order_id))
        .one(conn)
        .await
        .map_err(db_err("Failed to check for an existing invoice"))?;
    if let Some(existing) = existing {
        return Err(ServiceError::Conflict(format!(
            "Order {} is already invoiced as {}",
            order.order_number, existing.invoice_number
        )));
    }

    let total = order.total_amount;
    let subtotal = backed_out_subtotal(
        total,
        order.tax_amount,
        order.shipping_amount,
        order.discount_amount,
    )
    .ok_or_else(|| ServiceError::ValidationError("Amount is too large".to_string()))?;
    let today = Utc::now().date_naive();

    invoice::ActiveModel {
        id: Set(Uuid::new_v4()),
        invoice_number: Set(dated_number("INV", today)),
        order_id: Set(order.id),
        customer_id: Set(order.customer_id),
        status: Set(InvoiceStatus::Draft.to_string()),
        subtotal: Set(subtotal),
        tax_amount: Set(order.tax_amount),
        shipping_amount: Set(order.shipping_amount),
        discount_amount: Set(order.discount_amount),
        total_amount: Set(total),
        currency: Set(order.currency.clone()),
        payment_terms: Set(None),
        issue_date: Set(today),
        due_date: Set(None),
        paid_date: Set(None),
        notes: Set(None),
        terms_conditions: Set(None),
        created_by: Set(created_by),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(db_err("Failed to insert invoice"))
}

#[derive(Clone)]
pub struct InvoiceService {
    db_pool: Arc<DbPool>,
    default_terms: String,
}

impl InvoiceService {
    pub fn new(db_pool: Arc<DbPool>, default_terms: String) -> Self {
        Self {
            db_pool,
            default_terms,
        }
    }

    /// Active payment terms, shortest first.
    #[instrument(skip(self))]
    pub async fn payment_terms(&self) -> Result<Vec<payment_term::Model>, ServiceError> {
        payment_term::Entity::find()
            .filter(payment_term::Column::IsActive.eq(true))
            .order_by_asc(payment_term::Column::Days)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load payment terms"))
    }

    pub fn default_terms(&self) -> &str {
        &self.default_terms
    }

    /// Orders in an invoiceable status that have no invoice yet.
    #[instrument(skip(self))]
    pub async fn invoiceable_orders(&self) -> Result<Vec<InvoiceableOrder>, ServiceError> {
        let statuses: Vec<String> = OrderStatus::INVOICEABLE.iter().map(|s| s.to_string()).collect();
        let rows = order::Entity::find()
            .left_join(invoice::Entity)
            .filter(order::Column::Status.is_in(statuses))
            .filter(invoice::Column::Id.is_null())
            .find_also_related(customer::Entity)
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to list invoiceable orders"))?;

        Ok(rows
            .into_iter()
            .map(|(order, customer)| InvoiceableOrder {
                id: order.id,
                status: order.status_view(),
                order_number: order.order_number,
                company_name: customer.map(|c| c.company_name),
                total_amount: order.total_amount,
            })
            .collect())
    }

    /// Runs the generation procedure on its own.
    #[instrument(skip(self))]
    pub async fn generate_from_order(
        &self,
        order_id: Uuid,
        created_by: Option<Uuid>,
    ) -> Result<invoice::Model, ServiceError> {
        let txn = self
            .db_pool
            .begin()
            .await
            .map_err(db_err("Failed to start invoice transaction"))?;
        let invoice = generate_invoice_from_order(&txn, order_id, created_by).await?;
        txn.commit()
            .await
            .map_err(db_err("Failed to commit generated invoice"))?;

        counter!("oms.invoices.generated", 1);
        Ok(invoice)
    }

    /// Generates the invoice and applies terms and dates in one transaction.
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn create_invoice(
        &self,
        request: CreateInvoiceRequest,
        created_by: Uuid,
    ) -> Result<invoice::Model, ServiceError> {
        request.validate()?;

        let terms_name = request
            .payment_terms
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| self.default_terms.clone());
        let issue_date = request
            .issue_date
            .unwrap_or_else(|| Utc::now().date_naive());

        let txn = self
            .db_pool
            .begin()
            .await
            .map_err(db_err("Failed to start invoice transaction"))?;

        let terms = payment_term::Entity::find()
            .filter(payment_term::Column::Name.eq(terms_name.clone()))
            .one(&txn)
            .await
            .map_err(db_err("Failed to load payment terms"))?
            .ok_or_else(|| {
                ServiceError::InvalidInput(format!("Unknown payment terms '{terms_name}'"))
            })?;

        let due = due_date(issue_date, terms.days).ok_or_else(|| {
            ServiceError::InvalidInput("Due date is out of range".to_string())
        })?;

        let generated = generate_invoice_from_order(&txn, request.order_id, Some(created_by)).await?;

        let mut active: invoice::ActiveModel = generated.into();
        active.payment_terms = Set(Some(terms.name.clone()));
        active.issue_date = Set(issue_date);
        active.due_date = Set(Some(due));
        active.notes = Set(request.notes.filter(|n| !n.trim().is_empty()));
        active.terms_conditions = Set(request.terms_conditions.filter(|t| !t.trim().is_empty()));
        let invoice = active
            .update(&txn)
            .await
            .map_err(db_err("Failed to apply invoice terms"))?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit invoice"))?;

        counter!("oms.invoices.generated", 1);
        info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            due_date = %due,
            "invoice created"
        );
        Ok(invoice)
    }

    /// Invoices visible to the caller, newest first.
    #[instrument(skip(self))]
    pub async fn list(&self, scope: DataScope) -> Result<Vec<InvoiceRow>, ServiceError> {
        let Some(query) = scoped(invoice::Entity::find(), scope, invoice::Column::CustomerId) else {
            return Ok(Vec::new());
        };
        let today = Utc::now().date_naive();

        let rows = query
            .find_also_related(customer::Entity)
            .order_by_desc(invoice::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to list invoices"))?;

        Ok(rows
            .into_iter()
            .map(|(invoice, customer)| InvoiceRow {
                status: invoice.status_view(),
                past_due: invoice.is_past_due(today),
                company_name: customer.map(|c| c.company_name),
                invoice,
            })
            .collect())
    }

    /// Plain invoice rows for the billing summary.
    #[instrument(skip(self))]
    pub async fn models(&self, scope: DataScope) -> Result<Vec<invoice::Model>, ServiceError> {
        let Some(query) = scoped(invoice::Entity::find(), scope, invoice::Column::CustomerId) else {
            return Ok(Vec::new());
        };
        query
            .order_by_desc(invoice::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load invoices"))
    }

    #[instrument(skip(self))]
    pub async fn detail(&self, invoice_id: Uuid, scope: DataScope) -> Result<InvoiceDetail, ServiceError> {
        let db = &*self.db_pool;
        let invoice = invoice::Entity::find_by_id(invoice_id)
            .one(db)
            .await
            .map_err(db_err("Failed to load invoice"))?
            .filter(|i| visible_to(scope, i.customer_id))
            .ok_or_else(|| ServiceError::not_found("Invoice", invoice_id))?;

        let (customer, order, lines, payments) = tokio::try_join!(
            customer::Entity::find_by_id(invoice.customer_id).one(db),
            order::Entity::find_by_id(invoice.order_id).one(db),
            order_item::Entity::find()
                .filter(order_item::Column::OrderId.eq(invoice.order_id))
                .find_also_related(product::Entity)
                .order_by_asc(order_item::Column::CreatedAt)
                .all(db),
            payment::Entity::find()
                .filter(payment::Column::InvoiceId.eq(invoice.id))
                .order_by_desc(payment::Column::PaymentDate)
                .all(db),
        )
        .map_err(db_err("Failed to load invoice detail"))?;

        let today = Utc::now().date_naive();
        Ok(InvoiceDetail {
            status: invoice.status_view(),
            subtotal: displayed_subtotal(&invoice),
            past_due: invoice.is_past_due(today),
            customer,
            order,
            lines: lines
                .into_iter()
                .map(|(item, product)| InvoiceLine {
                    product_name: product.map(|p| p.name),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    total_price: item.total_price,
                })
                .collect(),
            payments,
            invoice,
        })
    }

    /// Writes any invoice status; marks the paid date the first time it is paid.
    #[instrument(skip(self, request), fields(new_status = %request.status))]
    pub async fn update_status(
        &self,
        invoice_id: Uuid,
        request: UpdateInvoiceStatusRequest,
    ) -> Result<invoice::Model, ServiceError> {
        let next = InvoiceStatus::parse(&request.status)?;
        let invoice = invoice::Entity::find_by_id(invoice_id)
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load invoice"))?
            .ok_or_else(|| ServiceError::not_found("Invoice", invoice_id))?;

        note_transition(invoice.id, &invoice.status, next);
        let paid_date = invoice.paid_date;
        let mut active: invoice::ActiveModel = invoice.into();
        active.status = Set(next.to_string());
        if next == InvoiceStatus::Paid && paid_date.is_none() {
            active.paid_date = Set(Some(Utc::now().date_naive()));
        }

        active
            .update(&*self.db_pool)
            .await
            .map_err(db_err("Failed to update invoice status"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("2024-01-01", 30, "2024-01-31")]
    #[case("2024-01-01", 0, "2024-01-01")]
    #[case("2024-02-15", 15, "2024-03-01")]
    #[case("2023-12-20", 45, "2024-02-03")]
    fn due_date_is_exact_day_arithmetic(
        #[case] issue: &str,
        #[case] days: i32,
        #[case] expected: &str,
    ) {
        let issue = NaiveDate::parse_from_str(issue, "%Y-%m-%d").unwrap();
        let expected = NaiveDate::parse_from_str(expected, "%Y-%m-%d").unwrap();
        assert_eq!(due_date(issue, days), Some(expected));
    }

    #[test]
    fn displayed_subtotal_backs_out_adjustments() {
        let today = Utc::now();
        let invoice = invoice::Model {
            id: Uuid::new_v4(),
            invoice_number: "INV-20240101-ABCD".into(),
            order_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            status: "draft".into(),
            subtotal: dec!(100),
            tax_amount: dec!(8),
            shipping_amount: dec!(15),
            discount_amount: dec!(5),
            total_amount: dec!(118),
            currency: "USD".into(),
            payment_terms: None,
            issue_date: today.date_naive(),
            due_date: None,
            paid_date: None,
            notes: None,
            terms_conditions: None,
            created_by: None,
            created_at: today,
            updated_at: today,
        };
        assert_eq!(displayed_subtotal(&invoice), dec!(100));
    }
}
