use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::DataScope,
    db::DbPool,
    entities::{customer, invoice, order, order_item, product, shipment},
    errors::ServiceError,
    lifecycle::{note_transition, view_raw, Badged, OrderStatus, StatusView},
};

use super::{db_err, scoped, timestamped_number, visible_to};

pub const EMPTY_ORDER_MESSAGE: &str = "Please add at least one item to your order";
pub const AMOUNT_TOO_LARGE_MESSAGE: &str = "Amount is too large";

/// Delivery speed offered to portal customers
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display,
    EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShippingMethod {
    #[default]
    Standard,
    Express,
}

/// Payment channels a portal customer can pick
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentMethod {
    Razorpay,
    Upi,
    Neft,
    Cheque,
}

/// Fees and currency applied to new orders
#[derive(Debug, Clone)]
pub struct OrderSettings {
    pub currency: String,
    pub standard_shipping_fee: Decimal,
    pub express_shipping_fee: Decimal,
}

impl OrderSettings {
    pub fn from_app_config(cfg: &crate::config::AppConfig) -> Self {
        Self {
            currency: cfg.default_currency.clone(),
            standard_shipping_fee: cfg.standard_shipping_fee,
            express_shipping_fee: cfg.express_shipping_fee,
        }
    }

    pub fn shipping_fee(&self, method: ShippingMethod) -> Decimal {
        match method {
            ShippingMethod::Standard => self.standard_shipping_fee,
            ShippingMethod::Express => self.express_shipping_fee,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Defaults to the product's base price
    #[schema(value_type = Option<String>)]
    pub unit_price: Option<Decimal>,
}

/// Back-office order entry
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    pub items: Vec<OrderLine>,
    pub required_date: Option<NaiveDate>,
    #[validate(length(max = 2000, message = "Notes are too long"))]
    pub notes: Option<String>,
    #[schema(value_type = Option<String>)]
    pub tax_amount: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub shipping_amount: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub discount_amount: Option<Decimal>,
    pub shipping_method: Option<String>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PortalLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Self-service order placed from the client portal
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PlaceOrderRequest {
    pub items: Vec<PortalLine>,
    #[serde(default)]
    pub shipping_method: ShippingMethod,
    pub payment_method: PaymentMethod,
    pub required_date: Option<NaiveDate>,
    #[validate(length(max = 2000, message = "Notes are too long"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
    pub notes: Option<String>,
}

/// Header fields staff may edit after entry. Lines and totals are fixed.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub required_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[schema(value_type = Option<String>)]
    pub tax_amount: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub shipping_amount: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub discount_amount: Option<Decimal>,
    pub shipping_method: Option<String>,
    pub payment_method: Option<String>,
}

/// A priced order line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

fn too_large() -> ServiceError {
    ServiceError::ValidationError(AMOUNT_TOO_LARGE_MESSAGE.to_string())
}

impl PricedLine {
    pub fn new(product_id: Uuid, quantity: i32, unit_price: Decimal) -> Result<Self, ServiceError> {
        let total_price = unit_price
            .checked_mul(Decimal::from(quantity))
            .ok_or_else(too_large)?;
        Ok(Self {
            product_id,
            quantity,
            unit_price,
            total_price,
        })
    }
}

/// Order total: the sum of line totals. Tax, shipping and discount are kept
/// in their own columns.
pub fn order_total(lines: &[PricedLine]) -> Result<Decimal, ServiceError> {
    lines
        .iter()
        .try_fold(Decimal::ZERO, |acc, l| acc.checked_add(l.total_price))
        .ok_or_else(too_large)
}

/// Tax, shipping and discount entered on an order; never negative.
fn order_amount(value: Option<Decimal>) -> Result<Decimal, ServiceError> {
    match value {
        Some(amount) if amount.is_sign_negative() && !amount.is_zero() => Err(
            ServiceError::ValidationError("Amounts cannot be negative".to_string()),
        ),
        other => Ok(other.unwrap_or_default()),
    }
}

/// Prices requested lines against the catalogue.
pub fn price_lines(
    requested: &[(Uuid, i32, Option<Decimal>)],
    products: &HashMap<Uuid, product::Model>,
) -> Result<Vec<PricedLine>, ServiceError> {
    if requested.is_empty() {
        return Err(ServiceError::ValidationError(EMPTY_ORDER_MESSAGE.to_string()));
    }

    requested
        .iter()
        .map(|(product_id, quantity, unit_price)| {
            if *quantity < 1 {
                return Err(ServiceError::ValidationError(
                    "Quantity must be at least 1".to_string(),
                ));
            }
            let product = products
                .get(product_id)
                .ok_or_else(|| ServiceError::not_found("Product", product_id))?;
            let price = unit_price.unwrap_or(product.base_price);
            if price.is_sign_negative() {
                return Err(ServiceError::ValidationError(
                    "Unit price cannot be negative".to_string(),
                ));
            }
            PricedLine::new(*product_id, *quantity, price)
        })
        .collect()
}

/// Everything needed to write one order
struct OrderDraft {
    customer_id: Uuid,
    lines: Vec<(Uuid, i32, Option<Decimal>)>,
    required_date: Option<NaiveDate>,
    notes: Option<String>,
    tax_amount: Decimal,
    shipping_amount: Decimal,
    discount_amount: Decimal,
    shipping_method: Option<String>,
    payment_method: Option<String>,
    created_by: Option<Uuid>,
    require_active: bool,
    channel: &'static str,
}

/// Order with its freshly written lines
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderWithItems {
    #[schema(value_type = Object)]
    pub order: order::Model,
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<order_item::Model>,
}

/// Row of the order list
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderRow {
    #[schema(value_type = Object)]
    pub order: order::Model,
    pub status: StatusView,
    pub company_name: Option<String>,
    pub contact_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderLineView {
    #[schema(value_type = Object)]
    pub item: order_item::Model,
    pub product_name: Option<String>,
    pub product_sku: Option<String>,
    pub status: StatusView,
}

/// Order detail page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderDetail {
    #[schema(value_type = Object)]
    pub order: order::Model,
    pub status: StatusView,
    #[schema(value_type = Option<Object>)]
    pub customer: Option<customer::Model>,
    pub items: Vec<OrderLineView>,
    #[schema(value_type = Vec<Object>)]
    pub shipments: Vec<shipment::Model>,
    #[schema(value_type = Option<Object>)]
    pub invoice: Option<invoice::Model>,
}

/// Service for order entry and the order pages
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    settings: OrderSettings,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>, settings: OrderSettings) -> Self {
        Self { db_pool, settings }
    }

    pub fn settings(&self) -> &OrderSettings {
        &self.settings
    }

    /// Staff order entry for any customer.
    #[instrument(skip(self, request), fields(customer_id = %request.customer_id))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
        created_by: Uuid,
    ) -> Result<OrderWithItems, ServiceError> {
        request.validate()?;

        customer::Entity::find_by_id(request.customer_id)
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load customer for order"))?
            .ok_or_else(|| ServiceError::not_found("Customer", request.customer_id))?;

        self.write_order(OrderDraft {
            customer_id: request.customer_id,
            lines: request
                .items
                .iter()
                .map(|l| (l.product_id, l.quantity, l.unit_price))
                .collect(),
            required_date: request.required_date,
            notes: request.notes,
            tax_amount: order_amount(request.tax_amount)?,
            shipping_amount: order_amount(request.shipping_amount)?,
            discount_amount: order_amount(request.discount_amount)?,
            shipping_method: request.shipping_method,
            payment_method: request.payment_method,
            created_by: Some(created_by),
            require_active: false,
            channel: "back_office",
        })
        .await
    }

    /// Portal order for the caller's own customer account. Lines are priced
    /// at list price and the shipping fee is quoted separately from the total.
    #[instrument(skip(self, request))]
    pub async fn place_order(
        &self,
        request: PlaceOrderRequest,
        customer_id: Option<Uuid>,
        placed_by: Uuid,
    ) -> Result<OrderWithItems, ServiceError> {
        request.validate()?;
        if request.items.is_empty() {
            return Err(ServiceError::ValidationError(EMPTY_ORDER_MESSAGE.to_string()));
        }
        let customer_id = customer_id.ok_or_else(|| {
            ServiceError::InvalidInput(
                "Your account is not linked to a customer yet. Please contact support.".to_string(),
            )
        })?;

        self.write_order(OrderDraft {
            customer_id,
            lines: request
                .items
                .iter()
                .map(|l| (l.product_id, l.quantity, None))
                .collect(),
            required_date: request.required_date,
            notes: request.notes,
            tax_amount: Decimal::ZERO,
            shipping_amount: self.settings.shipping_fee(request.shipping_method),
            discount_amount: Decimal::ZERO,
            shipping_method: Some(request.shipping_method.to_string()),
            payment_method: Some(request.payment_method.to_string()),
            created_by: Some(placed_by),
            require_active: true,
            channel: "portal",
        })
        .await
    }

    async fn write_order(&self, draft: OrderDraft) -> Result<OrderWithItems, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db
            .begin()
            .await
            .map_err(db_err("Failed to start transaction for order creation"))?;

        let products = load_products(&txn, draft.lines.iter().map(|l| l.0)).await?;
        if draft.require_active {
            if let Some(inactive) = products.values().find(|p| !p.is_active) {
                return Err(ServiceError::InvalidInput(format!(
                    "{} is no longer available",
                    inactive.name
                )));
            }
        }
        let lines = price_lines(&draft.lines, &products)?;
        let total = order_total(&lines)?;

        let order = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_number: Set(timestamped_number("ORD", now)),
            customer_id: Set(draft.customer_id),
            status: Set(OrderStatus::Pending.to_string()),
            order_date: Set(now),
            required_date: Set(draft.required_date),
            shipped_date: Set(None),
            total_amount: Set(total),
            tax_amount: Set(draft.tax_amount),
            shipping_amount: Set(draft.shipping_amount),
            discount_amount: Set(draft.discount_amount),
            currency: Set(self.settings.currency.clone()),
            shipping_method: Set(draft.shipping_method),
            payment_method: Set(draft.payment_method),
            notes: Set(draft.notes.filter(|n| !n.trim().is_empty())),
            created_by: Set(draft.created_by),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err("Failed to insert order"))?;

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let item = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order.id),
                product_id: Set(line.product_id),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                total_price: Set(line.total_price),
                status: Set(order_item::PENDING.to_string()),
                created_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(db_err("Failed to insert order item"))?;
            items.push(item);
        }

        txn.commit()
            .await
            .map_err(db_err("Failed to commit order creation"))?;

        counter!("oms.orders.created", 1, "channel" => draft.channel);
        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            lines = items.len(),
            total = %order.total_amount,
            "order created"
        );
        Ok(OrderWithItems { order, items })
    }

    /// Orders visible to the caller, newest first.
    #[instrument(skip(self))]
    pub async fn list(&self, scope: DataScope) -> Result<Vec<OrderRow>, ServiceError> {
        let Some(query) = scoped(order::Entity::find(), scope, order::Column::CustomerId) else {
            return Ok(Vec::new());
        };

        let rows = query
            .find_also_related(customer::Entity)
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to list orders"))?;

        Ok(rows
            .into_iter()
            .map(|(order, customer)| OrderRow {
                status: order.status_view(),
                company_name: customer.as_ref().map(|c| c.company_name.clone()),
                contact_name: customer.map(|c| c.contact_name),
                order,
            })
            .collect())
    }

    /// Plain order rows for aggregate cards.
    #[instrument(skip(self))]
    pub async fn models(&self, scope: DataScope) -> Result<Vec<order::Model>, ServiceError> {
        let Some(query) = scoped(order::Entity::find(), scope, order::Column::CustomerId) else {
            return Ok(Vec::new());
        };
        query
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load orders"))
    }

    #[instrument(skip(self))]
    pub async fn recent(&self, scope: DataScope, limit: u64) -> Result<Vec<OrderRow>, ServiceError> {
        let Some(query) = scoped(order::Entity::find(), scope, order::Column::CustomerId) else {
            return Ok(Vec::new());
        };
        let rows = query
            .find_also_related(customer::Entity)
            .order_by_desc(order::Column::CreatedAt)
            .limit(limit)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load recent orders"))?;

        Ok(rows
            .into_iter()
            .map(|(order, customer)| OrderRow {
                status: order.status_view(),
                company_name: customer.as_ref().map(|c| c.company_name.clone()),
                contact_name: customer.map(|c| c.contact_name),
                order,
            })
            .collect())
    }

    async fn find_visible(&self, order_id: Uuid, scope: DataScope) -> Result<order::Model, ServiceError> {
        let order = order::Entity::find_by_id(order_id)
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load order"))?
            .filter(|o| visible_to(scope, o.customer_id))
            .ok_or_else(|| ServiceError::not_found("Order", order_id))?;
        Ok(order)
    }

    /// Order with customer, lines, shipments and invoice.
    #[instrument(skip(self))]
    pub async fn detail(&self, order_id: Uuid, scope: DataScope) -> Result<OrderDetail, ServiceError> {
        let db = &*self.db_pool;
        let order = self.find_visible(order_id, scope).await?;

        let (customer, items, shipments, invoice) = tokio::try_join!(
            customer::Entity::find_by_id(order.customer_id).one(db),
            order_item::Entity::find()
                .filter(order_item::Column::OrderId.eq(order.id))
                .find_also_related(product::Entity)
                .order_by_asc(order_item::Column::CreatedAt)
                .all(db),
            shipment::Entity::find()
                .filter(shipment::Column::OrderId.eq(order.id))
                .order_by_desc(shipment::Column::CreatedAt)
                .all(db),
            invoice::Entity::find()
                .filter(invoice::Column::OrderId.eq(order.id))
                .one(db),
        )
        .map_err(db_err("Failed to load order detail"))?;

        Ok(OrderDetail {
            status: order.status_view(),
            customer,
            items: items
                .into_iter()
                .map(|(item, product)| OrderLineView {
                    status: view_raw::<OrderStatus>(&item.status),
                    product_name: product.as_ref().map(|p| p.name.clone()),
                    product_sku: product.map(|p| p.sku),
                    item,
                })
                .collect(),
            shipments,
            invoice,
            order,
        })
    }

    /// Writes any member of the status enum. Jumps off the nominal path are
    /// logged, not refused.
    #[instrument(skip(self, request), fields(new_status = %request.status))]
    pub async fn update_status(
        &self,
        order_id: Uuid,
        request: UpdateOrderStatusRequest,
    ) -> Result<order::Model, ServiceError> {
        let next = OrderStatus::parse(&request.status)?;
        let order = self.find_visible(order_id, DataScope::Everything).await?;
        note_transition(order.id, &order.status, next);

        let old_status = order.status.clone();
        let shipped_date = order.shipped_date;
        let mut active: order::ActiveModel = order.into();
        active.status = Set(next.to_string());
        if next == OrderStatus::Shipped && shipped_date.is_none() {
            active.shipped_date = Set(Some(Utc::now()));
        }
        if let Some(notes) = request.notes.filter(|n| !n.trim().is_empty()) {
            active.notes = Set(Some(notes));
        }

        let updated = active
            .update(&*self.db_pool)
            .await
            .map_err(db_err("Failed to update order status"))?;

        info!(%order_id, from = %old_status, to = %next, "order status updated");
        Ok(updated)
    }

    /// Edits header fields.
    #[instrument(skip(self, request))]
    pub async fn update_order(
        &self,
        order_id: Uuid,
        request: UpdateOrderRequest,
    ) -> Result<order::Model, ServiceError> {
        let order = self.find_visible(order_id, DataScope::Everything).await?;
        let mut active: order::ActiveModel = order.into();

        if let Some(date) = request.required_date {
            active.required_date = Set(Some(date));
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes).filter(|n| !n.trim().is_empty()));
        }
        for (value, column) in [
            (request.tax_amount, &mut active.tax_amount),
            (request.shipping_amount, &mut active.shipping_amount),
            (request.discount_amount, &mut active.discount_amount),
        ] {
            if value.is_some() {
                *column = Set(order_amount(value)?);
            }
        }
        if let Some(method) = request.shipping_method {
            active.shipping_method = Set(Some(method));
        }
        if let Some(method) = request.payment_method {
            active.payment_method = Set(Some(method));
        }

        active
            .update(&*self.db_pool)
            .await
            .map_err(db_err("Failed to update order"))
    }
}

async fn load_products<C: ConnectionTrait>(
    conn: &C,
    ids: impl Iterator<Item = Uuid>,
) -> Result<HashMap<Uuid, product::Model>, ServiceError> {
    let ids: Vec<Uuid> = ids.collect();
    let products = product::Entity::find()
        .filter(product::Column::Id.is_in(ids))
        .all(conn)
        .await
        .map_err(db_err("Failed to load products for order"))?;
    Ok(products.into_iter().map(|p| (p.id, p)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn product(price: Decimal) -> product::Model {
        product::Model {
            id: Uuid::new_v4(),
            name: "Bench".into(),
            sku: Uuid::new_v4().to_string(),
            description: None,
            category: None,
            base_price: price,
            stock_quantity: 5,
            min_stock_level: 10,
            is_customizable: false,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_order_is_rejected_with_form_message() {
        let err = price_lines(&[], &HashMap::new()).unwrap_err();
        assert_eq!(err.to_string(), EMPTY_ORDER_MESSAGE);
    }

    #[test]
    fn lines_default_to_base_price() {
        let p = product(dec!(12.50));
        let catalogue = HashMap::from([(p.id, p.clone())]);
        let lines = price_lines(&[(p.id, 3, None), (p.id, 1, Some(dec!(10)))], &catalogue).unwrap();
        assert_eq!(lines[0].total_price, dec!(37.50));
        assert_eq!(lines[1].total_price, dec!(10));
        assert_eq!(order_total(&lines).unwrap(), dec!(47.50));
    }

    #[test]
    fn zero_quantity_and_unknown_products_fail() {
        let p = product(dec!(1));
        let catalogue = HashMap::from([(p.id, p.clone())]);
        assert!(matches!(
            price_lines(&[(p.id, 0, None)], &catalogue),
            Err(ServiceError::ValidationError(_))
        ));
        assert!(matches!(
            price_lines(&[(Uuid::new_v4(), 1, None)], &catalogue),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[rstest]
    #[case(Decimal::MAX, 2)]
    #[case(Decimal::MAX / dec!(3), 4)]
    fn oversized_line_is_a_validation_error(#[case] price: Decimal, #[case] quantity: i32) {
        let p = product(dec!(1));
        let catalogue = HashMap::from([(p.id, p.clone())]);
        let err = price_lines(&[(p.id, quantity, Some(price))], &catalogue).unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(ref m) if m == AMOUNT_TOO_LARGE_MESSAGE);
    }

    #[test]
    fn oversized_total_is_a_validation_error() {
        let p = product(dec!(1));
        let catalogue = HashMap::from([(p.id, p.clone())]);
        let half = Decimal::MAX / dec!(2);
        let requested = [(p.id, 1, Some(half)), (p.id, 1, Some(half)), (p.id, 1, Some(half))];
        let lines = price_lines(&requested, &catalogue).expect("each line fits");
        assert_matches!(order_total(&lines), Err(ServiceError::ValidationError(_)));
    }

    #[rstest]
    #[case(None, dec!(0))]
    #[case(Some(dec!(0)), dec!(0))]
    #[case(Some(dec!(4.25)), dec!(4.25))]
    fn order_amounts_default_to_zero(#[case] value: Option<Decimal>, #[case] expected: Decimal) {
        assert_eq!(order_amount(value).unwrap(), expected);
    }

    #[test]
    fn negative_order_amounts_are_rejected() {
        assert_matches!(order_amount(Some(dec!(-1))), Err(ServiceError::ValidationError(_)));
    }

    #[test]
    fn shipping_fee_follows_method() {
        let settings = OrderSettings {
            currency: "USD".into(),
            standard_shipping_fee: dec!(8.00),
            express_shipping_fee: dec!(15.00),
        };
        assert_eq!(settings.shipping_fee(ShippingMethod::Standard), dec!(8.00));
        assert_eq!(settings.shipping_fee(ShippingMethod::Express), dec!(15.00));
    }

    proptest! {
        #[test]
        fn total_equals_sum_of_line_totals(
            lines in prop::collection::vec((1i32..500, 0i64..1_000_000), 1..20)
        ) {
            let priced: Vec<PricedLine> = lines
                .iter()
                .map(|(qty, cents)| {
                    PricedLine::new(Uuid::new_v4(), *qty, Decimal::new(*cents, 2)).unwrap()
                })
                .collect();
            let expected: Decimal = lines
                .iter()
                .map(|(qty, cents)| Decimal::new(*cents, 2) * Decimal::from(*qty))
                .sum();
            prop_assert_eq!(order_total(&priced).unwrap(), expected);
            for line in &priced {
                prop_assert_eq!(line.total_price, line.unit_price * Decimal::from(line.quantity));
            }
        }
    }
}
