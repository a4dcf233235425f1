//! Status lifecycles for every entity that carries a status column.
//!
//! Each enum is the single source for its display label, badge tier and
//! terminal flag. Views never switch on raw strings: they go through
//! [`Badged::view`] or [`view_raw`], which is total over any stored value.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// Visual tier a status renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    Default,
    Secondary,
    Destructive,
    Outline,
}

/// A status as every list and detail view presents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusView {
    pub value: String,
    pub label: String,
    pub badge: Badge,
    pub terminal: bool,
}

/// Replaces underscores with spaces, the way status labels are shown.
pub fn humanize(raw: &str) -> String {
    let label = raw.trim().replace('_', " ");
    if label.is_empty() {
        "unknown".to_string()
    } else {
        label
    }
}

/// Anything with a canonical label and badge.
pub trait Badged: Copy + Eq + AsRef<str> + FromStr + IntoEnumIterator + 'static {
    /// Entity name used in error messages
    const KIND: &'static str;

    fn badge(self) -> Badge;

    fn label(self) -> String {
        humanize(self.as_ref())
    }

    fn is_terminal(self) -> bool {
        false
    }

    fn view(self) -> StatusView {
        StatusView {
            value: self.as_ref().to_string(),
            label: self.label(),
            badge: self.badge(),
            terminal: self.is_terminal(),
        }
    }

    /// Parses a submitted value, rejecting anything outside the closed set.
    fn parse(raw: &str) -> Result<Self, ServiceError> {
        Self::from_str(raw.trim()).map_err(|_| {
            let allowed: Vec<String> = Self::iter().map(|v| v.as_ref().to_string()).collect();
            ServiceError::InvalidStatus(format!(
                "'{}' is not a valid {} (expected one of: {})",
                raw,
                Self::KIND,
                allowed.join(", ")
            ))
        })
    }
}

/// A status that advances along a nominal path.
///
/// The path is informational: writes may set any member of the enum.
pub trait Lifecycle: Badged {
    fn nominal_successors(self) -> &'static [Self];

    fn is_nominal_transition(self, to: Self) -> bool {
        self == to || self.nominal_successors().contains(&to)
    }
}

/// Renders a stored string even when it falls outside the enum.
pub fn view_raw<S: Badged>(raw: &str) -> StatusView {
    match S::from_str(raw.trim()) {
        Ok(status) => status.view(),
        Err(_) => StatusView {
            value: raw.to_string(),
            label: humanize(raw),
            badge: Badge::Secondary,
            terminal: false,
        },
    }
}

/// Logs a write that leaves the nominal path. Such writes are still applied.
pub fn note_transition<S: Lifecycle>(entity_id: impl std::fmt::Display, from: &str, to: S) {
    match S::from_str(from) {
        Ok(current) if !current.is_nominal_transition(to) => {
            tracing::warn!(
                kind = S::KIND,
                id = %entity_id,
                from = %from,
                to = %to.as_ref(),
                "status jumped off the nominal path"
            );
        }
        Ok(_) => {}
        Err(_) => {
            tracing::warn!(kind = S::KIND, id = %entity_id, from = %from, "unrecognised stored status");
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
    Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    Pending,
    Confirmed,
    InProduction,
    ReadyToShip,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Orders that may be invoiced
    pub const INVOICEABLE: [OrderStatus; 5] = [
        OrderStatus::Confirmed,
        OrderStatus::InProduction,
        OrderStatus::ReadyToShip,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    /// Orders that may receive a shipment
    pub const SHIPPABLE: [OrderStatus; 3] = [
        OrderStatus::Confirmed,
        OrderStatus::InProduction,
        OrderStatus::ReadyToShip,
    ];
}

impl Badged for OrderStatus {
    const KIND: &'static str = "order status";

    fn badge(self) -> Badge {
        match self {
            OrderStatus::Draft => Badge::Secondary,
            OrderStatus::Cancelled => Badge::Destructive,
            _ => Badge::Default,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl Lifecycle for OrderStatus {
    fn nominal_successors(self) -> &'static [Self] {
        use OrderStatus::*;
        match self {
            Draft => &[Pending, Cancelled],
            Pending => &[Confirmed, Cancelled],
            Confirmed => &[InProduction, Cancelled],
            InProduction => &[ReadyToShip, Cancelled],
            ReadyToShip => &[Shipped, Cancelled],
            Shipped => &[Delivered, Cancelled],
            Delivered | Cancelled => &[],
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
    Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Viewed,
    Paid,
    Overdue,
    Cancelled,
}

impl Badged for InvoiceStatus {
    const KIND: &'static str = "invoice status";

    fn badge(self) -> Badge {
        match self {
            InvoiceStatus::Draft => Badge::Secondary,
            InvoiceStatus::Sent | InvoiceStatus::Viewed | InvoiceStatus::Paid => Badge::Default,
            InvoiceStatus::Overdue | InvoiceStatus::Cancelled => Badge::Destructive,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
    }
}

impl Lifecycle for InvoiceStatus {
    fn nominal_successors(self) -> &'static [Self] {
        use InvoiceStatus::*;
        match self {
            Draft => &[Sent, Cancelled],
            Sent => &[Viewed, Paid, Overdue, Cancelled],
            Viewed => &[Paid, Overdue, Cancelled],
            Overdue => &[Paid, Cancelled],
            Paid | Cancelled => &[],
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
    Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
    Refunded,
}

impl Badged for PaymentStatus {
    const KIND: &'static str = "payment status";

    fn badge(self) -> Badge {
        match self {
            PaymentStatus::Failed | PaymentStatus::Cancelled => Badge::Destructive,
            _ => Badge::Default,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(
            self,
            PaymentStatus::Failed | PaymentStatus::Cancelled | PaymentStatus::Refunded
        )
    }
}

impl Lifecycle for PaymentStatus {
    fn nominal_successors(self) -> &'static [Self] {
        use PaymentStatus::*;
        match self {
            Pending => &[Processing, Completed, Failed, Cancelled],
            Processing => &[Completed, Failed, Cancelled],
            Completed => &[Refunded],
            Failed | Cancelled | Refunded => &[],
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
    Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShipmentStatus {
    Pending,
    Processing,
    Shipped,
    InTransit,
    Delivered,
    Exception,
    Returned,
}

impl Badged for ShipmentStatus {
    const KIND: &'static str = "shipment status";

    fn badge(self) -> Badge {
        match self {
            ShipmentStatus::Exception | ShipmentStatus::Returned => Badge::Destructive,
            _ => Badge::Default,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, ShipmentStatus::Delivered | ShipmentStatus::Returned)
    }
}

impl Lifecycle for ShipmentStatus {
    fn nominal_successors(self) -> &'static [Self] {
        use ShipmentStatus::*;
        match self {
            Pending => &[Processing, Shipped, Exception],
            Processing => &[Shipped, Exception],
            Shipped => &[InTransit, Delivered, Exception],
            InTransit => &[Delivered, Exception, Returned],
            Exception => &[InTransit, Delivered, Returned],
            Delivered | Returned => &[],
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
    Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CustomizationStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    RevisionNeeded,
}

impl Badged for CustomizationStatus {
    const KIND: &'static str = "customization status";

    fn badge(self) -> Badge {
        match self {
            CustomizationStatus::Rejected => Badge::Destructive,
            _ => Badge::Default,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(
            self,
            CustomizationStatus::Approved | CustomizationStatus::Rejected
        )
    }
}

impl Lifecycle for CustomizationStatus {
    fn nominal_successors(self) -> &'static [Self] {
        use CustomizationStatus::*;
        match self {
            Pending => &[UnderReview],
            UnderReview => &[Approved, Rejected, RevisionNeeded],
            RevisionNeeded => &[UnderReview],
            Approved | Rejected => &[],
        }
    }
}

/// Status of a unit of work: workflow steps and fulfillment tasks share it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
    Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    OnHold,
}

pub type WorkflowStepStatus = TaskStatus;
pub type FulfillmentTaskStatus = TaskStatus;

impl Badged for TaskStatus {
    const KIND: &'static str = "task status";

    fn badge(self) -> Badge {
        match self {
            TaskStatus::OnHold => Badge::Destructive,
            _ => Badge::Default,
        }
    }

    fn is_terminal(self) -> bool {
        self == TaskStatus::Completed
    }
}

impl Lifecycle for TaskStatus {
    fn nominal_successors(self) -> &'static [Self] {
        use TaskStatus::*;
        match self {
            Pending => &[InProgress, OnHold],
            InProgress => &[Completed, OnHold],
            OnHold => &[InProgress],
            Completed => &[],
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
    Display, EnumString, AsRefStr, EnumIter, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Badged for Priority {
    const KIND: &'static str = "priority";

    fn badge(self) -> Badge {
        match self {
            Priority::Low => Badge::Outline,
            Priority::Medium => Badge::Secondary,
            Priority::High => Badge::Default,
            Priority::Urgent => Badge::Destructive,
        }
    }
}

/// Stock position of a product against its reorder level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
    Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub fn classify(stock_quantity: i32, min_stock_level: i32) -> Self {
        if stock_quantity <= 0 {
            StockStatus::OutOfStock
        } else if stock_quantity <= min_stock_level {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }
}

impl Badged for StockStatus {
    const KIND: &'static str = "stock status";

    fn badge(self) -> Badge {
        match self {
            StockStatus::InStock => Badge::Default,
            StockStatus::LowStock => Badge::Secondary,
            StockStatus::OutOfStock => Badge::Destructive,
        }
    }

    fn label(self) -> String {
        match self {
            StockStatus::InStock => "In Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
        }
        .to_string()
    }
}

/// Availability hint shown next to products on the order form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    InStock,
    LowStock,
    OutOfStock,
    Unknown,
}

impl Availability {
    pub fn classify(stock_quantity: Option<i32>, threshold: i32) -> Self {
        match stock_quantity {
            None => Availability::Unknown,
            Some(qty) if qty > threshold => Availability::InStock,
            Some(qty) if qty > 0 => Availability::LowStock,
            Some(_) => Availability::OutOfStock,
        }
    }
}

/// Kind of stock movement recorded in the inventory ledger.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
    Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InventoryMovement {
    In,
    Out,
    Adjustment,
}

impl InventoryMovement {
    /// Level after applying `quantity` to `current`. Outbound stock never goes negative.
    pub fn resulting_level(self, current: i32, quantity: i32) -> i32 {
        match self {
            InventoryMovement::In => current.saturating_add(quantity),
            InventoryMovement::Out => current.saturating_sub(quantity).max(0),
            InventoryMovement::Adjustment => quantity.max(0),
        }
    }

    /// Signed delta recorded in the ledger for this movement.
    pub fn delta(self, current: i32, quantity: i32) -> i32 {
        self.resulting_level(current, quantity) - current
    }

    /// Colour used for the movement in transaction lists
    pub fn tone(self) -> &'static str {
        match self {
            InventoryMovement::In => "green",
            InventoryMovement::Out => "red",
            InventoryMovement::Adjustment => "blue",
        }
    }
}

impl Badged for InventoryMovement {
    const KIND: &'static str = "transaction type";

    fn badge(self) -> Badge {
        match self {
            InventoryMovement::In => Badge::Default,
            InventoryMovement::Out => Badge::Destructive,
            InventoryMovement::Adjustment => Badge::Secondary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use rstest::rstest;

    fn total<S: Badged>() {
        for status in S::iter() {
            let view = status.view();
            assert!(!view.label.is_empty(), "{} has no label", view.value);
            assert_eq!(view_raw::<S>(status.as_ref()), view);
        }
    }

    #[test]
    fn every_variant_has_a_label_and_badge() {
        total::<OrderStatus>();
        total::<InvoiceStatus>();
        total::<PaymentStatus>();
        total::<ShipmentStatus>();
        total::<CustomizationStatus>();
        total::<TaskStatus>();
        total::<Priority>();
        total::<StockStatus>();
        total::<InventoryMovement>();
    }

    #[rstest]
    #[case(OrderStatus::Draft, Badge::Secondary)]
    #[case(OrderStatus::Pending, Badge::Default)]
    #[case(OrderStatus::InProduction, Badge::Default)]
    #[case(OrderStatus::Delivered, Badge::Default)]
    #[case(OrderStatus::Cancelled, Badge::Destructive)]
    fn order_badges(#[case] status: OrderStatus, #[case] badge: Badge) {
        assert_eq!(status.badge(), badge);
    }

    #[rstest]
    #[case(InvoiceStatus::Draft, Badge::Secondary)]
    #[case(InvoiceStatus::Paid, Badge::Default)]
    #[case(InvoiceStatus::Overdue, Badge::Destructive)]
    #[case(InvoiceStatus::Cancelled, Badge::Destructive)]
    fn invoice_badges(#[case] status: InvoiceStatus, #[case] badge: Badge) {
        assert_eq!(status.badge(), badge);
    }

    #[test]
    fn labels_replace_underscores() {
        assert_eq!(OrderStatus::ReadyToShip.label(), "ready to ship");
        assert_eq!(ShipmentStatus::InTransit.label(), "in transit");
        assert_eq!(StockStatus::OutOfStock.label(), "Out of Stock");
    }

    #[test]
    fn terminal_states() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
        assert!(InvoiceStatus::Paid.is_terminal());
        assert!(!InvoiceStatus::Overdue.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
    }

    #[test]
    fn cancellation_reachable_from_every_open_order_state() {
        for status in OrderStatus::iter().filter(|s| !s.is_terminal()) {
            assert!(status.is_nominal_transition(OrderStatus::Cancelled));
        }
        assert!(!OrderStatus::Draft.is_nominal_transition(OrderStatus::Delivered));
    }

    #[test]
    fn unknown_stored_value_renders_secondary() {
        let view = view_raw::<OrderStatus>("on_backorder");
        assert_eq!(view.label, "on backorder");
        assert_eq!(view.badge, Badge::Secondary);
        assert!(!view.terminal);
    }

    #[test]
    fn parse_rejects_values_outside_the_enum() {
        assert_eq!(OrderStatus::parse("shipped").unwrap(), OrderStatus::Shipped);
        assert_matches!(
            OrderStatus::parse("teleported"),
            Err(ServiceError::InvalidStatus(_))
        );
    }

    #[rstest]
    #[case(0, 10, StockStatus::OutOfStock)]
    #[case(10, 10, StockStatus::LowStock)]
    #[case(11, 10, StockStatus::InStock)]
    fn stock_classification(#[case] stock: i32, #[case] min: i32, #[case] expected: StockStatus) {
        assert_eq!(StockStatus::classify(stock, min), expected);
    }

    #[test]
    fn availability_thresholds() {
        assert_eq!(Availability::classify(None, 10), Availability::Unknown);
        assert_eq!(Availability::classify(Some(11), 10), Availability::InStock);
        assert_eq!(Availability::classify(Some(10), 10), Availability::LowStock);
        assert_eq!(Availability::classify(Some(0), 10), Availability::OutOfStock);
    }

    #[rstest]
    #[case(InventoryMovement::In, 5, 3, 8)]
    #[case(InventoryMovement::Out, 5, 3, 2)]
    #[case(InventoryMovement::Out, 2, 5, 0)]
    #[case(InventoryMovement::Adjustment, 5, 12, 12)]
    fn movement_levels(
        #[case] movement: InventoryMovement,
        #[case] current: i32,
        #[case] qty: i32,
        #[case] expected: i32,
    ) {
        assert_eq!(movement.resulting_level(current, qty), expected);
        assert_eq!(movement.delta(current, qty), expected - current);
    }

    proptest! {
        #[test]
        fn any_stored_string_renders(raw in ".{0,24}") {
            let view = view_raw::<ShipmentStatus>(&raw);
            prop_assert!(!view.label.is_empty());
        }

        #[test]
        fn movements_never_go_negative(current in 0i32..10_000, qty in 0i32..10_000) {
            for movement in InventoryMovement::iter() {
                prop_assert!(movement.resulting_level(current, qty) >= 0);
            }
        }
    }
}
