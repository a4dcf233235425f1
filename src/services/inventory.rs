/*!
 * # Inventory ledger
 *
 * Stock is an append-only log of signed deltas. The level of a product is
 * `Σ quantity_delta` over its entries; `products.stock_quantity` is a cached
 * copy rewritten inside the same transaction as each new entry.
 *
 * All movements pass through one async mutex so two writers never compute a
 * delta from the same starting level.
 */

use std::sync::Arc;

use metrics::counter;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{inventory_transaction, product},
    errors::ServiceError,
    lifecycle::{Badged, InventoryMovement, StatusView},
};

use super::db_err;

/// Reference tags stored on ledger entries
pub const REFERENCE_ADJUSTMENT: &str = "adjustment";
pub const REFERENCE_OPENING: &str = "opening";

/// How many movements the inventory page shows
pub const RECENT_MOVEMENTS: u64 = 20;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RecordMovementRequest {
    pub product_id: Uuid,
    pub transaction_type: InventoryMovement,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    pub notes: Option<String>,
}

/// A ledger entry with its product and display tone
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MovementRow {
    #[schema(value_type = Object)]
    pub transaction: inventory_transaction::Model,
    pub product_name: Option<String>,
    pub product_sku: Option<String>,
    pub kind: StatusView,
    pub tone: &'static str,
}

impl MovementRow {
    fn new(transaction: inventory_transaction::Model, product: Option<product::Model>) -> Self {
        let movement = transaction.transaction_type.parse::<InventoryMovement>().ok();
        let kind = crate::lifecycle::view_raw::<InventoryMovement>(&transaction.transaction_type);
        Self {
            product_name: product.as_ref().map(|p| p.name.clone()),
            product_sku: product.map(|p| p.sku),
            kind,
            tone: movement.map(InventoryMovement::tone).unwrap_or("gray"),
            transaction,
        }
    }
}

/// One movement about to be booked
#[derive(Debug, Clone)]
pub(crate) struct Booking {
    pub movement: InventoryMovement,
    pub quantity: i32,
    pub reference_type: &'static str,
    pub reference_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
}

/// Current level of a product as the sum of its ledger deltas.
pub(crate) async fn ledger_level<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
) -> Result<i32, ServiceError> {
    let level: Option<Option<i64>> = inventory_transaction::Entity::find()
        .select_only()
        .column_as(
            Expr::col(inventory_transaction::Column::QuantityDelta).sum(),
            "level",
        )
        .filter(inventory_transaction::Column::ProductId.eq(product_id))
        .into_tuple()
        .one(conn)
        .await
        .map_err(db_err("Failed to sum inventory ledger"))?;

    let level = level.flatten().unwrap_or(0);
    i32::try_from(level)
        .map_err(|_| ServiceError::InternalError(format!("Stock level {level} out of range")))
}

/// Appends one entry and refreshes the cached level. The caller owns the
/// transaction and, for existing products, the writer lock.
pub(crate) async fn book<C: ConnectionTrait>(
    conn: &C,
    product: &product::Model,
    booking: Booking,
) -> Result<inventory_transaction::Model, ServiceError> {
    let current = ledger_level(conn, product.id).await?;
    let delta = booking.movement.delta(current, booking.quantity);

    let entry = inventory_transaction::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        transaction_type: Set(booking.movement.to_string()),
        quantity: Set(booking.quantity),
        quantity_delta: Set(delta),
        resulting_level: Set(current + delta),
        reference_type: Set(booking.reference_type.to_string()),
        reference_id: Set(booking.reference_id),
        notes: Set(booking.notes.filter(|n| !n.trim().is_empty())),
        created_by: Set(booking.created_by),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(conn)
    .await
    .map_err(db_err("Failed to append inventory transaction"))?;

    let level = ledger_level(conn, product.id).await?;
    let mut cached: product::ActiveModel = product.clone().into();
    cached.stock_quantity = Set(level);
    cached
        .update(conn)
        .await
        .map_err(db_err("Failed to refresh product stock level"))?;

    counter!("oms.inventory.movements", 1, "type" => booking.movement.to_string());
    Ok(entry)
}

/// Serialised writer and read side of the stock ledger
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
    writer: Arc<Mutex<()>>,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            db_pool,
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Books an in/out/adjustment movement against an existing product.
    #[instrument(skip(self, request), fields(product_id = %request.product_id, kind = %request.transaction_type))]
    pub async fn record_movement(
        &self,
        request: RecordMovementRequest,
        created_by: Option<Uuid>,
    ) -> Result<inventory_transaction::Model, ServiceError> {
        request.validate()?;

        let _writer = self.writer.lock().await;
        let txn = self
            .db_pool
            .begin()
            .await
            .map_err(db_err("Failed to start inventory transaction"))?;

        let product = product::Entity::find_by_id(request.product_id)
            .one(&txn)
            .await
            .map_err(db_err("Failed to load product for movement"))?
            .ok_or_else(|| ServiceError::not_found("Product", request.product_id))?;

        let entry = book(
            &txn,
            &product,
            Booking {
                movement: request.transaction_type,
                quantity: request.quantity,
                reference_type: REFERENCE_ADJUSTMENT,
                reference_id: None,
                notes: request.notes,
                created_by,
            },
        )
        .await?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit inventory movement"))?;

        info!(
            product_id = %product.id,
            delta = entry.quantity_delta,
            level = entry.resulting_level,
            "inventory movement recorded"
        );
        Ok(entry)
    }

    /// Newest movements first, joined with their product.
    #[instrument(skip(self))]
    pub async fn recent_movements(&self, limit: u64) -> Result<Vec<MovementRow>, ServiceError> {
        let rows = inventory_transaction::Entity::find()
            .find_also_related(product::Entity)
            .order_by_desc(inventory_transaction::Column::CreatedAt)
            .limit(limit)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to list inventory movements"))?;

        Ok(rows
            .into_iter()
            .map(|(entry, product)| MovementRow::new(entry, product))
            .collect())
    }

    /// Full ledger of one product, oldest first.
    #[instrument(skip(self))]
    pub async fn product_history(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<inventory_transaction::Model>, ServiceError> {
        inventory_transaction::Entity::find()
            .filter(inventory_transaction::Column::ProductId.eq(product_id))
            .order_by_asc(inventory_transaction::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load product ledger"))
    }

    /// Products at or below their minimum stock level.
    #[instrument(skip(self))]
    pub async fn low_stock(&self) -> Result<Vec<product::Model>, ServiceError> {
        product::Entity::find()
            .filter(
                Expr::col(product::Column::StockQuantity)
                    .lte(Expr::col(product::Column::MinStockLevel)),
            )
            .order_by_asc(product::Column::StockQuantity)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to list low-stock products"))
    }

    pub fn movement_kinds() -> Vec<StatusView> {
        use strum::IntoEnumIterator;
        InventoryMovement::iter().map(Badged::view).collect()
    }
}
