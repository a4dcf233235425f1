use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    db::DbPool,
    entities::product,
    errors::ServiceError,
    lifecycle::{Availability, Badged, InventoryMovement, StatusView},
};

use super::{
    db_err,
    inventory::{book, Booking, REFERENCE_OPENING},
};

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        let mut err = ValidationError::new("negative_price");
        err.message = Some("Price cannot be negative".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "SKU is required"))]
    pub sku: String,
    #[validate(custom = "validate_price")]
    #[schema(value_type = String)]
    pub base_price: Decimal,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub is_customizable: bool,
    #[serde(default)]
    #[validate(range(min = 0, message = "Opening stock cannot be negative"))]
    pub stock_quantity: i32,
    #[serde(default = "default_min_stock_level")]
    #[validate(range(min = 0, message = "Minimum stock level cannot be negative"))]
    pub min_stock_level: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_min_stock_level() -> i32 {
    10
}

fn default_true() -> bool {
    true
}

/// Catalogue row with its stock badge
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductRow {
    #[schema(value_type = Object)]
    pub product: product::Model,
    pub stock: StatusView,
}

impl From<product::Model> for ProductRow {
    fn from(product: product::Model) -> Self {
        Self {
            stock: product.stock_status().view(),
            product,
        }
    }
}

/// Product offered on the order forms
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CatalogEntry {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    #[schema(value_type = String)]
    pub base_price: Decimal,
    pub is_customizable: bool,
    pub availability: Availability,
}

#[derive(Clone)]
pub struct ProductService {
    db_pool: Arc<DbPool>,
}

impl ProductService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Active products first, then by name.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<product::Model>, ServiceError> {
        product::Entity::find()
            .order_by_desc(product::Column::IsActive)
            .order_by_asc(product::Column::Name)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to list products"))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, product_id: Uuid) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(product_id)
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load product"))?
            .ok_or_else(|| ServiceError::not_found("Product", product_id))
    }

    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<u64, ServiceError> {
        product::Entity::find()
            .count(&*self.db_pool)
            .await
            .map_err(db_err("Failed to count products"))
    }

    /// Active products with an availability hint for the order forms.
    #[instrument(skip(self))]
    pub async fn order_catalog(&self, threshold: i32) -> Result<Vec<CatalogEntry>, ServiceError> {
        let products = product::Entity::find()
            .filter(product::Column::IsActive.eq(true))
            .order_by_asc(product::Column::Name)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load order catalogue"))?;

        Ok(products
            .into_iter()
            .map(|p| CatalogEntry {
                availability: Availability::classify(Some(p.stock_quantity), threshold),
                id: p.id,
                name: p.name,
                sku: p.sku,
                base_price: p.base_price,
                is_customizable: p.is_customizable,
            })
            .collect())
    }

    /// Creates a product. Opening stock is booked as a ledger entry so the
    /// level stays equal to the sum of movements.
    #[instrument(skip(self, request), fields(sku = %request.sku))]
    pub async fn create(
        &self,
        request: CreateProductRequest,
        created_by: Option<Uuid>,
    ) -> Result<product::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let sku = request.sku.trim().to_string();
        let taken = product::Entity::find()
            .filter(product::Column::Sku.eq(sku.clone()))
            .count(db)
            .await
            .map_err(db_err("Failed to check SKU"))?;
        if taken > 0 {
            return Err(ServiceError::Conflict(format!("SKU {sku} is already in use")));
        }

        let txn = db
            .begin()
            .await
            .map_err(db_err("Failed to start product transaction"))?;

        let created = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            sku: Set(sku),
            description: Set(request.description.filter(|d| !d.trim().is_empty())),
            category: Set(request.category.filter(|c| !c.trim().is_empty())),
            base_price: Set(request.base_price.round_dp(2)),
            stock_quantity: Set(0),
            min_stock_level: Set(request.min_stock_level),
            is_customizable: Set(request.is_customizable),
            is_active: Set(request.is_active),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err("Failed to insert product"))?;

        if request.stock_quantity > 0 {
            book(
                &txn,
                &created,
                Booking {
                    movement: InventoryMovement::In,
                    quantity: request.stock_quantity,
                    reference_type: REFERENCE_OPENING,
                    reference_id: None,
                    notes: Some("Opening stock".to_string()),
                    created_by,
                },
            )
            .await?;
        }

        let product = product::Entity::find_by_id(created.id)
            .one(&txn)
            .await
            .map_err(db_err("Failed to reload product"))?
            .ok_or_else(|| ServiceError::not_found("Product", created.id))?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit product creation"))?;

        info!(product_id = %product.id, stock = product.stock_quantity, "product created");
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(price: Decimal, stock: i32) -> CreateProductRequest {
        CreateProductRequest {
            name: "Walnut Desk".into(),
            sku: "WD-01".into(),
            base_price: price,
            description: None,
            category: None,
            is_customizable: true,
            stock_quantity: stock,
            min_stock_level: 10,
            is_active: true,
        }
    }

    #[test]
    fn negative_price_or_stock_is_rejected() {
        assert!(request(dec!(10.00), 0).validate().is_ok());
        assert!(request(dec!(-1.00), 0).validate().is_err());
        assert!(request(dec!(10.00), -5).validate().is_err());
    }

    #[test]
    fn defaults_apply_when_fields_are_omitted() {
        let parsed: CreateProductRequest = serde_json::from_value(serde_json::json!({
            "name": "Oak Shelf",
            "sku": "OS-2",
            "base_price": "49.90"
        }))
        .unwrap();
        assert_eq!(parsed.min_stock_level, 10);
        assert_eq!(parsed.stock_quantity, 0);
        assert!(parsed.is_active);
        assert!(!parsed.is_customizable);
    }
}
