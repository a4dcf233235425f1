use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
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
    entities::{customer, order, order_item, product, shipment, shipment_item, shipping_carrier},
    errors::ServiceError,
    lifecycle::{note_transition, Badged, OrderStatus, ShipmentStatus, StatusView},
};

use super::{db_err, timestamped_number, visible_to};

/// Origin printed on every label
pub struct ShipFrom {
    pub name: &'static str,
    pub company: &'static str,
    pub address_line1: &'static str,
    pub city: &'static str,
    pub state: &'static str,
    pub postal_code: &'static str,
}

pub const SHIP_FROM: ShipFrom = ShipFrom {
    name: "Warehouse Team",
    company: "Your Company",
    address_line1: "123 Warehouse St",
    city: "Warehouse City",
    state: "CA",
    postal_code: "90210",
};

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateShipmentRequest {
    pub order_id: Uuid,
    pub carrier_id: Option<Uuid>,
    pub service_type: Option<String>,
    pub tracking_number: Option<String>,
    #[schema(value_type = Option<String>)]
    pub weight_lbs: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub length_in: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub width_in: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub height_in: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub declared_value: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub shipping_cost: Option<Decimal>,
    pub estimated_delivery_date: Option<NaiveDate>,
    #[validate(length(max = 2000, message = "Special instructions are too long"))]
    pub special_instructions: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateShipmentStatusRequest {
    pub status: String,
    pub tracking_number: Option<String>,
}

/// Row of the shipping list
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShipmentRow {
    #[schema(value_type = Object)]
    pub shipment: shipment::Model,
    pub status: StatusView,
    pub order_number: Option<String>,
    pub company_name: Option<String>,
    pub carrier_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShipmentLine {
    pub order_item_id: Uuid,
    pub product_name: Option<String>,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShipmentDetail {
    #[schema(value_type = Object)]
    pub shipment: shipment::Model,
    pub status: StatusView,
    #[schema(value_type = Option<Object>)]
    pub order: Option<order::Model>,
    #[schema(value_type = Option<Object>)]
    pub customer: Option<customer::Model>,
    #[schema(value_type = Option<Object>)]
    pub carrier: Option<shipping_carrier::Model>,
    pub lines: Vec<ShipmentLine>,
}

/// Order that is ready to ship
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShippableOrder {
    pub id: Uuid,
    pub order_number: String,
    pub company_name: Option<String>,
    pub status: StatusView,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct ShipmentService {
    db_pool: Arc<DbPool>,
}

impl ShipmentService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn carriers(&self) -> Result<Vec<shipping_carrier::Model>, ServiceError> {
        shipping_carrier::Entity::find()
            .filter(shipping_carrier::Column::IsActive.eq(true))
            .order_by_asc(shipping_carrier::Column::Name)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load carriers"))
    }

    #[instrument(skip(self))]
    pub async fn shippable_orders(&self) -> Result<Vec<ShippableOrder>, ServiceError> {
        let statuses: Vec<String> = OrderStatus::SHIPPABLE.iter().map(|s| s.to_string()).collect();
        let rows = order::Entity::find()
            .filter(order::Column::Status.is_in(statuses))
            .find_also_related(customer::Entity)
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to list shippable orders"))?;

        Ok(rows
            .into_iter()
            .map(|(order, customer)| ShippableOrder {
                id: order.id,
                status: order.status_view(),
                order_number: order.order_number,
                company_name: customer.map(|c| c.company_name),
            })
            .collect())
    }

    /// Creates a shipment covering every line of the order. A tracking number
    /// marks the order shipped in the same transaction.
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn create_shipment(
        &self,
        request: CreateShipmentRequest,
        created_by: Uuid,
    ) -> Result<shipment::Model, ServiceError> {
        request.validate()?;
        let now = Utc::now();
        let tracking_number = non_blank(request.tracking_number);
        let service_type = non_blank(request.service_type);

        let txn = self
            .db_pool
            .begin()
            .await
            .map_err(db_err("Failed to start shipment transaction"))?;

        let order = order::Entity::find_by_id(request.order_id)
            .one(&txn)
            .await
            .map_err(db_err("Failed to load order for shipment"))?
            .ok_or_else(|| ServiceError::not_found("Order", request.order_id))?;

        if let Some(carrier_id) = request.carrier_id {
            let carrier = shipping_carrier::Entity::find_by_id(carrier_id)
                .one(&txn)
                .await
                .map_err(db_err("Failed to load carrier"))?
                .ok_or_else(|| ServiceError::not_found("Carrier", carrier_id))?;
            if let Some(service) = service_type.as_deref() {
                if !carrier.supports(service) {
                    return Err(ServiceError::InvalidInput(format!(
                        "{} does not offer '{service}'",
                        carrier.name
                    )));
                }
            }
        }

        let customer = customer::Entity::find_by_id(order.customer_id)
            .one(&txn)
            .await
            .map_err(db_err("Failed to load customer for shipment"))?;

        let shipment = shipment::ActiveModel {
            id: Set(Uuid::new_v4()),
            shipment_number: Set(timestamped_number("SHP", now)),
            order_id: Set(order.id),
            carrier_id: Set(request.carrier_id),
            service_type: Set(service_type),
            tracking_number: Set(tracking_number.clone()),
            status: Set(ShipmentStatus::Pending.to_string()),
            ship_to_name: Set(customer.as_ref().map(|c| c.contact_name.clone())),
            ship_to_company: Set(customer.as_ref().map(|c| c.company_name.clone())),
            ship_to_address_line1: Set(customer.as_ref().and_then(|c| c.address_line1.clone())),
            ship_to_address_line2: Set(customer.as_ref().and_then(|c| c.address_line2.clone())),
            ship_to_city: Set(customer.as_ref().and_then(|c| c.city.clone())),
            ship_to_state: Set(customer.as_ref().and_then(|c| c.state.clone())),
            ship_to_postal_code: Set(customer.as_ref().and_then(|c| c.postal_code.clone())),
            ship_to_country: Set(customer.as_ref().and_then(|c| c.country.clone())),
            ship_from_name: Set(SHIP_FROM.name.to_string()),
            ship_from_company: Set(SHIP_FROM.company.to_string()),
            ship_from_address_line1: Set(SHIP_FROM.address_line1.to_string()),
            ship_from_city: Set(SHIP_FROM.city.to_string()),
            ship_from_state: Set(SHIP_FROM.state.to_string()),
            ship_from_postal_code: Set(SHIP_FROM.postal_code.to_string()),
            weight_lbs: Set(request.weight_lbs),
            length_in: Set(request.length_in),
            width_in: Set(request.width_in),
            height_in: Set(request.height_in),
            declared_value: Set(request.declared_value),
            shipping_cost: Set(request.shipping_cost.unwrap_or_default()),
            estimated_delivery_date: Set(request.estimated_delivery_date),
            shipped_date: Set(None),
            delivered_date: Set(None),
            special_instructions: Set(non_blank(request.special_instructions)),
            created_by: Set(Some(created_by)),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err("Failed to insert shipment"))?;

        let items = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order.id))
            .all(&txn)
            .await
            .map_err(db_err("Failed to load order items for shipment"))?;
        for item in &items {
            shipment_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                shipment_id: Set(shipment.id),
                order_item_id: Set(item.id),
                quantity: Set(item.quantity),
            }
            .insert(&txn)
            .await
            .map_err(db_err("Failed to insert shipment item"))?;
        }

        if tracking_number.is_some() {
            note_transition(order.id, &order.status, OrderStatus::Shipped);
            let mut active: order::ActiveModel = order.into();
            active.status = Set(OrderStatus::Shipped.to_string());
            active.shipped_date = Set(Some(now));
            active
                .update(&txn)
                .await
                .map_err(db_err("Failed to mark order shipped"))?;
        }

        txn.commit()
            .await
            .map_err(db_err("Failed to commit shipment"))?;

        counter!("oms.shipments.created", 1);
        info!(
            shipment_id = %shipment.id,
            shipment_number = %shipment.shipment_number,
            lines = items.len(),
            "shipment created"
        );
        Ok(shipment)
    }

    /// Shipments visible to the caller, newest first.
    #[instrument(skip(self))]
    pub async fn list(&self, scope: DataScope, limit: Option<u64>) -> Result<Vec<ShipmentRow>, ServiceError> {
        let db = &*self.db_pool;
        let mut query = shipment::Entity::find().find_also_related(order::Entity);
        match scope {
            DataScope::Everything => {}
            DataScope::Customer(Some(customer_id)) => {
                query = query.filter(order::Column::CustomerId.eq(customer_id));
            }
            DataScope::Customer(None) => return Ok(Vec::new()),
        }

        let rows = query
            .order_by_desc(shipment::Column::CreatedAt)
            .limit(limit)
            .all(db)
            .await
            .map_err(db_err("Failed to list shipments"))?;

        let (carriers, customers) = tokio::try_join!(
            shipping_carrier::Entity::find().all(db),
            customer::Entity::find().all(db),
        )
        .map_err(db_err("Failed to load shipment references"))?;
        let carriers: HashMap<Uuid, String> = carriers.into_iter().map(|c| (c.id, c.name)).collect();
        let customers: HashMap<Uuid, String> =
            customers.into_iter().map(|c| (c.id, c.company_name)).collect();

        Ok(rows
            .into_iter()
            .map(|(shipment, order)| ShipmentRow {
                status: shipment.status_view(),
                carrier_name: shipment.carrier_id.and_then(|id| carriers.get(&id).cloned()),
                company_name: order
                    .as_ref()
                    .and_then(|o| customers.get(&o.customer_id).cloned()),
                order_number: order.map(|o| o.order_number),
                shipment,
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn detail(&self, shipment_id: Uuid, scope: DataScope) -> Result<ShipmentDetail, ServiceError> {
        let db = &*self.db_pool;
        let (shipment, order) = shipment::Entity::find_by_id(shipment_id)
            .find_also_related(order::Entity)
            .one(db)
            .await
            .map_err(db_err("Failed to load shipment"))?
            .filter(|(_, order)| {
                order
                    .as_ref()
                    .map(|o| visible_to(scope, o.customer_id))
                    .unwrap_or(scope == DataScope::Everything)
            })
            .ok_or_else(|| ServiceError::not_found("Shipment", shipment_id))?;

        let customer_id = order.as_ref().map(|o| o.customer_id);
        let (customer, carrier, lines) = tokio::try_join!(
            async {
                match customer_id {
                    Some(id) => customer::Entity::find_by_id(id).one(db).await,
                    None => Ok(None),
                }
            },
            async {
                match shipment.carrier_id {
                    Some(id) => shipping_carrier::Entity::find_by_id(id).one(db).await,
                    None => Ok(None),
                }
            },
            shipment_item::Entity::find()
                .filter(shipment_item::Column::ShipmentId.eq(shipment.id))
                .find_also_related(order_item::Entity)
                .all(db),
        )
        .map_err(db_err("Failed to load shipment detail"))?;

        let product_ids: Vec<Uuid> = lines
            .iter()
            .filter_map(|(_, item)| item.as_ref().map(|i| i.product_id))
            .collect();
        let products: HashMap<Uuid, String> = product::Entity::find()
            .filter(product::Column::Id.is_in(product_ids))
            .all(db)
            .await
            .map_err(db_err("Failed to load shipped products"))?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();

        Ok(ShipmentDetail {
            status: shipment.status_view(),
            lines: lines
                .into_iter()
                .map(|(line, item)| ShipmentLine {
                    order_item_id: line.order_item_id,
                    product_name: item.and_then(|i| products.get(&i.product_id).cloned()),
                    quantity: line.quantity,
                })
                .collect(),
            order,
            customer,
            carrier,
            shipment,
        })
    }

    /// Writes any shipment status, stamping shipped and delivered dates.
    #[instrument(skip(self, request), fields(new_status = %request.status))]
    pub async fn update_status(
        &self,
        shipment_id: Uuid,
        request: UpdateShipmentStatusRequest,
    ) -> Result<shipment::Model, ServiceError> {
        let next = ShipmentStatus::parse(&request.status)?;
        let shipment = shipment::Entity::find_by_id(shipment_id)
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load shipment"))?
            .ok_or_else(|| ServiceError::not_found("Shipment", shipment_id))?;

        note_transition(shipment.id, &shipment.status, next);
        let now = Utc::now();
        let shipped_date = shipment.shipped_date;
        let mut active: shipment::ActiveModel = shipment.into();
        active.status = Set(next.to_string());
        if let Some(tracking) = non_blank(request.tracking_number) {
            active.tracking_number = Set(Some(tracking));
        }
        if matches!(next, ShipmentStatus::Shipped | ShipmentStatus::InTransit) && shipped_date.is_none() {
            active.shipped_date = Set(Some(now));
        }
        if next == ShipmentStatus::Delivered {
            active.delivered_date = Set(Some(now));
        }

        active
            .update(&*self.db_pool)
            .await
            .map_err(db_err("Failed to update shipment status"))
    }
}
