use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lifecycle::{view_raw, ShipmentStatus, StatusView};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shipments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub shipment_number: String,
    pub order_id: Uuid,
    pub carrier_id: Option<Uuid>,
    pub service_type: Option<String>,
    pub tracking_number: Option<String>,
    pub status: String,
    pub ship_to_name: Option<String>,
    pub ship_to_company: Option<String>,
    pub ship_to_address_line1: Option<String>,
    pub ship_to_address_line2: Option<String>,
    pub ship_to_city: Option<String>,
    pub ship_to_state: Option<String>,
    pub ship_to_postal_code: Option<String>,
    pub ship_to_country: Option<String>,
    pub ship_from_name: String,
    pub ship_from_company: String,
    pub ship_from_address_line1: String,
    pub ship_from_city: String,
    pub ship_from_state: String,
    pub ship_from_postal_code: String,
    pub weight_lbs: Option<Decimal>,
    pub length_in: Option<Decimal>,
    pub width_in: Option<Decimal>,
    pub height_in: Option<Decimal>,
    pub declared_value: Option<Decimal>,
    pub shipping_cost: Decimal,
    pub estimated_delivery_date: Option<NaiveDate>,
    pub shipped_date: Option<DateTime<Utc>>,
    pub delivered_date: Option<DateTime<Utc>>,
    pub special_instructions: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn status_view(&self) -> StatusView {
        view_raw::<ShipmentStatus>(&self.status)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::shipping_carrier::Entity",
        from = "Column::CarrierId",
        to = "super::shipping_carrier::Column::Id"
    )]
    Carrier,
    #[sea_orm(has_many = "super::shipment_item::Entity")]
    Items,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::shipping_carrier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Carrier.def()
    }
}

impl Related<super::shipment_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut model = self;
        let now = Utc::now();
        if insert {
            model.created_at = Set(now);
        }
        model.updated_at = Set(now);
        Ok(model)
    }
}
