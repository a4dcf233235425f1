use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customization_comments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customization_request_id: Uuid,
    pub author_id: Uuid,
    pub comment: String,
    /// Hidden from client accounts
    pub is_internal: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customization_request::Entity",
        from = "Column::CustomizationRequestId",
        to = "super::customization_request::Column::Id",
        on_delete = "Cascade"
    )]
    CustomizationRequest,
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::AuthorId",
        to = "super::profile::Column::Id"
    )]
    Author,
}

impl Related<super::customization_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomizationRequest.def()
    }
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
