use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{db::DbPool, entities::customer, errors::ServiceError};

use super::db_err;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, message = "Company name is required"))]
    pub company_name: String,
    #[validate(length(min = 1, message = "Contact name is required"))]
    pub contact_name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Service for managing customer accounts
#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
}

impl CustomerService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Lists customers by company name, optionally narrowed by a search term.
    #[instrument(skip(self))]
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<customer::Model>, ServiceError> {
        let mut query = customer::Entity::find().order_by_asc(customer::Column::CompanyName);

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(customer::Column::CompanyName.contains(term))
                    .add(customer::Column::ContactName.contains(term)),
            );
        }

        query
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to list customers"))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, customer_id: Uuid) -> Result<customer::Model, ServiceError> {
        customer::Entity::find_by_id(customer_id)
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load customer"))?
            .ok_or_else(|| ServiceError::not_found("Customer", customer_id))
    }

    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<u64, ServiceError> {
        customer::Entity::find()
            .count(&*self.db_pool)
            .await
            .map_err(db_err("Failed to count customers"))
    }

    #[instrument(skip(self, request), fields(company = %request.company_name))]
    pub async fn create(&self, request: CreateCustomerRequest) -> Result<customer::Model, ServiceError> {
        let request = CreateCustomerRequest {
            email: blank_to_none(request.email),
            ..request
        };
        request.validate()?;

        let model = customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_name: Set(request.company_name.trim().to_string()),
            contact_name: Set(request.contact_name.trim().to_string()),
            email: Set(request.email),
            phone: Set(blank_to_none(request.phone)),
            address_line1: Set(blank_to_none(request.address_line1)),
            address_line2: Set(blank_to_none(request.address_line2)),
            city: Set(blank_to_none(request.city)),
            state: Set(blank_to_none(request.state)),
            postal_code: Set(blank_to_none(request.postal_code)),
            country: Set(blank_to_none(request.country)),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(db_err("Failed to insert customer"))?;

        info!(customer_id = %model.id, "customer created");
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_collapse_to_none() {
        assert_eq!(blank_to_none(Some("   ".into())), None);
        assert_eq!(blank_to_none(Some(" Reno ".into())), Some("Reno".into()));
        assert_eq!(blank_to_none(None), None);
    }

    #[test]
    fn company_and_contact_are_required() {
        let request = CreateCustomerRequest {
            company_name: String::new(),
            contact_name: "Ana".into(),
            email: None,
            phone: None,
            address_line1: None,
            address_line2: None,
            city: None,
            state: None,
            postal_code: None,
            country: None,
        };
        let err = ServiceError::from(request.validate().unwrap_err());
        assert!(err.to_string().contains("Company name is required"));
    }
}
