use std::sync::Arc;

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{AuthService, Role, SessionToken},
    db::DbPool,
    entities::profile,
    errors::ServiceError,
};

use super::db_err;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token plus the profile it was issued for
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub token: SessionToken,
    #[schema(value_type = Object)]
    pub profile: profile::Model,
}

/// Registration, login and profile lookups
#[derive(Clone)]
pub struct ProfileService {
    db_pool: Arc<DbPool>,
    auth: Arc<AuthService>,
}

impl ProfileService {
    pub fn new(db_pool: Arc<DbPool>, auth: Arc<AuthService>) -> Self {
        Self { db_pool, auth }
    }

    /// Self-registration always yields a client profile.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<profile::Model, ServiceError> {
        request.validate()?;
        self.create_profile(&request.email, &request.password, request.full_name, Role::Client)
            .await
    }

    /// Creates a profile with an explicit role. Used by the operator CLI.
    #[instrument(skip(self, password))]
    pub async fn create_profile(
        &self,
        email: &str,
        password: &str,
        full_name: Option<String>,
        role: Role,
    ) -> Result<profile::Model, ServiceError> {
        let db = &*self.db_pool;
        let email = email.trim().to_lowercase();

        let existing = profile::Entity::find()
            .filter(profile::Column::Email.eq(email.clone()))
            .one(db)
            .await
            .map_err(db_err("Failed to look up profile by email"))?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "An account for {email} already exists"
            )));
        }

        let password_hash = self.auth.hash_password(password)?;
        let model = profile::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            full_name: Set(full_name.filter(|n| !n.trim().is_empty())),
            role: Set(role.to_string()),
            customer_id: Set(None),
            password_hash: Set(password_hash),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(db_err("Failed to insert profile"))?;

        info!(profile_id = %model.id, role = %role, "profile created");
        Ok(model)
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let profile = profile::Entity::find()
            .filter(profile::Column::Email.eq(request.email.trim().to_lowercase()))
            .one(db)
            .await
            .map_err(db_err("Failed to look up profile for login"))?;

        let Some(profile) = profile else {
            warn!("login for unknown email");
            return Err(ServiceError::AuthError("Invalid email or password".to_string()));
        };

        if !self.auth.verify_password(&request.password, &profile.password_hash) {
            warn!(profile_id = %profile.id, "login with wrong password");
            return Err(ServiceError::AuthError("Invalid email or password".to_string()));
        }

        let token = self.auth.issue_token(&profile)?;
        Ok(LoginResponse { token, profile })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, profile_id: Uuid) -> Result<profile::Model, ServiceError> {
        profile::Entity::find_by_id(profile_id)
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load profile"))?
            .ok_or_else(|| ServiceError::not_found("Profile", profile_id))
    }

    /// Links a portal account to the customer whose rows it may see.
    #[instrument(skip(self))]
    pub async fn link_customer(
        &self,
        profile_id: Uuid,
        customer_id: Uuid,
    ) -> Result<profile::Model, ServiceError> {
        let profile = self.get(profile_id).await?;
        if profile.role != Role::Client.as_ref() {
            return Err(ServiceError::InvalidInput(
                "Only client accounts can be linked to a customer".to_string(),
            ));
        }

        let mut active: profile::ActiveModel = profile.into();
        active.customer_id = Set(Some(customer_id));
        let updated = active
            .update(&*self.db_pool)
            .await
            .map_err(db_err("Failed to link profile to customer"))?;

        info!(%profile_id, %customer_id, "portal account linked");
        Ok(updated)
    }

    /// Changes the role tag. Takes effect on the next request.
    #[instrument(skip(self))]
    pub async fn set_role(&self, profile_id: Uuid, role: Role) -> Result<profile::Model, ServiceError> {
        let profile = self.get(profile_id).await?;
        let mut active: profile::ActiveModel = profile.into();
        active.role = Set(role.to_string());
        active
            .update(&*self.db_pool)
            .await
            .map_err(db_err("Failed to update profile role"))
    }
}
