/*!
 * # Authentication and request identity
 *
 * Session tokens are HS256 JWTs carrying only the profile id. Every request
 * re-reads the profile row so role changes apply immediately; the resolved
 * [`Viewer`] travels in request extensions to guards and handlers.
 *
 * Page access is decided by [`AuthRouterExt::require_section`], which consults
 * the table in [`rbac`] before the handler runs.
 */

pub mod navigation;
pub mod rbac;

use std::str::FromStr;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{db::DbPool, entities::profile, errors::ServiceError, AppState};
pub use navigation::{initials, navigation_for, NavEntry, Navigation, Shell};
pub use rbac::{Capability, Role, Section};

/// Where unauthenticated callers are sent
pub const LOGIN_ROUTE: &str = "/api/v1/auth/login";
/// Where callers without access to a section are sent
pub const DASHBOARD_ROUTE: &str = "/api/v1/dashboard";

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Token settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
    pub token_ttl: std::time::Duration,
}

impl AuthConfig {
    pub fn from_app_config(cfg: &crate::config::AppConfig) -> Self {
        Self {
            jwt_secret: cfg.jwt_secret.clone(),
            issuer: cfg.auth_issuer.clone(),
            audience: cfg.auth_audience.clone(),
            token_ttl: std::time::Duration::from_secs(cfg.jwt_expiration as u64),
        }
    }
}

/// Issued session token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Issues and validates session tokens, hashes passwords
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    pub fn issue_token(&self, profile: &profile::Model) -> Result<SessionToken, ServiceError> {
        let now = Utc::now();
        let ttl = ChronoDuration::from_std(self.config.token_ttl)
            .map_err(|_| ServiceError::InternalError("Invalid token duration".to_string()))?;

        let claims = Claims {
            sub: profile.id.to_string(),
            email: profile.email.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::InternalError(format!("Token encoding failed: {e}")))?;

        Ok(SessionToken {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.token_ttl.as_secs(),
        })
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.issuer.as_str()]);
        validation.set_audience(&[self.config.audience.as_str()]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = %e, "rejected session token");
            ServiceError::Unauthenticated
        })
    }

    pub fn hash_password(&self, password: &str) -> Result<String, ServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ServiceError::HashError(e.to_string()))
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Which rows a caller may list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataScope {
    /// Staff see every row
    Everything,
    /// Clients see rows of their own customer account, nothing if unlinked
    Customer(Option<Uuid>),
}

/// The caller of the current request, resolved from a fresh profile read.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Viewer {
    pub profile_id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub customer_id: Option<Uuid>,
}

impl Viewer {
    pub fn from_profile(profile: &profile::Model) -> Result<Self, ServiceError> {
        let role = Role::from_str(&profile.role).map_err(|_| {
            warn!(profile_id = %profile.id, role = %profile.role, "profile carries an unknown role");
            ServiceError::Unauthenticated
        })?;
        Ok(Self {
            profile_id: profile.id,
            email: profile.email.clone(),
            full_name: profile.full_name.clone(),
            role,
            customer_id: profile.customer_id,
        })
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.role.can(capability)
    }

    /// Fails with `Forbidden` unless the role holds `capability`.
    pub fn require(&self, capability: Capability) -> Result<(), ServiceError> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!(
                "role '{}' cannot {}",
                self.role,
                capability.as_ref().replace('_', " ")
            )))
        }
    }

    pub fn actions(&self, wanted: &[Capability]) -> Vec<Capability> {
        self.role.actions(wanted)
    }

    pub fn scope(&self) -> DataScope {
        if self.role.is_staff() {
            DataScope::Everything
        } else {
            DataScope::Customer(self.customer_id)
        }
    }

    pub fn is_client(&self) -> bool {
        !self.role.is_staff()
    }

    pub fn initials(&self) -> String {
        initials(self.full_name.as_deref(), Some(&self.email))
    }
}

/// Handlers take the [`Viewer`] placed by [`auth_middleware`] as an argument.
#[async_trait]
impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Viewer>()
            .cloned()
            .ok_or(ServiceError::Unauthenticated)
    }
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolves the caller's profile for a bearer token.
pub async fn resolve_viewer(
    db: &DbPool,
    auth: &AuthService,
    token: &str,
) -> Result<Viewer, ServiceError> {
    let claims = auth.validate_token(token)?;
    let profile_id = Uuid::parse_str(&claims.sub).map_err(|_| ServiceError::Unauthenticated)?;

    let profile = profile::Entity::find_by_id(profile_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            debug!(%profile_id, "session refers to a missing profile");
            ServiceError::Unauthenticated
        })?;

    Viewer::from_profile(&profile)
}

/// Authentication middleware: attaches a [`Viewer`] or redirects to login.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&request).map(str::to_owned) else {
        return ServiceError::Unauthenticated.into_response();
    };

    match resolve_viewer(&state.db, &state.auth, &token).await {
        Ok(viewer) => {
            request.extensions_mut().insert(viewer);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

/// Page guard: redirects to the dashboard when the role may not open `section`.
pub async fn section_guard(
    State(section): State<Section>,
    request: Request,
    next: Next,
) -> Response {
    let Some(viewer) = request.extensions().get::<Viewer>() else {
        return ServiceError::Unauthenticated.into_response();
    };

    if !viewer.role.can_view(section) {
        debug!(
            profile_id = %viewer.profile_id,
            role = %viewer.role,
            section = %section,
            "section not permitted, redirecting"
        );
        return Redirect::to(DASHBOARD_ROUTE).into_response();
    }

    next.run(request).await
}

/// Extension methods for Router to add identity and page guards
pub trait AuthRouterExt {
    fn with_auth(self, state: AppState) -> Self;
    fn require_section(self, section: Section) -> Self;
}

impl AuthRouterExt for axum::Router<AppState> {
    fn with_auth(self, state: AppState) -> Self {
        self.route_layer(axum::middleware::from_fn_with_state(state, auth_middleware))
    }

    fn require_section(self, section: Section) -> Self {
        self.route_layer(axum::middleware::from_fn_with_state(section, section_guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(AuthConfig {
            jwt_secret: "unit_test_secret_with_enough_entropy_0123456789".to_string(),
            issuer: "oms-portal".to_string(),
            audience: "oms-portal-users".to_string(),
            token_ttl: std::time::Duration::from_secs(600),
        })
    }

    fn profile(role: &str) -> profile::Model {
        profile::Model {
            id: Uuid::new_v4(),
            email: "ops@example.com".to_string(),
            full_name: Some("Olga Park".to_string()),
            role: role.to_string(),
            customer_id: None,
            password_hash: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trips_profile_id() {
        let auth = service();
        let p = profile("ops");
        let token = auth.issue_token(&p).unwrap();
        let claims = auth.validate_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, p.id.to_string());
        assert_eq!(token.token_type, "Bearer");
    }

    #[test]
    fn foreign_token_is_rejected() {
        let auth = service();
        let other = AuthService::new(AuthConfig {
            jwt_secret: "another_secret_that_is_long_enough_abcdefghij".to_string(),
            ..auth.config.clone()
        });
        let token = other.issue_token(&profile("admin")).unwrap();
        assert!(matches!(
            auth.validate_token(&token.access_token),
            Err(ServiceError::Unauthenticated)
        ));
    }

    #[test]
    fn password_hash_verifies() {
        let auth = service();
        let hash = auth.hash_password("correct horse").unwrap();
        assert!(auth.verify_password("correct horse", &hash));
        assert!(!auth.verify_password("wrong", &hash));
        assert!(!auth.verify_password("x", "not-a-hash"));
    }

    #[test]
    fn unknown_role_is_not_a_valid_session() {
        assert!(Viewer::from_profile(&profile("superuser")).is_err());
        let viewer = Viewer::from_profile(&profile("finance")).unwrap();
        assert_eq!(viewer.role, Role::Finance);
        assert_eq!(viewer.scope(), DataScope::Everything);
        assert_eq!(viewer.initials(), "OP");
    }

    #[test]
    fn clients_are_scoped_to_their_customer() {
        let mut p = profile("client");
        let customer = Uuid::new_v4();
        p.customer_id = Some(customer);
        let viewer = Viewer::from_profile(&p).unwrap();
        assert_eq!(viewer.scope(), DataScope::Customer(Some(customer)));
        assert!(viewer.require(Capability::PlaceOrder).is_ok());
        assert!(matches!(
            viewer.require(Capability::CreateInvoice),
            Err(ServiceError::Forbidden(_))
        ));
    }
}
