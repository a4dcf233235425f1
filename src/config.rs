use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::info;
use validator::{Validate, ValidationError, ValidationErrors};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEV_DEFAULT_JWT_SECRET: &str = "development_only_portal_secret_9f83kq20xm4v7b1z";

/// Application configuration
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection URL
    #[validate(length(min = 1))]
    pub database_url: String,

    /// Secret used to sign session tokens
    #[validate(custom = "validate_jwt_secret")]
    pub jwt_secret: String,

    /// Session token lifetime in seconds
    #[validate(range(min = 60))]
    pub jwt_expiration: usize,

    #[serde(default = "default_auth_issuer")]
    pub auth_issuer: String,

    #[serde(default = "default_auth_audience")]
    pub auth_audience: String,

    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    #[validate(range(min = 1, max = 65535))]
    pub port: u16,

    /// Runtime environment (development, test, production)
    pub environment: String,

    /// Log level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,

    /// Run pending migrations during startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// Comma separated list of allowed CORS origins
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    #[serde(default = "default_db_max_connections")]
    #[validate(range(min = 1))]
    pub db_max_connections: u32,

    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,

    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,

    /// Currency code stamped on new orders and invoices
    #[serde(default = "default_currency")]
    #[validate(length(equal = 3))]
    pub default_currency: String,

    /// Payment term applied when the invoice form leaves it blank
    #[serde(default = "default_payment_terms")]
    pub default_payment_terms: String,

    /// Flat fee quoted for standard delivery on self-service orders
    #[serde(default = "default_standard_shipping_fee")]
    pub standard_shipping_fee: Decimal,

    /// Flat fee quoted for express delivery on self-service orders
    #[serde(default = "default_express_shipping_fee")]
    pub express_shipping_fee: Decimal,

    /// Number of rows in "recent" dashboard and analytics panels
    #[serde(default = "default_recent_activity_limit")]
    #[validate(range(min = 1, max = 100))]
    pub recent_activity_limit: u64,

    /// Stock above this level is shown as available on the order form
    #[serde(default = "default_low_stock_catalog_threshold")]
    pub low_stock_catalog_threshold: i32,
}

impl AppConfig {
    /// Builds a configuration with portal defaults, used by tests and tooling.
    pub fn new(database_url: String, jwt_secret: String, environment: String) -> Self {
        Self {
            database_url,
            jwt_secret,
            jwt_expiration: 3600,
            auth_issuer: default_auth_issuer(),
            auth_audience: default_auth_audience(),
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            environment,
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            cors_allowed_origins: None,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            default_currency: default_currency(),
            default_payment_terms: default_payment_terms(),
            standard_shipping_fee: default_standard_shipping_fee(),
            express_shipping_fee: default_express_shipping_fee(),
            recent_activity_limit: default_recent_activity_limit(),
            low_stock_catalog_threshold: default_low_stock_catalog_threshold(),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Explicit CORS origins, empty when none are configured
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.is_production() && self.jwt_secret.trim() == DEV_DEFAULT_JWT_SECRET {
            let mut err = ValidationError::new("jwt_secret_default_dev");
            err.message = Some(
                "The bundled development secret must not be used in production. Set APP__JWT_SECRET."
                    .into(),
            );
            errors.add("jwt_secret", err);
        }

        if self.db_min_connections > self.db_max_connections {
            let mut err = ValidationError::new("db_min_connections");
            err.message = Some("db_min_connections cannot exceed db_max_connections".into());
            errors.add("db_min_connections", err);
        }

        if self.standard_shipping_fee.is_sign_negative() || self.express_shipping_fee.is_sign_negative() {
            let mut err = ValidationError::new("shipping_fee");
            err.message = Some("Shipping fees cannot be negative".into());
            errors.add("standard_shipping_fee", err);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Runs derive-level and cross-field validation
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        self.validate()?;
        self.validate_additional_constraints()
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_db_max_connections() -> u32 {
    16
}
fn default_db_min_connections() -> u32 {
    2
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_db_idle_timeout_secs() -> u64 {
    600
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_payment_terms() -> String {
    "Net 30".to_string()
}

fn default_standard_shipping_fee() -> Decimal {
    dec!(8.00)
}

fn default_express_shipping_fee() -> Decimal {
    dec!(15.00)
}

fn default_recent_activity_limit() -> u64 {
    5
}

fn default_low_stock_catalog_threshold() -> i32 {
    10
}

fn default_auth_issuer() -> String {
    "oms-portal".to_string()
}

fn default_auth_audience() -> String {
    "oms-portal-users".to_string()
}

fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

fn validate_jwt_secret(secret: &str) -> Result<(), ValidationError> {
    let trimmed = secret.trim();

    if trimmed.len() < 32 {
        let mut err = ValidationError::new("jwt_secret");
        err.message = Some("JWT secret must be at least 32 characters".into());
        return Err(err);
    }

    let unique_chars: std::collections::HashSet<char> = trimmed.chars().collect();
    if unique_chars.len() < 10 {
        let mut err = ValidationError::new("jwt_secret");
        err.message = Some("JWT secret must have at least 10 unique characters".into());
        return Err(err);
    }

    Ok(())
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("oms_portal={},tower_http=debug,sqlx=warn", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let filter = EnvFilter::new(filter_directive);
    if json {
        let _ = fmt().with_env_filter(filter).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter).try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("APP_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let mut builder = Config::builder()
        .set_default("database_url", "sqlite://oms_portal.db?mode=rwc")?
        .set_default("jwt_expiration", 3600)?
        .set_default("host", "0.0.0.0")?
        .set_default("port", DEFAULT_PORT as i64)?
        .set_default("environment", run_env.as_str())?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?;

    // Only development falls back to the bundled secret.
    if run_env.eq_ignore_ascii_case(DEFAULT_ENV) {
        builder = builder.set_default("jwt_secret", DEV_DEFAULT_JWT_SECRET)?;
    }

    let config = builder
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;
    app_config.validate_all()?;

    info!(
        environment = %app_config.environment,
        host = %app_config.host,
        port = app_config.port,
        "Configuration loaded"
    );
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AppConfig {
        AppConfig::new(
            "sqlite::memory:".to_string(),
            "unit_test_secret_with_enough_entropy_0123456789".to_string(),
            "test".to_string(),
        )
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = sample();
        assert!(cfg.validate_all().is_ok());
        assert_eq!(cfg.default_payment_terms, "Net 30");
        assert_eq!(cfg.standard_shipping_fee, dec!(8));
        assert_eq!(cfg.express_shipping_fee, dec!(15));
    }

    #[test]
    fn short_secret_is_rejected() {
        let mut cfg = sample();
        cfg.jwt_secret = "too-short".to_string();
        assert!(cfg.validate_all().is_err());
    }

    #[test]
    fn dev_secret_rejected_in_production() {
        let mut cfg = sample();
        cfg.environment = "production".to_string();
        cfg.jwt_secret = DEV_DEFAULT_JWT_SECRET.to_string();
        let errors = cfg.validate_all().unwrap_err();
        assert!(errors.field_errors().contains_key("jwt_secret"));
    }

    #[test]
    fn pool_bounds_are_checked() {
        let mut cfg = sample();
        cfg.db_min_connections = 20;
        cfg.db_max_connections = 4;
        assert!(cfg.validate_all().is_err());
    }

    #[test]
    fn cors_origins_are_trimmed() {
        let mut cfg = sample();
        cfg.cors_allowed_origins = Some(" https://a.example , ,https://b.example".to_string());
        assert_eq!(
            cfg.cors_origins(),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }
}
