//! Configuration management for the Bakery Admin backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with BAKERY_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub jwt: JwtConfig,

    /// Image hosting account
    pub cloudinary: CloudinaryConfig,

    pub stock: StockConfig,

    pub payments: PaymentsConfig,

    /// First administrator, created at startup when missing
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,

    pub host: String,

    /// `pretty` or `json`
    pub log_format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing access tokens
    pub secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiration in seconds
    pub refresh_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,

    /// Signed uploads and deletes need both key and secret
    pub api_key: Option<String>,
    pub api_secret: Option<String>,

    /// Preset used for unsigned uploads
    pub upload_preset: String,

    pub folder: String,

    pub api_base: String,
}

impl CloudinaryConfig {
    pub fn has_credentials(&self) -> bool {
        matches!((&self.api_key, &self.api_secret), (Some(k), Some(s)) if !k.is_empty() && !s.is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StockConfig {
    /// Days ahead of expiry at which a batch counts as expiring soon
    pub expiry_warning_days: i64,

    /// Default number of ledger entries returned by history queries
    pub history_limit: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentsConfig {
    /// Payment method whose orders go through manual verification
    pub verification_method: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BootstrapConfig {
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub admin_name: Option<String>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("BAKERY_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.log_format", "pretty")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.access_token_expiry", 3600)?
            .set_default("jwt.refresh_token_expiry", 604800)?
            .set_default("cloudinary.cloud_name", "")?
            .set_default("cloudinary.upload_preset", "bakery_unsigned")?
            .set_default("cloudinary.folder", "bakery-admin")?
            .set_default("cloudinary.api_base", "https://api.cloudinary.com/v1_1")?
            .set_default("stock.expiry_warning_days", shared::EXPIRY_WARNING_DAYS)?
            .set_default("stock.history_limit", 50)?
            .set_default("payments.verification_method", "gcash")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (BAKERY_ prefix)
            .add_source(
                Environment::with_prefix("BAKERY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Configuration used by tests and local tooling
    pub fn for_tests() -> Self {
        Self {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: "postgres://localhost/bakery_admin_test".to_string(),
                max_connections: 2,
                min_connections: 1,
            },
            jwt: JwtConfig {
                secret: "test-secret".to_string(),
                access_token_expiry: 3600,
                refresh_token_expiry: 604800,
            },
            cloudinary: CloudinaryConfig {
                cloud_name: "demo".to_string(),
                api_key: None,
                api_secret: None,
                upload_preset: "bakery_unsigned".to_string(),
                folder: "bakery-admin".to_string(),
                api_base: "https://api.cloudinary.com/v1_1".to_string(),
            },
            stock: StockConfig {
                expiry_warning_days: shared::EXPIRY_WARNING_DAYS,
                history_limit: 50,
            },
            payments: PaymentsConfig {
                verification_method: "gcash".to_string(),
            },
            bootstrap: BootstrapConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}
