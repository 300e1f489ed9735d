use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::db::Environment;

/// Longest accepted token lifetime: one year
pub const MAX_TOKEN_TTL_HOURS: i64 = 8760;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// `development` exposes GraphiQL and detailed database errors
    #[serde(default)]
    pub environment: Environment,
    /// Origins allowed to call the API from a browser. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            environment: Environment::default(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign access tokens
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token lifetime in hours
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    /// Seed an administrator with these credentials on startup
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    #[serde(default = "default_admin_name")]
    pub admin_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_hours: default_token_ttl_hours(),
            admin_email: None,
            admin_password: None,
            admin_name: default_admin_name(),
        }
    }
}

fn default_jwt_secret() -> String {
    // Tokens do not survive a restart unless a secret is configured
    uuid::Uuid::new_v4().to_string()
}

fn default_token_ttl_hours() -> i64 {
    24 * 7
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    /// Surcharge per extra guest per night
    #[serde(default = "default_extra_guest_fee")]
    pub extra_guest_fee: f64,
    /// Tax rate applied to room price plus surcharges
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,
    /// Currency symbol used in quote summaries
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            extra_guest_fee: default_extra_guest_fee(),
            tax_rate: default_tax_rate(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

fn default_extra_guest_fee() -> f64 {
    500.0
}

fn default_tax_rate() -> f64 {
    0.10
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingConfig {
    /// Require every night of a stay to be marked available before booking
    #[serde(default)]
    pub enforce_availability: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).with_context(|| "Failed to parse configuration file")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the service misbehave at runtime
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.len() < 16 {
            bail!("auth.jwt_secret must be at least 16 characters");
        }
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&self.auth.token_ttl_hours) {
            bail!(
                "auth.token_ttl_hours must be between 1 and {}",
                MAX_TOKEN_TTL_HOURS
            );
        }
        if self.auth.admin_email.is_some() != self.auth.admin_password.is_some() {
            bail!("auth.admin_email and auth.admin_password must be set together");
        }
        if !(self.pricing.tax_rate >= 0.0 && self.pricing.tax_rate <= 1.0) {
            bail!("pricing.tax_rate must be between 0 and 1");
        }
        if !(self.pricing.extra_guest_fee >= 0.0) {
            bail!("pricing.extra_guest_fee must not be negative");
        }
        Ok(())
    }
}
