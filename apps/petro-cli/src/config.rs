//! # CLI Configuration
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`PETRO_*`, e.g. `PETRO_DATABASE_PATH`)
//! 2. Config file (`--config`, else `./petro.toml` when present)
//! 3. Defaults (this file)
//!
//! ```toml
//! database_path = "/var/lib/petro/petro.db"
//! jwt_secret = "change-me"
//! station_utc_offset_minutes = 180
//! fallback_price_cents = 10000
//! shift_resolve_attempts = 3
//! receipt_dir = "/var/lib/petro/receipts"
//! ```

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use petro_core::{Money, DEFAULT_FALLBACK_PRICE};
use petro_db::{DbConfig, ServiceConfig};

/// Tokens stay valid for a week.
pub const DEFAULT_JWT_LIFETIME_SECS: i64 = 7 * 24 * 60 * 60;

const DEFAULT_CONFIG_FILE: &str = "petro";
const DEV_JWT_SECRET: &str = "petro-dev-secret-change-in-production";

/// Settings for one CLI invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// SQLite database file.
    pub database_path: PathBuf,

    /// Pool size.
    pub max_connections: u32,

    /// HS256 signing key for bearer tokens.
    pub jwt_secret: String,

    pub jwt_lifetime_secs: i64,

    /// Station local time offset; both shift window policies use it.
    pub station_utc_offset_minutes: i32,

    /// Price snapshot used when no fuel price is registered.
    pub fallback_price_cents: i64,

    /// Retries when two writers race to open the same shift.
    pub shift_resolve_attempts: u32,

    /// Where deposit receipts are copied to.
    pub receipt_dir: PathBuf,
}

impl CliConfig {
    /// Loads defaults, then the config file, then `PETRO_*` variables.
    ///
    /// An explicit `path` must exist; the default `petro.toml` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let loaded: CliConfig = Config::builder()
            .set_default("database_path", "./petro.db")?
            .set_default("max_connections", 5_i64)?
            .set_default("jwt_secret", DEV_JWT_SECRET)?
            .set_default("jwt_lifetime_secs", DEFAULT_JWT_LIFETIME_SECS)?
            .set_default("station_utc_offset_minutes", 0_i64)?
            .set_default("fallback_price_cents", DEFAULT_FALLBACK_PRICE.cents())?
            .set_default("shift_resolve_attempts", 3_i64)?
            .set_default("receipt_dir", "./receipts")?
            .add_source(file)
            .add_source(Environment::with_prefix("PETRO").try_parsing(true))
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        Ok(loaded)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::InvalidValue("jwt_secret".to_string()));
        }
        if self.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("jwt_lifetime_secs".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections".to_string()));
        }
        if self.fallback_price_cents <= 0 {
            return Err(ConfigError::InvalidValue("fallback_price_cents".to_string()));
        }
        Ok(())
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.max_connections)
    }

    pub fn service_config(&self) -> Result<ServiceConfig, ConfigError> {
        let config = ServiceConfig::default()
            .with_utc_offset_minutes(self.station_utc_offset_minutes)
            .map_err(|_| ConfigError::InvalidValue("station_utc_offset_minutes".to_string()))?
            .with_fallback_price(Money::from_cents(self.fallback_price_cents))
            .with_shift_resolve_attempts(self.shift_resolve_attempts);
        Ok(config)
    }

    /// Whether the built-in development secret is still in use.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}
