//! # Service Configuration
//!
//! Settings shared by every service, plus the context each one holds.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::sync::Arc;

use petro_core::{Clock, Money, ValidationError, DEFAULT_FALLBACK_PRICE};

/// Tunables for the transactional services.
///
/// ## Example
/// ```rust
/// use petro_db::service::ServiceConfig;
///
/// let config = ServiceConfig::default().with_utc_offset_minutes(180).unwrap();
/// assert_eq!(config.utc_offset.local_minus_utc(), 3 * 3600);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ServiceConfig {
    /// Station local time, used to bucket shifts into windows.
    pub utc_offset: FixedOffset,

    /// Price snapshot when no fuel price is registered.
    pub fallback_price: Money,

    /// How many times a resolver re-reads after losing a shift-creation race.
    pub shift_resolve_attempts: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            utc_offset: Utc.fix(),
            fallback_price: DEFAULT_FALLBACK_PRICE,
            shift_resolve_attempts: 3,
        }
    }
}

impl ServiceConfig {
    /// Sets the station's offset from UTC in minutes (`180` = UTC+3).
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Result<Self, ValidationError> {
        self.utc_offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "station_utc_offset_minutes".to_string(),
                reason: format!("{minutes} is outside ±24h"),
            })?;
        Ok(self)
    }

    pub fn with_fallback_price(mut self, price: Money) -> Self {
        self.fallback_price = price;
        self
    }

    pub fn with_shift_resolve_attempts(mut self, attempts: u32) -> Self {
        self.shift_resolve_attempts = attempts.max(1);
        self
    }
}

/// What every service holds: the pool, the settings and the clock.
#[derive(Debug, Clone)]
pub struct ServiceContext {
    pub(crate) pool: SqlitePool,
    pub(crate) config: ServiceConfig,
    pub(crate) clock: Arc<dyn Clock>,
}

impl ServiceContext {
    pub fn new(pool: SqlitePool, config: ServiceConfig, clock: Arc<dyn Clock>) -> Self {
        ServiceContext {
            pool,
            config,
            clock,
        }
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Opens a write transaction holding SQLite's write lock from `BEGIN`.
    ///
    /// A second writer waits out the busy timeout here instead of failing
    /// with `SQLITE_BUSY` when its first write meets a stale snapshot.
    pub(crate) async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin_with("BEGIN IMMEDIATE").await
    }
}
