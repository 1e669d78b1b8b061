//! # Tank Ledger
//!
//! The only code that changes `tanks.current_level`.
//!
//! ```text
//!  delivery ────────── +Δ ──┐
//!  readings (per tank) ─ −Δ ─┼──► apply_delta(conn, tank, Δ) ──► conditional UPDATE
//!  sales submission ──── −Δ ─┘                                    │
//!                                                        0 rows ◄─┘
//!                                                          │
//!                                    NotFound / InvalidDelivery / InsufficientFuel
//! ```
//!
//! Callers run `apply_delta` inside their own transaction, so a ledger
//! failure rolls back whatever else the operation wrote.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::{debug, info};

use super::config::ServiceContext;
use super::error::ServiceResult;
use crate::repository::tank;
use petro_core::{CoreError, Tank, ValidationError, LITER_EPSILON};

/// Atomic tank level adjustments.
#[derive(Debug, Clone)]
pub struct TankLedger {
    ctx: ServiceContext,
}

impl TankLedger {
    pub fn new(ctx: ServiceContext) -> Self {
        TankLedger { ctx }
    }

    /// Applies a signed delta in its own transaction and returns the tank.
    ///
    /// Positive deltas are checked against capacity, negative ones against
    /// empty.
    pub async fn apply_delta(&self, tank_id: &str, delta: f64) -> ServiceResult<Tank> {
        let now = self.ctx.now();
        let mut tx = self.ctx.begin_write().await?;

        let tank = apply_delta(&mut tx, tank_id, delta, now).await?;

        tx.commit().await?;
        info!(tank_id = %tank_id, delta, level = tank.current_level, "Tank level adjusted");
        Ok(tank)
    }
}

/// Adds `delta` liters to a tank within the caller's transaction.
///
/// ## Errors
/// - `NotFound` if the tank does not exist
/// - `InvalidDelivery` if a credit would exceed capacity
/// - `InsufficientFuel` if a debit would go below zero
pub(crate) async fn apply_delta(
    conn: &mut SqliteConnection,
    tank_id: &str,
    delta: f64,
    now: DateTime<Utc>,
) -> ServiceResult<Tank> {
    if !delta.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "delta".to_string(),
        }
        .into());
    }

    if delta.abs() > LITER_EPSILON {
        let changed = tank::apply_delta(conn, tank_id, delta, now).await?;

        if changed == 0 {
            let current = tank::get(conn, tank_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Tank", tank_id))?;
            return Err(bound_error(&current, delta).into());
        }
    }

    let updated = tank::get(conn, tank_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Tank", tank_id))?;

    debug!(tank_id = %tank_id, delta, level = updated.current_level, "Ledger applied");
    Ok(updated)
}

/// Explains why `delta` cannot be applied to `tank`.
pub(crate) fn bound_error(tank: &Tank, delta: f64) -> CoreError {
    if delta > 0.0 {
        CoreError::InvalidDelivery {
            capacity: tank.capacity.unwrap_or(f64::INFINITY),
            current: tank.current_level,
            delivered: delta,
            new_total: tank.current_level + delta,
        }
    } else {
        CoreError::InsufficientFuel {
            fuel_type: tank.fuel_type,
            current: tank.current_level,
            needed: -delta,
        }
    }
}
