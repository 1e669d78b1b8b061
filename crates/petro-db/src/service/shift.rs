//! # Shift Resolver
//!
//! Finds or creates the live shift of a station.
//!
//! ## Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  inventory path (MidnightNoon)        cash-entry path (SixToSix)        │
//! │  ─────────────────────────────        ─────────────────────────         │
//! │  window = bucket(now)                 any OPEN shift of the station?    │
//! │  OPEN/CLOSED shift in window?           └── yes → reuse                 │
//! │    └── yes → reuse                    insert OPEN shift, type from now  │
//! │  insert OPEN shift at window start                                      │
//! │  seed one sale row per nozzle                                           │
//! │                                                                         │
//! │  INSERT hits idx_shifts_open_window ──► another resolver won the race   │
//! │                                     ──► look up again (bounded)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::config::{ServiceConfig, ServiceContext};
use super::error::{ServiceError, ServiceResult};
use super::sales;
use crate::error::DbError;
use crate::repository::{shift, station};
use petro_core::{CoreError, Shift, ShiftStatus, ShiftWindow, ShiftWindowPolicy};

/// Resolves the live shift of a station for each call path.
#[derive(Debug, Clone)]
pub struct ShiftResolver {
    ctx: ServiceContext,
}

impl ShiftResolver {
    pub fn new(ctx: ServiceContext) -> Self {
        ShiftResolver { ctx }
    }

    /// Shift for readings and sales, creating it (and its sale rows) if needed.
    pub async fn resolve_inventory_shift(&self, station_id: &str) -> ServiceResult<Shift> {
        let now = self.ctx.now();
        let mut tx = self.ctx.begin_write().await?;

        let shift = resolve_inventory_in(&mut tx, &self.ctx.config, station_id, now).await?;

        tx.commit().await?;
        Ok(shift)
    }

    /// Shift for cash entry: any OPEN shift, else a new one.
    pub async fn resolve_cash_shift(&self, station_id: &str) -> ServiceResult<Shift> {
        let now = self.ctx.now();
        let mut tx = self.ctx.begin_write().await?;

        let shift = resolve_cash_in(&mut tx, &self.ctx.config, station_id, now).await?;

        tx.commit().await?;
        Ok(shift)
    }

    /// Fetches a shift or fails with `ShiftNotFound`.
    pub async fn get(&self, shift_id: &str) -> ServiceResult<Shift> {
        let mut conn = self.ctx.pool.acquire().await?;
        require(&mut conn, shift_id).await
    }
}

/// Loads a shift or fails with `ShiftNotFound`.
pub(crate) async fn require(conn: &mut SqliteConnection, shift_id: &str) -> ServiceResult<Shift> {
    shift::get(conn, shift_id)
        .await?
        .ok_or_else(|| CoreError::ShiftNotFound(shift_id.to_string()).into())
}

async fn require_station(conn: &mut SqliteConnection, station_id: &str) -> ServiceResult<()> {
    station::get(conn, station_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Station", station_id))?;
    Ok(())
}

pub(crate) async fn resolve_inventory_in(
    conn: &mut SqliteConnection,
    config: &ServiceConfig,
    station_id: &str,
    now: DateTime<Utc>,
) -> ServiceResult<Shift> {
    require_station(conn, station_id).await?;
    let window = ShiftWindowPolicy::MidnightNoon.window_at(now, config.utc_offset);

    for attempt in 1..=config.shift_resolve_attempts {
        if let Some(existing) =
            shift::find_in_window(conn, station_id, window.shift_type, window.start).await?
        {
            debug!(shift_id = %existing.id, status = %existing.status, "Reusing inventory shift");
            return Ok(existing);
        }

        let candidate = new_shift(station_id, &window, window.start, now);
        match shift::insert(conn, &candidate).await {
            Ok(()) => {
                let seeded = sales::seed_in(conn, config, &candidate, now).await?;
                info!(
                    shift_id = %candidate.id,
                    station_id = %station_id,
                    shift_type = %candidate.shift_type,
                    seeded,
                    "Opened inventory shift"
                );
                return Ok(candidate);
            }
            Err(err) if err.is_unique_violation() => {
                warn!(station_id = %station_id, attempt, "Lost shift creation race, retrying lookup");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(race_exhausted(station_id))
}

pub(crate) async fn resolve_cash_in(
    conn: &mut SqliteConnection,
    config: &ServiceConfig,
    station_id: &str,
    now: DateTime<Utc>,
) -> ServiceResult<Shift> {
    require_station(conn, station_id).await?;
    let window = ShiftWindowPolicy::SixToSix.window_at(now, config.utc_offset);

    for attempt in 1..=config.shift_resolve_attempts {
        if let Some(open) = shift::find_open(conn, station_id).await? {
            debug!(shift_id = %open.id, "Reusing open shift for cash entry");
            return Ok(open);
        }

        let candidate = new_shift(station_id, &window, now, now);
        match shift::insert(conn, &candidate).await {
            Ok(()) => {
                info!(
                    shift_id = %candidate.id,
                    station_id = %station_id,
                    shift_type = %candidate.shift_type,
                    "Opened cash-entry shift"
                );
                return Ok(candidate);
            }
            Err(err) if err.is_unique_violation() => {
                warn!(station_id = %station_id, attempt, "Lost shift creation race, retrying lookup");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(race_exhausted(station_id))
}

fn new_shift(
    station_id: &str,
    window: &ShiftWindow,
    start_time: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Shift {
    Shift {
        id: Uuid::new_v4().to_string(),
        station_id: station_id.to_string(),
        shift_type: window.shift_type,
        window_start: window.start,
        start_time,
        end_time: None,
        status: ShiftStatus::Open,
        locked: false,
        locked_by: None,
        locked_at: None,
        created_at: now,
    }
}

fn race_exhausted(station_id: &str) -> ServiceError {
    DbError::duplicate("shifts.station_id, shifts.shift_type, shifts.window_start", station_id)
        .into()
}
