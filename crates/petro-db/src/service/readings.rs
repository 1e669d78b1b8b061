//! # Meter Reading Engine
//!
//! The physical-consumption track of a shift.
//!
//! ## Recording
//! ```text
//! record_readings(shift, station, [{nozzle, closing}])
//!   │
//!   ├─ shift missing → ShiftNotFound      shift locked → ShiftLocked
//!   │
//!   ├─ for each nozzle
//!   │    opening     = previous shift's closing for the nozzle, else 0
//!   │    consumption = closing − opening          (< 0 → InvalidReading)
//!   │    Δ           = consumption − consumption already on the row
//!   │    upsert reading row
//!   │    totals[nozzle.tank] += Δ
//!   │
//!   └─ one ledger debit per tank (totals, in tank id order)
//! ```
//!
//! Only the change against what the row already held reaches the tank, so
//! re-recording or correcting a reading never counts fuel twice.

use sqlx::SqliteConnection;
use tracing::{debug, info};
use uuid::Uuid;

use super::config::{ServiceConfig, ServiceContext};
use super::error::ServiceResult;
use super::ledger;
use super::shift::require;
use crate::repository::{nozzle, price, reading, sale, shift as shift_repo};
use petro_core::metering::{consumption, consumption_delta, TankTotals};
use petro_core::reconcile::ShiftReconciliation;
use petro_core::{CoreError, Nozzle, NozzleReading, ReadingInput, Shift, ValidationError};

/// Meter readings, shift locking and per-tank consumption.
#[derive(Debug, Clone)]
pub struct MeterReadingEngine {
    ctx: ServiceContext,
}

impl MeterReadingEngine {
    pub fn new(ctx: ServiceContext) -> Self {
        MeterReadingEngine { ctx }
    }

    /// Records closing meter values for a shift and debits the tanks.
    ///
    /// The whole batch is one transaction: a single bad reading leaves every
    /// reading and tank as it was.
    ///
    /// ## Errors
    /// - `ShiftNotFound` / `ShiftLocked`
    /// - `NotFound` for an unknown nozzle
    /// - `Validation` if the shift or a nozzle belongs to another station
    /// - `InvalidReading` if a closing value is below its opening value
    /// - `InsufficientFuel` if a tank cannot cover the consumption
    pub async fn record_readings(
        &self,
        shift_id: &str,
        station_id: &str,
        inputs: &[ReadingInput],
    ) -> ServiceResult<Vec<NozzleReading>> {
        let now = self.ctx.now();
        let mut tx = self.ctx.begin_write().await?;

        let shift = require_unlocked(&mut tx, shift_id).await?;
        if shift.station_id != station_id {
            return Err(station_mismatch("shift_id", shift_id, station_id).into());
        }
        let previous = shift_repo::previous(&mut tx, &shift).await?;

        let mut totals = TankTotals::new();
        for input in inputs {
            let nozzle = nozzle::get(&mut tx, &input.nozzle_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Nozzle", input.nozzle_id.as_str()))?;
            if nozzle.station_id != station_id {
                return Err(station_mismatch("nozzle_id", &nozzle.id, station_id).into());
            }
            check_meter_limit(&nozzle, input.closing_reading)?;

            let opening = match &previous {
                Some(prev) => reading::closing_for(&mut tx, &prev.id, &nozzle.id)
                    .await?
                    .unwrap_or(0.0),
                None => 0.0,
            };
            let liters = consumption(&nozzle.name, opening, input.closing_reading)?;

            let delta = match reading::find(&mut tx, shift_id, &nozzle.id).await? {
                Some(existing) => {
                    reading::update_meters(
                        &mut tx,
                        &existing.id,
                        opening,
                        input.closing_reading,
                        liters,
                        now,
                    )
                    .await?;
                    consumption_delta(existing.consumption, liters)
                }
                None => {
                    let snapshot = price_snapshot(&mut tx, &self.ctx.config, &shift, &nozzle).await?;
                    reading::insert(
                        &mut tx,
                        &NozzleReading {
                            id: Uuid::new_v4().to_string(),
                            shift_id: shift_id.to_string(),
                            nozzle_id: nozzle.id.clone(),
                            opening_reading: opening,
                            closing_reading: Some(input.closing_reading),
                            consumption: Some(liters),
                            is_rollover: false,
                            price_per_liter_cents: Some(snapshot),
                            created_at: now,
                            updated_at: now,
                        },
                    )
                    .await?;
                    liters
                }
            };

            debug!(
                shift_id = %shift_id,
                nozzle = %nozzle.name,
                opening,
                closing = input.closing_reading,
                delta,
                "Reading recorded"
            );
            totals.add(&nozzle.tank_id, delta);
        }

        for (tank_id, liters) in totals.iter() {
            ledger::apply_delta(&mut tx, tank_id, -liters, now).await?;
        }

        let readings = reading::list_for_shift(&mut tx, shift_id).await?;
        tx.commit().await?;

        info!(shift_id = %shift_id, count = inputs.len(), "Meter readings recorded");
        Ok(readings)
    }

    /// Corrects the closing value of one reading.
    ///
    /// Only the difference between the old and new consumption is applied to
    /// the tank, so repeating the same correction changes nothing.
    pub async fn update_reading(
        &self,
        shift_id: &str,
        reading_id: &str,
        new_closing: f64,
    ) -> ServiceResult<NozzleReading> {
        let now = self.ctx.now();
        let mut tx = self.ctx.begin_write().await?;

        require_unlocked(&mut tx, shift_id).await?;

        let existing = reading::get(&mut tx, reading_id)
            .await?
            .ok_or_else(|| CoreError::not_found("NozzleReading", reading_id))?;
        if existing.shift_id != shift_id {
            return Err(CoreError::ReadingShiftMismatch {
                reading_id: reading_id.to_string(),
                shift_id: shift_id.to_string(),
            }
            .into());
        }

        let nozzle = nozzle::get(&mut tx, &existing.nozzle_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Nozzle", existing.nozzle_id.as_str()))?;
        check_meter_limit(&nozzle, new_closing)?;

        let liters = consumption(&nozzle.name, existing.opening_reading, new_closing)?;
        let delta = consumption_delta(existing.consumption, liters);

        reading::update_meters(&mut tx, reading_id, existing.opening_reading, new_closing, liters, now)
            .await?;
        let tank = ledger::apply_delta(&mut tx, &nozzle.tank_id, -delta, now).await?;

        let updated = reading::get(&mut tx, reading_id)
            .await?
            .ok_or_else(|| CoreError::not_found("NozzleReading", reading_id))?;
        tx.commit().await?;

        info!(
            reading_id = %reading_id,
            delta,
            tank_id = %tank.id,
            level = tank.current_level,
            "Reading corrected"
        );
        Ok(updated)
    }

    /// Locks a shift against further readings and sales edits.
    pub async fn lock_shift(&self, shift_id: &str, user_id: &str) -> ServiceResult<Shift> {
        let now = self.ctx.now();
        let mut tx = self.ctx.begin_write().await?;

        require(&mut tx, shift_id).await?;
        shift_repo::lock(&mut tx, shift_id, user_id, now).await?;
        let shift = require(&mut tx, shift_id).await?;

        tx.commit().await?;
        info!(shift_id = %shift_id, locked_by = %user_id, "Shift locked");
        Ok(shift)
    }

    /// Reopens a locked shift for corrections; it stays CLOSED.
    pub async fn unlock_shift(&self, shift_id: &str, user_id: &str) -> ServiceResult<Shift> {
        let mut tx = self.ctx.begin_write().await?;

        require(&mut tx, shift_id).await?;
        shift_repo::unlock(&mut tx, shift_id, user_id).await?;
        let shift = require(&mut tx, shift_id).await?;

        tx.commit().await?;
        info!(shift_id = %shift_id, unlocked_by = %user_id, "Shift unlocked");
        Ok(shift)
    }

    pub async fn shift_readings(&self, shift_id: &str) -> ServiceResult<Vec<NozzleReading>> {
        let mut conn = self.ctx.pool.acquire().await?;
        require(&mut conn, shift_id).await?;
        Ok(reading::list_for_shift(&mut conn, shift_id).await?)
    }

    /// Metered consumption against sold quantity, per nozzle.
    pub async fn reconcile_shift(&self, shift_id: &str) -> ServiceResult<ShiftReconciliation> {
        let mut conn = self.ctx.pool.acquire().await?;
        require(&mut conn, shift_id).await?;

        let readings = reading::list_for_shift(&mut conn, shift_id).await?;
        let sales = sale::list_for_shift(&mut conn, shift_id).await?;
        Ok(ShiftReconciliation::build(shift_id, &readings, &sales))
    }
}

async fn require_unlocked(conn: &mut SqliteConnection, shift_id: &str) -> ServiceResult<Shift> {
    let shift = require(conn, shift_id).await?;
    if shift.locked {
        return Err(CoreError::ShiftLocked(shift.id).into());
    }
    Ok(shift)
}

async fn price_snapshot(
    conn: &mut SqliteConnection,
    config: &ServiceConfig,
    shift: &Shift,
    nozzle: &Nozzle,
) -> ServiceResult<i64> {
    let cents = price::current(conn, &shift.station_id, nozzle.fuel_type)
        .await?
        .map(|p| p.price_per_liter_cents)
        .unwrap_or_else(|| config.fallback_price.cents());
    Ok(cents)
}

fn check_meter_limit(nozzle: &Nozzle, closing: f64) -> Result<(), ValidationError> {
    if closing > nozzle.meter_limit {
        return Err(ValidationError::InvalidFormat {
            field: "closing_reading".to_string(),
            reason: format!("{closing} is above the meter limit {} of {}", nozzle.meter_limit, nozzle.name),
        });
    }
    Ok(())
}

fn station_mismatch(field: &str, id: &str, station_id: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("{id} does not belong to station {station_id}"),
    }
}
