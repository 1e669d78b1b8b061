//! # Nozzle Sales Engine
//!
//! The revenue track of a shift.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  shift opens ──► seed_in(): one row per nozzle, price snapshot          │
//! │                  (current price for the fuel type, else fallback)       │
//! │                                                                         │
//! │  manager edits ──► update_sale(): quantity / card / cash                │
//! │                                                                         │
//! │  submit_sales(shift) ─── one transaction ──────────────────────────┐    │
//! │    │ shift locked?               → ShiftLocked                     │    │
//! │    │ Σ quantity per tank                                            │    │
//! │    │ any tank short?             → InsufficientFuel (nothing done) │    │
//! │    │ debit every tank via ledger                                   │    │
//! │    │ shift → CLOSED, locked, end_time = now                        │    │
//! │    └ compare with meter readings, warn on variance ────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqliteConnection;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::config::{ServiceConfig, ServiceContext};
use super::error::ServiceResult;
use super::ledger;
use super::shift::require;
use crate::repository::{nozzle, price, reading, sale, shift as shift_repo, tank};
use petro_core::reconcile::ShiftReconciliation;
use petro_core::validation::{validate_amount, validate_liters};
use petro_core::{CoreError, NozzleSale, SaleUpdate, Shift, Tank};

/// Result of a successful sales submission.
#[derive(Debug, Clone, Serialize)]
pub struct SalesSubmission {
    pub shift: Shift,
    /// Tanks after their debit, in tank id order.
    pub tanks: Vec<Tank>,
    pub reconciliation: ShiftReconciliation,
}

/// Per-nozzle sales for a shift.
#[derive(Debug, Clone)]
pub struct NozzleSalesEngine {
    ctx: ServiceContext,
}

impl NozzleSalesEngine {
    pub fn new(ctx: ServiceContext) -> Self {
        NozzleSalesEngine { ctx }
    }

    /// Seeds sale rows for every nozzle of the shift's station.
    ///
    /// Rows that already exist are left untouched.
    pub async fn initialize_sales(&self, shift_id: &str, station_id: &str) -> ServiceResult<Vec<NozzleSale>> {
        let now = self.ctx.now();
        let mut tx = self.ctx.begin_write().await?;

        let shift = require(&mut tx, shift_id).await?;
        if shift.station_id != station_id {
            return Err(CoreError::not_found("Shift for station", station_id).into());
        }
        seed_in(&mut tx, &self.ctx.config, &shift, now).await?;
        let sales = sale::list_for_shift(&mut tx, shift_id).await?;

        tx.commit().await?;
        Ok(sales)
    }

    /// Partial edit of one sale line. The total is derived by the store.
    ///
    /// ## Errors
    /// - `NotFound` if the sale does not exist
    /// - `ShiftLocked` once the shift's sales were submitted or it was locked
    /// - `Validation` for negative or non-finite values
    pub async fn update_sale(&self, sale_id: &str, update: SaleUpdate) -> ServiceResult<NozzleSale> {
        if let Some(quantity) = update.quantity_liters {
            validate_liters("quantity_liters", quantity)?;
        }
        if let Some(card) = update.card_amount {
            validate_amount("card_amount", card)?;
        }
        if let Some(cash) = update.cash_amount {
            validate_amount("cash_amount", cash)?;
        }

        let now = self.ctx.now();
        let mut tx = self.ctx.begin_write().await?;

        let existing = sale::get(&mut tx, sale_id)
            .await?
            .ok_or_else(|| CoreError::not_found("NozzleSale", sale_id))?;
        let shift = require(&mut tx, &existing.shift_id).await?;
        if shift.locked {
            return Err(CoreError::ShiftLocked(shift.id).into());
        }

        if !update.is_empty() {
            sale::update_partial(&mut tx, sale_id, &update, now).await?;
        }
        let updated = sale::get(&mut tx, sale_id)
            .await?
            .ok_or_else(|| CoreError::not_found("NozzleSale", sale_id))?;

        tx.commit().await?;
        debug!(sale_id = %sale_id, total_cents = updated.total_amount_cents, "Sale updated");
        Ok(updated)
    }

    /// Debits every tank by what was sold, then closes and locks the shift.
    ///
    /// Only liters not debited by an earlier submission move the ledger, so
    /// resubmitting after `unlock_shift` settles just the edits made since.
    /// All-or-nothing: on any error no tank moves and the shift stays as it was.
    pub async fn submit_sales(&self, shift_id: &str) -> ServiceResult<SalesSubmission> {
        let now = self.ctx.now();
        let mut tx = self.ctx.begin_write().await?;

        let shift = require(&mut tx, shift_id).await?;
        if shift.locked {
            return Err(CoreError::ShiftLocked(shift.id).into());
        }

        let sold = sale::unsubmitted_per_tank(&mut tx, shift_id).await?;

        // Check every tank before touching any of them.
        for (tank_id, liters) in &sold {
            let current = tank::get(&mut tx, tank_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Tank", tank_id.as_str()))?;
            let fits = if *liters >= 0.0 {
                current.can_supply(*liters)
            } else {
                current.can_receive(-liters)
            };
            if !fits {
                return Err(ledger::bound_error(&current, -liters).into());
            }
        }

        let mut tanks = Vec::with_capacity(sold.len());
        for (tank_id, liters) in &sold {
            tanks.push(ledger::apply_delta(&mut tx, tank_id, -liters, now).await?);
        }
        sale::mark_submitted(&mut tx, shift_id).await?;

        if shift_repo::close_and_lock(&mut tx, shift_id, now).await? == 0 {
            return Err(CoreError::ShiftLocked(shift_id.to_string()).into());
        }
        let shift = require(&mut tx, shift_id).await?;

        let readings = reading::list_for_shift(&mut tx, shift_id).await?;
        let sales = sale::list_for_shift(&mut tx, shift_id).await?;
        let reconciliation = ShiftReconciliation::build(shift_id, &readings, &sales);

        tx.commit().await?;

        for mismatch in reconciliation.mismatches() {
            warn!(
                shift_id = %shift_id,
                nozzle_id = %mismatch.nozzle_id,
                metered = ?mismatch.reading_consumption,
                sold = mismatch.sold_quantity,
                variance = mismatch.variance,
                "Sales and meter readings disagree"
            );
        }
        info!(shift_id = %shift_id, tanks = tanks.len(), "Sales submitted, shift closed");

        Ok(SalesSubmission {
            shift,
            tanks,
            reconciliation,
        })
    }

    pub async fn shift_sales(&self, shift_id: &str) -> ServiceResult<Vec<NozzleSale>> {
        let mut conn = self.ctx.pool.acquire().await?;
        require(&mut conn, shift_id).await?;
        Ok(sale::list_for_shift(&mut conn, shift_id).await?)
    }
}

/// Creates a sale row at the current price for every nozzle of the shift's
/// station. Returns how many rows were created.
pub(crate) async fn seed_in(
    conn: &mut SqliteConnection,
    config: &ServiceConfig,
    shift: &Shift,
    now: DateTime<Utc>,
) -> ServiceResult<usize> {
    let nozzles = nozzle::list_for_station(conn, &shift.station_id).await?;
    let mut created = 0;

    for nozzle in &nozzles {
        let price_cents = match price::current(conn, &shift.station_id, nozzle.fuel_type).await? {
            Some(price) => price.price_per_liter_cents,
            None => {
                warn!(
                    station_id = %shift.station_id,
                    fuel_type = %nozzle.fuel_type,
                    fallback = %config.fallback_price,
                    "No fuel price registered, using fallback price"
                );
                config.fallback_price.cents()
            }
        };

        let id = Uuid::new_v4().to_string();
        if sale::insert_seed(conn, &id, &shift.id, &nozzle.id, price_cents, now).await? {
            created += 1;
        }
    }

    Ok(created)
}
