//! # Cash Custody
//!
//! Moves a shift's cash from the station manager to the bank.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  create_transaction ──► PENDING_ACCEPTANCE   (no transfer yet)          │
//! │                              │                                          │
//! │  initiate_transfer ──────────┤  transfer row appears, status unchanged  │
//! │                              │                                          │
//! │  accept_cash (assigned AM) ──▼                                          │
//! │                           WITH_AM            transfer + transaction     │
//! │                              │                                          │
//! │  deposit_cash (receipt) ─────▼                                          │
//! │                           DEPOSITED          terminal                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each step reads the current state for a precise error, then writes with a
//! conditional UPDATE holding the same precondition. Both rows move in one
//! transaction.

use tracing::{info, warn};
use uuid::Uuid;

use super::config::ServiceContext;
use super::error::ServiceResult;
use super::shift::resolve_cash_in;
use crate::repository::{cash, user, CashRepository};
use petro_core::cash::{CashBreakdown, FloatingCash};
use petro_core::validation::validate_required;
use petro_core::{
    Actor, CashTransaction, CashTransfer, CoreError, CustodyStatus, NewCashTransaction, Role,
};

/// The cash custody workflow.
#[derive(Debug, Clone)]
pub struct CashCustody {
    ctx: ServiceContext,
}

impl CashCustody {
    pub fn new(ctx: ServiceContext) -> Self {
        CashCustody { ctx }
    }

    fn repo(&self) -> CashRepository {
        CashRepository::new(self.ctx.pool.clone())
    }

    /// Records the cash of the station's live shift.
    ///
    /// Resolves the shift with the cash-entry policy and stores the derived
    /// amounts in PENDING_ACCEPTANCE.
    ///
    /// ## Errors
    /// - `Validation` for negative inputs or card/bank amounts above what is available
    /// - `CashAlreadyRecorded` if the shift already has a transaction
    pub async fn create_transaction(
        &self,
        created_by: &str,
        input: NewCashTransaction,
    ) -> ServiceResult<CashTransaction> {
        let breakdown = CashBreakdown::compute(
            input.liters_sold,
            input.rate_per_liter,
            input.card_payments,
            input.bank_deposit,
        )?;

        let now = self.ctx.now();
        let mut tx = self.ctx.begin_write().await?;

        let shift = resolve_cash_in(&mut tx, &self.ctx.config, &input.station_id, now).await?;
        if cash::get_transaction_for_shift(&mut tx, &shift.id).await?.is_some() {
            return Err(CoreError::CashAlreadyRecorded(shift.id).into());
        }

        let transaction = CashTransaction {
            id: Uuid::new_v4().to_string(),
            shift_id: shift.id.clone(),
            station_id: input.station_id.clone(),
            liters_sold: input.liters_sold,
            rate_per_liter_cents: input.rate_per_liter.cents(),
            total_revenue_cents: breakdown.total_revenue.cents(),
            card_payments_cents: input.card_payments.cents(),
            cash_on_hand_cents: breakdown.cash_on_hand.cents(),
            bank_deposit_cents: input.bank_deposit.cents(),
            cash_to_am_cents: breakdown.cash_to_am.cents(),
            status: CustodyStatus::PendingAcceptance,
            created_by: Some(created_by.to_string()),
            created_at: now,
            updated_at: now,
        };

        match cash::insert_transaction(&mut tx, &transaction).await {
            Ok(()) => {}
            Err(err) if err.is_unique_violation() => {
                return Err(CoreError::CashAlreadyRecorded(shift.id).into());
            }
            Err(err) => return Err(err.into()),
        }

        tx.commit().await?;
        info!(
            transaction_id = %transaction.id,
            shift_id = %transaction.shift_id,
            cash_to_am = %breakdown.cash_to_am,
            "Cash transaction recorded"
        );
        Ok(transaction)
    }

    /// Hands the cash over to the initiating user's area manager.
    ///
    /// The transaction keeps its status; the transfer row is what marks the
    /// handover as started.
    pub async fn initiate_transfer(
        &self,
        transaction_id: &str,
        from_user_id: &str,
    ) -> ServiceResult<CashTransfer> {
        let now = self.ctx.now();
        let mut tx = self.ctx.begin_write().await?;

        let transaction = cash::get_transaction(&mut tx, transaction_id)
            .await?
            .ok_or_else(|| CoreError::not_found("CashTransaction", transaction_id))?;
        if transaction.status != CustodyStatus::PendingAcceptance {
            return Err(already_processed("CashTransaction", transaction_id, transaction.status).into());
        }
        if let Some(existing) = cash::get_transfer_for(&mut tx, transaction_id).await? {
            return Err(already_processed("CashTransfer", &existing.id, existing.status).into());
        }

        let from = user::get(&mut tx, from_user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User", from_user_id))?;
        let to_user_id = from
            .area_manager_id
            .ok_or_else(|| CoreError::NoAreaManagerAssigned(from_user_id.to_string()))?;

        let transfer = CashTransfer {
            id: Uuid::new_v4().to_string(),
            cash_transaction_id: transaction_id.to_string(),
            from_user_id: from_user_id.to_string(),
            to_user_id,
            status: CustodyStatus::PendingAcceptance,
            receipt_url: None,
            deposited_at: None,
            created_at: now,
            updated_at: now,
        };

        match cash::insert_transfer(&mut tx, &transfer).await {
            Ok(()) => {}
            Err(err) if err.is_unique_violation() => {
                return Err(already_processed("CashTransaction", transaction_id, transaction.status).into());
            }
            Err(err) => return Err(err.into()),
        }

        tx.commit().await?;
        info!(
            transaction_id = %transaction_id,
            from = %transfer.from_user_id,
            to = %transfer.to_user_id,
            "Cash transfer initiated"
        );
        Ok(transfer)
    }

    /// The assigned area manager takes custody of the cash.
    ///
    /// ## Errors
    /// - `NotFound` if the transaction or its transfer is missing
    /// - `Unauthorized` if `user_id` is not the transfer's recipient
    /// - `AlreadyProcessed` if the cash was already accepted
    pub async fn accept_cash(&self, transaction_id: &str, user_id: &str) -> ServiceResult<CashTransfer> {
        let now = self.ctx.now();
        let mut tx = self.ctx.begin_write().await?;

        let (_, transfer) = load_pair(&mut tx, transaction_id).await?;
        if transfer.to_user_id != user_id {
            return Err(CoreError::Unauthorized {
                user_id: user_id.to_string(),
                action: "accept this cash",
            }
            .into());
        }
        if transfer.status != CustodyStatus::PendingAcceptance {
            return Err(already_processed("CashTransfer", &transfer.id, transfer.status).into());
        }

        let transfer_moved = cash::accept_transfer(&mut tx, &transfer.id, user_id, now).await?;
        let transaction_moved = cash::advance_transaction(
            &mut tx,
            transaction_id,
            CustodyStatus::PendingAcceptance,
            CustodyStatus::WithAm,
            now,
        )
        .await?;
        if transfer_moved + transaction_moved != 2 {
            warn!(transaction_id = %transaction_id, "Concurrent custody change detected during accept");
            return Err(already_processed("CashTransfer", &transfer.id, CustodyStatus::WithAm).into());
        }

        let accepted = reload_transfer(&mut tx, transaction_id).await?;
        tx.commit().await?;

        info!(transaction_id = %transaction_id, user_id = %user_id, "Cash accepted by area manager");
        Ok(accepted)
    }

    /// Records the bank deposit with the stored receipt's location.
    ///
    /// ## Errors
    /// - `NotFound` if the transaction or its transfer is missing
    /// - `NotYetAccepted` if the area manager has not accepted the cash
    /// - `AlreadyProcessed` if it was already deposited
    pub async fn deposit_cash(&self, transaction_id: &str, receipt_url: &str) -> ServiceResult<CashTransfer> {
        validate_required("receipt_url", receipt_url)?;

        let now = self.ctx.now();
        let mut tx = self.ctx.begin_write().await?;

        let (_, transfer) = load_pair(&mut tx, transaction_id).await?;
        match transfer.status {
            CustodyStatus::WithAm => {}
            CustodyStatus::Deposited => {
                return Err(already_processed("CashTransfer", &transfer.id, transfer.status).into());
            }
            CustodyStatus::PendingAcceptance => {
                return Err(CoreError::NotYetAccepted {
                    id: transaction_id.to_string(),
                    status: transfer.status,
                }
                .into());
            }
        }

        let transfer_moved = cash::deposit_transfer(&mut tx, &transfer.id, receipt_url, now).await?;
        let transaction_moved = cash::advance_transaction(
            &mut tx,
            transaction_id,
            CustodyStatus::WithAm,
            CustodyStatus::Deposited,
            now,
        )
        .await?;
        if transfer_moved + transaction_moved != 2 {
            warn!(transaction_id = %transaction_id, "Concurrent custody change detected during deposit");
            return Err(already_processed("CashTransfer", &transfer.id, CustodyStatus::Deposited).into());
        }

        let deposited = reload_transfer(&mut tx, transaction_id).await?;
        tx.commit().await?;

        info!(transaction_id = %transaction_id, receipt_url = %receipt_url, "Cash deposited");
        Ok(deposited)
    }

    /// Undeposited cash across all stations.
    pub async fn floating_cash(&self) -> ServiceResult<FloatingCash> {
        let transactions = self.repo().list_floating().await?;
        Ok(FloatingCash::from_transactions(transactions))
    }

    /// Transactions the actor is responsible for, newest first.
    ///
    /// Station managers see their station, area managers see cash still in
    /// custody, admins see everything.
    pub async fn list_transactions(&self, actor: &Actor) -> ServiceResult<Vec<CashTransaction>> {
        let repo = self.repo();
        let rows = match actor.role {
            Role::StationManager => match &actor.station_id {
                Some(station_id) => repo.list_for_station(station_id).await?,
                None => Vec::new(),
            },
            Role::AreaManager => repo.list_floating().await?,
            Role::Admin => repo.list_all().await?,
        };
        Ok(rows)
    }

    pub async fn get_transaction(&self, transaction_id: &str) -> ServiceResult<CashTransaction> {
        self.repo()
            .get_transaction(transaction_id)
            .await?
            .ok_or_else(|| CoreError::not_found("CashTransaction", transaction_id).into())
    }

    pub async fn transfer_for(&self, transaction_id: &str) -> ServiceResult<Option<CashTransfer>> {
        Ok(self.repo().get_transfer_for(transaction_id).await?)
    }
}

async fn load_pair(
    conn: &mut sqlx::SqliteConnection,
    transaction_id: &str,
) -> ServiceResult<(CashTransaction, CashTransfer)> {
    let transaction = cash::get_transaction(conn, transaction_id)
        .await?
        .ok_or_else(|| CoreError::not_found("CashTransaction", transaction_id))?;
    let transfer = cash::get_transfer_for(conn, transaction_id)
        .await?
        .ok_or_else(|| CoreError::not_found("CashTransfer", transaction_id))?;
    Ok((transaction, transfer))
}

async fn reload_transfer(conn: &mut sqlx::SqliteConnection, transaction_id: &str) -> ServiceResult<CashTransfer> {
    cash::get_transfer_for(conn, transaction_id)
        .await?
        .ok_or_else(|| CoreError::not_found("CashTransfer", transaction_id).into())
}

fn already_processed(entity: &'static str, id: &str, status: CustodyStatus) -> CoreError {
    CoreError::AlreadyProcessed {
        entity,
        id: id.to_string(),
        status,
    }
}
