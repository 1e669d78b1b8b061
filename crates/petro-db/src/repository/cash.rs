//! # Cash Repository
//!
//! Cash transactions and their custody transfers.
//!
//! ## Guarded Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every status change is a conditional UPDATE whose WHERE clause holds   │
//! │  the precondition. A stale concurrent attempt matches zero rows.        │
//! │                                                                         │
//! │  advance_transfer(id, from = PENDING_ACCEPTANCE, to = WITH_AM, user)    │
//! │  advance_transaction(id, from = PENDING_ACCEPTANCE, to = WITH_AM)       │
//! │  deposit_transfer(id, receipt_url)       WHERE status = 'WITH_AM'       │
//! │  advance_transaction(id, from = WITH_AM, to = DEPOSITED)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use petro_core::{CashTransaction, CashTransfer, CustodyStatus};

const TRANSACTION_COLUMNS: &str = "id, shift_id, station_id, liters_sold, rate_per_liter_cents, \
     total_revenue_cents, card_payments_cents, cash_on_hand_cents, bank_deposit_cents, \
     cash_to_am_cents, status, created_by, created_at, updated_at";

const TRANSFER_COLUMNS: &str = "id, cash_transaction_id, from_user_id, to_user_id, status, \
     receipt_url, deposited_at, created_at, updated_at";

/// Repository for cash custody reads.
#[derive(Debug, Clone)]
pub struct CashRepository {
    pool: SqlitePool,
}

impl CashRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CashRepository { pool }
    }

    pub async fn get_transaction(&self, id: &str) -> DbResult<Option<CashTransaction>> {
        let mut conn = self.pool.acquire().await?;
        get_transaction(&mut conn, id).await
    }

    pub async fn get_transfer_for(&self, transaction_id: &str) -> DbResult<Option<CashTransfer>> {
        let mut conn = self.pool.acquire().await?;
        get_transfer_for(&mut conn, transaction_id).await
    }

    /// Every transaction, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<CashTransaction>> {
        let rows = sqlx::query_as::<_, CashTransaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM cash_transactions ORDER BY created_at DESC, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Transactions of one station, newest first.
    pub async fn list_for_station(&self, station_id: &str) -> DbResult<Vec<CashTransaction>> {
        let rows = sqlx::query_as::<_, CashTransaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM cash_transactions WHERE station_id = ?1 \
             ORDER BY created_at DESC, id"
        ))
        .bind(station_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Transactions whose cash is not in the bank yet, newest first.
    pub async fn list_floating(&self) -> DbResult<Vec<CashTransaction>> {
        let rows = sqlx::query_as::<_, CashTransaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM cash_transactions \
             WHERE status IN ('PENDING_ACCEPTANCE', 'WITH_AM') \
             ORDER BY created_at DESC, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Cash Transactions
// =============================================================================

pub(crate) async fn insert_transaction(
    conn: &mut SqliteConnection,
    tx: &CashTransaction,
) -> DbResult<()> {
    debug!(id = %tx.id, shift_id = %tx.shift_id, cash_to_am_cents = tx.cash_to_am_cents, "Inserting cash transaction");

    sqlx::query(
        r#"
        INSERT INTO cash_transactions (
            id, shift_id, station_id, liters_sold, rate_per_liter_cents,
            total_revenue_cents, card_payments_cents, cash_on_hand_cents,
            bank_deposit_cents, cash_to_am_cents, status, created_by,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
    )
    .bind(&tx.id)
    .bind(&tx.shift_id)
    .bind(&tx.station_id)
    .bind(tx.liters_sold)
    .bind(tx.rate_per_liter_cents)
    .bind(tx.total_revenue_cents)
    .bind(tx.card_payments_cents)
    .bind(tx.cash_on_hand_cents)
    .bind(tx.bank_deposit_cents)
    .bind(tx.cash_to_am_cents)
    .bind(tx.status)
    .bind(&tx.created_by)
    .bind(tx.created_at)
    .bind(tx.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn get_transaction(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<CashTransaction>> {
    let row = sqlx::query_as::<_, CashTransaction>(&format!(
        "SELECT {TRANSACTION_COLUMNS} FROM cash_transactions WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}

pub(crate) async fn get_transaction_for_shift(
    conn: &mut SqliteConnection,
    shift_id: &str,
) -> DbResult<Option<CashTransaction>> {
    let row = sqlx::query_as::<_, CashTransaction>(&format!(
        "SELECT {TRANSACTION_COLUMNS} FROM cash_transactions WHERE shift_id = ?1"
    ))
    .bind(shift_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}

/// Moves a transaction from `from` to `to`; 0 rows if it was not in `from`.
pub(crate) async fn advance_transaction(
    conn: &mut SqliteConnection,
    id: &str,
    from: CustodyStatus,
    to: CustodyStatus,
    now: DateTime<Utc>,
) -> DbResult<u64> {
    let result = sqlx::query(
        "UPDATE cash_transactions SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
    )
    .bind(to)
    .bind(now)
    .bind(id)
    .bind(from)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Cash Transfers
// =============================================================================

pub(crate) async fn insert_transfer(
    conn: &mut SqliteConnection,
    transfer: &CashTransfer,
) -> DbResult<()> {
    debug!(
        id = %transfer.id,
        cash_transaction_id = %transfer.cash_transaction_id,
        to_user_id = %transfer.to_user_id,
        "Inserting cash transfer"
    );

    sqlx::query(
        r#"
        INSERT INTO cash_transfers (
            id, cash_transaction_id, from_user_id, to_user_id, status,
            receipt_url, deposited_at, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&transfer.id)
    .bind(&transfer.cash_transaction_id)
    .bind(&transfer.from_user_id)
    .bind(&transfer.to_user_id)
    .bind(transfer.status)
    .bind(&transfer.receipt_url)
    .bind(transfer.deposited_at)
    .bind(transfer.created_at)
    .bind(transfer.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn get_transfer_for(
    conn: &mut SqliteConnection,
    transaction_id: &str,
) -> DbResult<Option<CashTransfer>> {
    let row = sqlx::query_as::<_, CashTransfer>(&format!(
        "SELECT {TRANSFER_COLUMNS} FROM cash_transfers WHERE cash_transaction_id = ?1"
    ))
    .bind(transaction_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}

/// Accept step: PENDING_ACCEPTANCE → WITH_AM, only for the named recipient.
pub(crate) async fn accept_transfer(
    conn: &mut SqliteConnection,
    id: &str,
    to_user_id: &str,
    now: DateTime<Utc>,
) -> DbResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE cash_transfers
        SET status = 'WITH_AM', updated_at = ?1
        WHERE id = ?2 AND to_user_id = ?3 AND status = 'PENDING_ACCEPTANCE'
        "#,
    )
    .bind(now)
    .bind(id)
    .bind(to_user_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Deposit step: WITH_AM → DEPOSITED with the receipt reference.
pub(crate) async fn deposit_transfer(
    conn: &mut SqliteConnection,
    id: &str,
    receipt_url: &str,
    now: DateTime<Utc>,
) -> DbResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE cash_transfers
        SET status = 'DEPOSITED', receipt_url = ?1, deposited_at = ?2, updated_at = ?2
        WHERE id = ?3 AND status = 'WITH_AM'
        "#,
    )
    .bind(receipt_url)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}
