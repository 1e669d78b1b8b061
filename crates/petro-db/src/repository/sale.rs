//! # Nozzle Sale Repository
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. SEED      insert_seed()    one row per nozzle, price snapshot       │
//! │  2. EDIT      update_partial() quantity / card / cash (repeatable)      │
//! │  3. SUBMIT    unsubmitted_per_tank()  not yet debited, per tank         │
//! │               mark_submitted()        submitted_liters = quantity       │
//! │                                                                         │
//! │  total_amount_cents is a generated column: quantity × price, rounded.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use petro_core::{NozzleSale, SaleUpdate};

const SALE_COLUMNS: &str = "id, shift_id, nozzle_id, quantity_liters, price_per_liter_cents, \
     card_amount_cents, cash_amount_cents, total_amount_cents, created_at, updated_at";

/// Repository for nozzle sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<NozzleSale>> {
        let mut conn = self.pool.acquire().await?;
        get(&mut conn, id).await
    }

    pub async fn list_for_shift(&self, shift_id: &str) -> DbResult<Vec<NozzleSale>> {
        let mut conn = self.pool.acquire().await?;
        list_for_shift(&mut conn, shift_id).await
    }
}

/// Inserts an empty sale line; an existing (shift, nozzle) row is kept.
///
/// Returns whether a row was inserted.
pub(crate) async fn insert_seed(
    conn: &mut SqliteConnection,
    id: &str,
    shift_id: &str,
    nozzle_id: &str,
    price_per_liter_cents: i64,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    debug!(shift_id = %shift_id, nozzle_id = %nozzle_id, price_per_liter_cents, "Seeding nozzle sale");

    let result = sqlx::query(
        r#"
        INSERT INTO nozzle_sales (
            id, shift_id, nozzle_id, quantity_liters, price_per_liter_cents,
            card_amount_cents, cash_amount_cents, created_at, updated_at
        ) VALUES (?1, ?2, ?3, 0, ?4, 0, 0, ?5, ?5)
        ON CONFLICT (shift_id, nozzle_id) DO NOTHING
        "#,
    )
    .bind(id)
    .bind(shift_id)
    .bind(nozzle_id)
    .bind(price_per_liter_cents)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub(crate) async fn get(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<NozzleSale>> {
    let sale = sqlx::query_as::<_, NozzleSale>(&format!(
        "SELECT {SALE_COLUMNS} FROM nozzle_sales WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(sale)
}

/// Applies the fields present in `update`; absent fields keep their value.
pub(crate) async fn update_partial(
    conn: &mut SqliteConnection,
    id: &str,
    update: &SaleUpdate,
    now: DateTime<Utc>,
) -> DbResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE nozzle_sales
        SET quantity_liters   = COALESCE(?1, quantity_liters),
            card_amount_cents = COALESCE(?2, card_amount_cents),
            cash_amount_cents = COALESCE(?3, cash_amount_cents),
            updated_at        = ?4
        WHERE id = ?5
        "#,
    )
    .bind(update.quantity_liters)
    .bind(update.card_amount.map(|m| m.cents()))
    .bind(update.cash_amount.map(|m| m.cents()))
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

pub(crate) async fn list_for_shift(
    conn: &mut SqliteConnection,
    shift_id: &str,
) -> DbResult<Vec<NozzleSale>> {
    let sales = sqlx::query_as::<_, NozzleSale>(&format!(
        "SELECT {SALE_COLUMNS} FROM nozzle_sales WHERE shift_id = ?1 ORDER BY created_at, id"
    ))
    .bind(shift_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(sales)
}

/// Quantity sold in a shift but not yet debited, per tank, ordered by tank id.
///
/// Negative when a quantity was lowered after an earlier submission.
pub(crate) async fn unsubmitted_per_tank(
    conn: &mut SqliteConnection,
    shift_id: &str,
) -> DbResult<Vec<(String, f64)>> {
    let rows = sqlx::query_as::<_, (String, f64)>(
        r#"
        SELECT n.tank_id, SUM(s.quantity_liters - s.submitted_liters)
        FROM nozzle_sales s
        JOIN nozzles n ON n.id = s.nozzle_id
        WHERE s.shift_id = ?1
        GROUP BY n.tank_id
        ORDER BY n.tank_id
        "#,
    )
    .bind(shift_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}

/// Moves every sale's watermark of the shift up to its current quantity.
pub(crate) async fn mark_submitted(conn: &mut SqliteConnection, shift_id: &str) -> DbResult<u64> {
    let result = sqlx::query("UPDATE nozzle_sales SET submitted_liters = quantity_liters WHERE shift_id = ?1")
        .bind(shift_id)
        .execute(&mut *conn)
        .await?;

    debug!(shift_id = %shift_id, rows = result.rows_affected(), "Sales marked submitted");
    Ok(result.rows_affected())
}
