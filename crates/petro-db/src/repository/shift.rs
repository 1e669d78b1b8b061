//! # Shift Repository
//!
//! ## Shift Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Shift Lifecycle                                   │
//! │                                                                         │
//! │  1. OPEN      insert()            (resolver; UNIQUE on open window)     │
//! │  2. CLOSED    close_and_lock()    (sales submission, also locks)        │
//! │  3. LOCKED    lock()              (station manager)                     │
//! │  4. CLOSED    unlock()            (admin; records who unlocked)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use petro_core::{Shift, ShiftType};

const SHIFT_COLUMNS: &str = "id, station_id, shift_type, window_start, start_time, end_time, \
     status, locked, locked_by, locked_at, created_at";

/// Repository for shift database operations.
#[derive(Debug, Clone)]
pub struct ShiftRepository {
    pool: SqlitePool,
}

impl ShiftRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ShiftRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Shift>> {
        let mut conn = self.pool.acquire().await?;
        get(&mut conn, id).await
    }

    /// Shifts of a station, newest first.
    pub async fn list_for_station(&self, station_id: &str, limit: i64) -> DbResult<Vec<Shift>> {
        let shifts = sqlx::query_as::<_, Shift>(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE station_id = ?1 \
             ORDER BY start_time DESC, created_at DESC LIMIT ?2"
        ))
        .bind(station_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(shifts)
    }
}

pub(crate) async fn insert(conn: &mut SqliteConnection, shift: &Shift) -> DbResult<()> {
    debug!(
        id = %shift.id,
        station_id = %shift.station_id,
        shift_type = %shift.shift_type,
        window_start = %shift.window_start,
        "Inserting shift"
    );

    sqlx::query(
        r#"
        INSERT INTO shifts (
            id, station_id, shift_type, window_start, start_time, end_time,
            status, locked, locked_by, locked_at, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&shift.id)
    .bind(&shift.station_id)
    .bind(shift.shift_type)
    .bind(shift.window_start)
    .bind(shift.start_time)
    .bind(shift.end_time)
    .bind(shift.status)
    .bind(shift.locked)
    .bind(&shift.locked_by)
    .bind(shift.locked_at)
    .bind(shift.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn get(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Shift>> {
    let shift = sqlx::query_as::<_, Shift>(&format!("SELECT {SHIFT_COLUMNS} FROM shifts WHERE id = ?1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(shift)
}

/// OPEN or CLOSED shift for exactly this station, type and window.
pub(crate) async fn find_in_window(
    conn: &mut SqliteConnection,
    station_id: &str,
    shift_type: ShiftType,
    window_start: DateTime<Utc>,
) -> DbResult<Option<Shift>> {
    let shift = sqlx::query_as::<_, Shift>(&format!(
        "SELECT {SHIFT_COLUMNS} FROM shifts \
         WHERE station_id = ?1 AND shift_type = ?2 AND window_start = ?3 \
           AND status IN ('OPEN', 'CLOSED') \
         ORDER BY created_at DESC LIMIT 1"
    ))
    .bind(station_id)
    .bind(shift_type)
    .bind(window_start)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(shift)
}

/// Latest OPEN shift of a station, whatever its type or window.
pub(crate) async fn find_open(
    conn: &mut SqliteConnection,
    station_id: &str,
) -> DbResult<Option<Shift>> {
    let shift = sqlx::query_as::<_, Shift>(&format!(
        "SELECT {SHIFT_COLUMNS} FROM shifts \
         WHERE station_id = ?1 AND status = 'OPEN' \
         ORDER BY start_time DESC, created_at DESC LIMIT 1"
    ))
    .bind(station_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(shift)
}

/// The shift preceding `shift` at the same station (latest start time, other id).
pub(crate) async fn previous(conn: &mut SqliteConnection, shift: &Shift) -> DbResult<Option<Shift>> {
    let previous = sqlx::query_as::<_, Shift>(&format!(
        "SELECT {SHIFT_COLUMNS} FROM shifts \
         WHERE station_id = ?1 AND id <> ?2 AND start_time <= ?3 \
         ORDER BY start_time DESC, created_at DESC LIMIT 1"
    ))
    .bind(&shift.station_id)
    .bind(&shift.id)
    .bind(shift.start_time)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(previous)
}

pub(crate) async fn lock(
    conn: &mut SqliteConnection,
    id: &str,
    locked_by: &str,
    now: DateTime<Utc>,
) -> DbResult<u64> {
    let result = sqlx::query(
        "UPDATE shifts SET locked = 1, status = 'LOCKED', locked_by = ?1, locked_at = ?2 WHERE id = ?3",
    )
    .bind(locked_by)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

pub(crate) async fn unlock(conn: &mut SqliteConnection, id: &str, unlocked_by: &str) -> DbResult<u64> {
    let result =
        sqlx::query("UPDATE shifts SET locked = 0, status = 'CLOSED', locked_by = ?1 WHERE id = ?2")
            .bind(unlocked_by)
            .bind(id)
            .execute(&mut *conn)
            .await?;

    Ok(result.rows_affected())
}

/// Sales submission: CLOSED, locked and ended, only if not already locked.
pub(crate) async fn close_and_lock(
    conn: &mut SqliteConnection,
    id: &str,
    now: DateTime<Utc>,
) -> DbResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE shifts
        SET status = 'CLOSED', locked = 1, locked_at = ?1, end_time = ?1
        WHERE id = ?2 AND locked = 0
        "#,
    )
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}
