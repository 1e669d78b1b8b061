//! # Tank Repository
//!
//! Tank rows and the single statement that moves a tank's level.
//!
//! ## Level Updates
//! ```text
//! UPDATE tanks
//!    SET current_level = current_level + Δ
//!  WHERE id = ?
//!    AND current_level + Δ >= 0
//!    AND (capacity IS NULL OR current_level + Δ <= capacity)
//!
//! rows_affected = 1  → applied atomically against the latest committed level
//! rows_affected = 0  → tank missing or a bound would break; caller diagnoses
//! ```
//! Deltas are never computed from a level read earlier in Rust, so two
//! writers cannot lose each other's update.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use petro_core::{Tank, TankSummary};

const TANK_COLUMNS: &str =
    "id, station_id, fuel_type, capacity, current_level, created_at, updated_at";

/// Repository for tank database operations.
#[derive(Debug, Clone)]
pub struct TankRepository {
    pool: SqlitePool,
}

impl TankRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TankRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Tank>> {
        let mut conn = self.pool.acquire().await?;
        get(&mut conn, id).await
    }

    /// Tanks of a station with the number of nozzles drawing from each.
    pub async fn list_for_station(&self, station_id: &str) -> DbResult<Vec<TankSummary>> {
        let mut conn = self.pool.acquire().await?;
        list_for_station(&mut conn, station_id).await
    }
}

pub(crate) async fn insert(conn: &mut SqliteConnection, tank: &Tank) -> DbResult<()> {
    debug!(id = %tank.id, station_id = %tank.station_id, fuel_type = %tank.fuel_type, "Inserting tank");

    sqlx::query(
        r#"
        INSERT INTO tanks (
            id, station_id, fuel_type, capacity, current_level, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&tank.id)
    .bind(&tank.station_id)
    .bind(tank.fuel_type)
    .bind(tank.capacity)
    .bind(tank.current_level)
    .bind(tank.created_at)
    .bind(tank.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn get(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Tank>> {
    let tank = sqlx::query_as::<_, Tank>(&format!("SELECT {TANK_COLUMNS} FROM tanks WHERE id = ?1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(tank)
}

pub(crate) async fn list_for_station(
    conn: &mut SqliteConnection,
    station_id: &str,
) -> DbResult<Vec<TankSummary>> {
    let tanks = sqlx::query_as::<_, TankSummary>(
        r#"
        SELECT
            t.id, t.station_id, t.fuel_type, t.capacity, t.current_level,
            t.created_at, t.updated_at,
            COUNT(n.id) AS nozzle_count
        FROM tanks t
        LEFT JOIN nozzles n ON n.tank_id = t.id
        WHERE t.station_id = ?1
        GROUP BY t.id
        ORDER BY t.fuel_type, t.created_at
        "#,
    )
    .bind(station_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(tanks)
}

/// Adds `delta` liters to the tank if both bounds still hold.
///
/// Returns the number of rows changed (0 or 1).
pub(crate) async fn apply_delta(
    conn: &mut SqliteConnection,
    id: &str,
    delta: f64,
    now: DateTime<Utc>,
) -> DbResult<u64> {
    debug!(tank_id = %id, delta, "Applying tank delta");

    let result = sqlx::query(
        r#"
        UPDATE tanks
        SET current_level = current_level + ?1,
            updated_at = ?2
        WHERE id = ?3
          AND current_level + ?1 >= 0
          AND (capacity IS NULL OR current_level + ?1 <= capacity)
        "#,
    )
    .bind(delta)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}
