//! # Nozzle Reading Repository

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use petro_core::NozzleReading;

const READING_COLUMNS: &str = "id, shift_id, nozzle_id, opening_reading, closing_reading, \
     consumption, is_rollover, price_per_liter_cents, created_at, updated_at";

/// Repository for nozzle reading database operations.
#[derive(Debug, Clone)]
pub struct ReadingRepository {
    pool: SqlitePool,
}

impl ReadingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReadingRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<NozzleReading>> {
        let mut conn = self.pool.acquire().await?;
        get(&mut conn, id).await
    }

    pub async fn list_for_shift(&self, shift_id: &str) -> DbResult<Vec<NozzleReading>> {
        let mut conn = self.pool.acquire().await?;
        list_for_shift(&mut conn, shift_id).await
    }
}

pub(crate) async fn insert(conn: &mut SqliteConnection, reading: &NozzleReading) -> DbResult<()> {
    debug!(
        id = %reading.id,
        shift_id = %reading.shift_id,
        nozzle_id = %reading.nozzle_id,
        "Inserting nozzle reading"
    );

    sqlx::query(
        r#"
        INSERT INTO nozzle_readings (
            id, shift_id, nozzle_id, opening_reading, closing_reading,
            consumption, is_rollover, price_per_liter_cents, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&reading.id)
    .bind(&reading.shift_id)
    .bind(&reading.nozzle_id)
    .bind(reading.opening_reading)
    .bind(reading.closing_reading)
    .bind(reading.consumption)
    .bind(reading.is_rollover)
    .bind(reading.price_per_liter_cents)
    .bind(reading.created_at)
    .bind(reading.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn get(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<NozzleReading>> {
    let reading = sqlx::query_as::<_, NozzleReading>(&format!(
        "SELECT {READING_COLUMNS} FROM nozzle_readings WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(reading)
}

pub(crate) async fn find(
    conn: &mut SqliteConnection,
    shift_id: &str,
    nozzle_id: &str,
) -> DbResult<Option<NozzleReading>> {
    let reading = sqlx::query_as::<_, NozzleReading>(&format!(
        "SELECT {READING_COLUMNS} FROM nozzle_readings WHERE shift_id = ?1 AND nozzle_id = ?2"
    ))
    .bind(shift_id)
    .bind(nozzle_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(reading)
}

/// Closing meter value of a nozzle in a shift, if one was recorded.
pub(crate) async fn closing_for(
    conn: &mut SqliteConnection,
    shift_id: &str,
    nozzle_id: &str,
) -> DbResult<Option<f64>> {
    let closing: Option<Option<f64>> = sqlx::query_scalar(
        "SELECT closing_reading FROM nozzle_readings WHERE shift_id = ?1 AND nozzle_id = ?2",
    )
    .bind(shift_id)
    .bind(nozzle_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(closing.flatten())
}

/// Rewrites the meter values of an existing reading.
pub(crate) async fn update_meters(
    conn: &mut SqliteConnection,
    id: &str,
    opening: f64,
    closing: f64,
    consumption: f64,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE nozzle_readings
        SET opening_reading = ?1, closing_reading = ?2, consumption = ?3, updated_at = ?4
        WHERE id = ?5
        "#,
    )
    .bind(opening)
    .bind(closing)
    .bind(consumption)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn list_for_shift(
    conn: &mut SqliteConnection,
    shift_id: &str,
) -> DbResult<Vec<NozzleReading>> {
    let readings = sqlx::query_as::<_, NozzleReading>(&format!(
        "SELECT {READING_COLUMNS} FROM nozzle_readings WHERE shift_id = ?1 ORDER BY created_at, id"
    ))
    .bind(shift_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(readings)
}
