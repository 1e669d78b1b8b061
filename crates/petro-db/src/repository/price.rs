//! # Fuel Price Repository
//!
//! Append-only price history. The current price of a (station, fuel type) is
//! the row with the greatest `effective_from`.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use petro_core::{FuelPrice, FuelType};

const PRICE_COLUMNS: &str =
    "id, station_id, fuel_type, price_per_liter_cents, effective_from, created_by, created_at";

/// Repository for fuel price database operations.
#[derive(Debug, Clone)]
pub struct PriceRepository {
    pool: SqlitePool,
}

impl PriceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PriceRepository { pool }
    }

    pub async fn current(
        &self,
        station_id: &str,
        fuel_type: FuelType,
    ) -> DbResult<Option<FuelPrice>> {
        let mut conn = self.pool.acquire().await?;
        current(&mut conn, station_id, fuel_type).await
    }

    /// Latest price per fuel type for a station.
    pub async fn current_for_station(&self, station_id: &str) -> DbResult<Vec<FuelPrice>> {
        let prices = sqlx::query_as::<_, FuelPrice>(&format!(
            r#"
            SELECT {PRICE_COLUMNS}
            FROM fuel_prices p
            WHERE p.station_id = ?1
              AND p.rowid = (
                  SELECT q.rowid
                  FROM fuel_prices q
                  WHERE q.station_id = p.station_id AND q.fuel_type = p.fuel_type
                  ORDER BY q.effective_from DESC, q.rowid DESC
                  LIMIT 1
              )
            ORDER BY p.fuel_type
            "#
        ))
        .bind(station_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(prices)
    }

    /// Whole history across stations, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<FuelPrice>> {
        let prices = sqlx::query_as::<_, FuelPrice>(&format!(
            "SELECT {PRICE_COLUMNS} FROM fuel_prices ORDER BY effective_from DESC, created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(prices)
    }
}

pub(crate) async fn insert(conn: &mut SqliteConnection, price: &FuelPrice) -> DbResult<()> {
    debug!(
        station_id = %price.station_id,
        fuel_type = %price.fuel_type,
        price_per_liter_cents = price.price_per_liter_cents,
        "Inserting fuel price"
    );

    sqlx::query(
        r#"
        INSERT INTO fuel_prices (
            id, station_id, fuel_type, price_per_liter_cents, effective_from, created_by, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&price.id)
    .bind(&price.station_id)
    .bind(price.fuel_type)
    .bind(price.price_per_liter_cents)
    .bind(price.effective_from)
    .bind(&price.created_by)
    .bind(price.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn current(
    conn: &mut SqliteConnection,
    station_id: &str,
    fuel_type: FuelType,
) -> DbResult<Option<FuelPrice>> {
    let price = sqlx::query_as::<_, FuelPrice>(&format!(
        "SELECT {PRICE_COLUMNS} FROM fuel_prices WHERE station_id = ?1 AND fuel_type = ?2 \
         ORDER BY effective_from DESC, rowid DESC LIMIT 1"
    ))
    .bind(station_id)
    .bind(fuel_type)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(price)
}
