//! # Nozzle Repository

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use petro_core::{Nozzle, NozzleWithTank};

const NOZZLE_COLUMNS: &str = "id, name, station_id, tank_id, fuel_type, meter_limit, created_at";

/// Repository for nozzle database operations.
#[derive(Debug, Clone)]
pub struct NozzleRepository {
    pool: SqlitePool,
}

impl NozzleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        NozzleRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Nozzle>> {
        let mut conn = self.pool.acquire().await?;
        get(&mut conn, id).await
    }

    /// Nozzles of a station ordered by name, with their tank's level.
    pub async fn list_for_station(&self, station_id: &str) -> DbResult<Vec<NozzleWithTank>> {
        let mut conn = self.pool.acquire().await?;

        let nozzles = sqlx::query_as::<_, NozzleWithTank>(
            r#"
            SELECT
                n.id, n.name, n.station_id, n.tank_id, n.fuel_type, n.meter_limit, n.created_at,
                t.current_level AS tank_current_level,
                t.capacity AS tank_capacity
            FROM nozzles n
            JOIN tanks t ON t.id = n.tank_id
            WHERE n.station_id = ?1
            ORDER BY n.name
            "#,
        )
        .bind(station_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(nozzles)
    }
}

pub(crate) async fn insert(conn: &mut SqliteConnection, nozzle: &Nozzle) -> DbResult<()> {
    debug!(id = %nozzle.id, name = %nozzle.name, tank_id = %nozzle.tank_id, "Inserting nozzle");

    sqlx::query(
        r#"
        INSERT INTO nozzles (
            id, name, station_id, tank_id, fuel_type, meter_limit, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&nozzle.id)
    .bind(&nozzle.name)
    .bind(&nozzle.station_id)
    .bind(&nozzle.tank_id)
    .bind(nozzle.fuel_type)
    .bind(nozzle.meter_limit)
    .bind(nozzle.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn get(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Nozzle>> {
    let nozzle =
        sqlx::query_as::<_, Nozzle>(&format!("SELECT {NOZZLE_COLUMNS} FROM nozzles WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(nozzle)
}

/// Every nozzle of a station, ordered by name.
pub(crate) async fn list_for_station(
    conn: &mut SqliteConnection,
    station_id: &str,
) -> DbResult<Vec<Nozzle>> {
    let nozzles = sqlx::query_as::<_, Nozzle>(&format!(
        "SELECT {NOZZLE_COLUMNS} FROM nozzles WHERE station_id = ?1 ORDER BY name"
    ))
    .bind(station_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(nozzles)
}
