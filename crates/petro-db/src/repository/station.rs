//! # Station Repository

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use petro_core::Station;

/// Repository for station database operations.
#[derive(Debug, Clone)]
pub struct StationRepository {
    pool: SqlitePool,
}

impl StationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StationRepository { pool }
    }

    /// Gets a station by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Station>> {
        let mut conn = self.pool.acquire().await?;
        get(&mut conn, id).await
    }

    /// Lists all stations by name.
    pub async fn list(&self) -> DbResult<Vec<Station>> {
        let mut conn = self.pool.acquire().await?;
        list(&mut conn).await
    }
}

pub(crate) async fn insert(conn: &mut SqliteConnection, station: &Station) -> DbResult<()> {
    debug!(id = %station.id, name = %station.name, "Inserting station");

    sqlx::query("INSERT INTO stations (id, name, address, created_at) VALUES (?1, ?2, ?3, ?4)")
        .bind(&station.id)
        .bind(&station.name)
        .bind(&station.address)
        .bind(station.created_at)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub(crate) async fn get(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Station>> {
    let station = sqlx::query_as::<_, Station>(
        "SELECT id, name, address, created_at FROM stations WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(station)
}

pub(crate) async fn list(conn: &mut SqliteConnection) -> DbResult<Vec<Station>> {
    let stations = sqlx::query_as::<_, Station>(
        "SELECT id, name, address, created_at FROM stations ORDER BY name",
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(stations)
}
