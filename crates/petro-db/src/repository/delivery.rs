//! # Tanker Delivery Repository
//!
//! Append-only: deliveries are inserted and listed, never updated.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use petro_core::TankerDelivery;

const DELIVERY_COLUMNS: &str = "id, tank_id, liters_delivered, delivery_date, delivered_by, \
     ticket_ref, notes, created_at";

/// Repository for tanker delivery database operations.
#[derive(Debug, Clone)]
pub struct DeliveryRepository {
    pool: SqlitePool,
}

impl DeliveryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DeliveryRepository { pool }
    }

    /// Deliveries newest first, optionally for one tank.
    pub async fn list(&self, tank_id: Option<&str>) -> DbResult<Vec<TankerDelivery>> {
        let deliveries = match tank_id {
            Some(tank_id) => {
                sqlx::query_as::<_, TankerDelivery>(&format!(
                    "SELECT {DELIVERY_COLUMNS} FROM tanker_deliveries WHERE tank_id = ?1 \
                     ORDER BY delivery_date DESC, created_at DESC"
                ))
                .bind(tank_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, TankerDelivery>(&format!(
                    "SELECT {DELIVERY_COLUMNS} FROM tanker_deliveries \
                     ORDER BY delivery_date DESC, created_at DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(deliveries)
    }
}

pub(crate) async fn insert(conn: &mut SqliteConnection, delivery: &TankerDelivery) -> DbResult<()> {
    debug!(
        id = %delivery.id,
        tank_id = %delivery.tank_id,
        liters = delivery.liters_delivered,
        "Inserting tanker delivery"
    );

    sqlx::query(
        r#"
        INSERT INTO tanker_deliveries (
            id, tank_id, liters_delivered, delivery_date, delivered_by,
            ticket_ref, notes, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&delivery.id)
    .bind(&delivery.tank_id)
    .bind(delivery.liters_delivered)
    .bind(delivery.delivery_date)
    .bind(&delivery.delivered_by)
    .bind(&delivery.ticket_ref)
    .bind(&delivery.notes)
    .bind(delivery.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
