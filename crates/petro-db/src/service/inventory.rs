//! # Inventory
//!
//! Tanks, nozzles and tanker deliveries. Deliveries are the only way fuel
//! enters a tank after it is created; they credit the ledger in the same
//! transaction that records them.

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::config::ServiceContext;
use super::error::ServiceResult;
use super::ledger;
use crate::repository::{delivery, nozzle, station, tank, DeliveryRepository, NozzleRepository, TankRepository};
use petro_core::validation::{validate_liters, validate_name, validate_positive_liters};
use petro_core::{
    CoreError, FuelType, NewDelivery, Nozzle, NozzleWithTank, Tank, TankSummary, TankerDelivery,
    ValidationError, DEFAULT_METER_LIMIT,
};

/// A recorded delivery and the tank it filled.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryRecorded {
    pub delivery: TankerDelivery,
    pub tank: Tank,
}

#[derive(Debug, Clone)]
pub struct InventoryService {
    ctx: ServiceContext,
}

impl InventoryService {
    pub fn new(ctx: ServiceContext) -> Self {
        InventoryService { ctx }
    }

    /// Adds a tank to a station.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown station
    /// - `Validation` for a negative level or a non-positive capacity
    /// - `InvalidDelivery` if the initial level is above capacity
    pub async fn create_tank(
        &self,
        station_id: &str,
        fuel_type: FuelType,
        capacity: Option<f64>,
        initial_level: f64,
    ) -> ServiceResult<Tank> {
        validate_liters("current_level", initial_level)?;
        if let Some(capacity) = capacity {
            validate_positive_liters("capacity", capacity)?;
            if initial_level > capacity {
                return Err(CoreError::InvalidDelivery {
                    capacity,
                    current: 0.0,
                    delivered: initial_level,
                    new_total: initial_level,
                }
                .into());
            }
        }

        let now = self.ctx.now();
        let mut tx = self.ctx.begin_write().await?;

        station::get(&mut tx, station_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Station", station_id))?;

        let created = Tank {
            id: Uuid::new_v4().to_string(),
            station_id: station_id.to_string(),
            fuel_type,
            capacity,
            current_level: initial_level,
            created_at: now,
            updated_at: now,
        };
        tank::insert(&mut tx, &created).await?;

        tx.commit().await?;
        info!(tank_id = %created.id, station_id = %station_id, fuel_type = %fuel_type, "Tank created");
        Ok(created)
    }

    /// Adds a nozzle drawing from `tank_id`.
    ///
    /// The nozzle's fuel type must be the tank's; its station is the tank's.
    pub async fn create_nozzle(
        &self,
        name: &str,
        tank_id: &str,
        fuel_type: FuelType,
        meter_limit: Option<f64>,
    ) -> ServiceResult<Nozzle> {
        validate_name("name", name)?;
        let meter_limit = meter_limit.unwrap_or(DEFAULT_METER_LIMIT);
        validate_positive_liters("meter_limit", meter_limit)?;

        let now = self.ctx.now();
        let mut tx = self.ctx.begin_write().await?;

        let source = tank::get(&mut tx, tank_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Tank", tank_id))?;
        if source.fuel_type != fuel_type {
            return Err(ValidationError::InvalidFormat {
                field: "fuel_type".to_string(),
                reason: format!("tank {tank_id} holds {}, not {fuel_type}", source.fuel_type),
            }
            .into());
        }

        let created = Nozzle {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            station_id: source.station_id.clone(),
            tank_id: tank_id.to_string(),
            fuel_type,
            meter_limit,
            created_at: now,
        };
        nozzle::insert(&mut tx, &created).await?;

        tx.commit().await?;
        info!(nozzle_id = %created.id, name = %created.name, tank_id = %tank_id, "Nozzle created");
        Ok(created)
    }

    pub async fn tanks_for_station(&self, station_id: &str) -> ServiceResult<Vec<TankSummary>> {
        Ok(TankRepository::new(self.ctx.pool.clone())
            .list_for_station(station_id)
            .await?)
    }

    /// Nozzles ordered by name, with their tank's level.
    pub async fn nozzles_for_station(&self, station_id: &str) -> ServiceResult<Vec<NozzleWithTank>> {
        Ok(NozzleRepository::new(self.ctx.pool.clone())
            .list_for_station(station_id)
            .await?)
    }

    /// Records a tanker delivery and credits the tank.
    ///
    /// ## Errors
    /// - `Validation` unless liters is positive
    /// - `NotFound` for an unknown tank
    /// - `InvalidDelivery` if the tank would overflow; nothing is recorded
    pub async fn record_delivery(&self, input: NewDelivery) -> ServiceResult<DeliveryRecorded> {
        validate_positive_liters("liters", input.liters)?;

        let now = self.ctx.now();
        let mut tx = self.ctx.begin_write().await?;

        let record = TankerDelivery {
            id: Uuid::new_v4().to_string(),
            tank_id: input.tank_id.clone(),
            liters_delivered: input.liters,
            delivery_date: input.delivery_date.unwrap_or(now),
            delivered_by: input.delivered_by,
            ticket_ref: input.ticket_ref,
            notes: input.notes,
            created_at: now,
        };

        let filled = ledger::apply_delta(&mut tx, &input.tank_id, input.liters, now).await?;
        delivery::insert(&mut tx, &record).await?;

        tx.commit().await?;
        info!(
            tank_id = %filled.id,
            liters = input.liters,
            level = filled.current_level,
            "Tanker delivery recorded"
        );
        Ok(DeliveryRecorded {
            delivery: record,
            tank: filled,
        })
    }

    /// Deliveries newest first, optionally for one tank.
    pub async fn list_deliveries(&self, tank_id: Option<&str>) -> ServiceResult<Vec<TankerDelivery>> {
        Ok(DeliveryRepository::new(self.ctx.pool.clone()).list(tank_id).await?)
    }
}
