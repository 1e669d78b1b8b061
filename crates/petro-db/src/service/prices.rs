//! # Fuel Price Register
//!
//! Prices are never edited: a new price is a new row effective from now, and
//! the current price is the newest row for the station and fuel type.

use tracing::info;
use uuid::Uuid;

use super::config::ServiceContext;
use super::error::ServiceResult;
use crate::repository::{price, station, PriceRepository};
use petro_core::validation::validate_price;
use petro_core::{CoreError, FuelPrice, FuelType, Money};

#[derive(Debug, Clone)]
pub struct FuelPriceRegister {
    ctx: ServiceContext,
}

impl FuelPriceRegister {
    pub fn new(ctx: ServiceContext) -> Self {
        FuelPriceRegister { ctx }
    }

    fn repo(&self) -> PriceRepository {
        PriceRepository::new(self.ctx.pool.clone())
    }

    /// Appends a price for `fuel_type` at `station_id`, effective now.
    pub async fn set_price(
        &self,
        station_id: &str,
        fuel_type: FuelType,
        price_per_liter: Money,
        created_by: Option<&str>,
    ) -> ServiceResult<FuelPrice> {
        validate_price(price_per_liter)?;

        let now = self.ctx.now();
        let mut tx = self.ctx.begin_write().await?;

        station::get(&mut tx, station_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Station", station_id))?;

        let entry = FuelPrice {
            id: Uuid::new_v4().to_string(),
            station_id: station_id.to_string(),
            fuel_type,
            price_per_liter_cents: price_per_liter.cents(),
            effective_from: now,
            created_by: created_by.map(str::to_string),
            created_at: now,
        };
        price::insert(&mut tx, &entry).await?;

        tx.commit().await?;
        info!(station_id = %station_id, fuel_type = %fuel_type, price = %price_per_liter, "Fuel price set");
        Ok(entry)
    }

    pub async fn current_price(&self, station_id: &str, fuel_type: FuelType) -> ServiceResult<Option<FuelPrice>> {
        Ok(self.repo().current(station_id, fuel_type).await?)
    }

    /// Latest price of every fuel type priced at the station.
    pub async fn current_prices(&self, station_id: &str) -> ServiceResult<Vec<FuelPrice>> {
        Ok(self.repo().current_for_station(station_id).await?)
    }

    pub async fn all_prices(&self) -> ServiceResult<Vec<FuelPrice>> {
        Ok(self.repo().list_all().await?)
    }
}
