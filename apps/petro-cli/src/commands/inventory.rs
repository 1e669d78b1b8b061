//! Tanks, nozzles, tanker deliveries and fuel prices.

use serde_json::Value;

use petro_core::{Actor, NewDelivery, Operation};

use super::to_json;
use crate::cli::{DeliveryCommand, NozzleCommand, PriceCommand, TankCommand};
use crate::error::CliError;
use crate::App;

pub async fn tank(app: &App, actor: &Actor, cmd: TankCommand) -> Result<Value, CliError> {
    let inventory = &app.services.inventory;

    match cmd {
        TankCommand::Create {
            station,
            fuel_type,
            capacity,
            level,
        } => {
            app.authorize(actor, Operation::ConfigureEquipment)?;
            to_json(inventory.create_tank(&station, fuel_type, capacity, level).await?)
        }
        TankCommand::List { station } => {
            app.authorize(actor, Operation::ViewInventory)?;
            to_json(inventory.tanks_for_station(&station).await?)
        }
    }
}

pub async fn nozzle(app: &App, actor: &Actor, cmd: NozzleCommand) -> Result<Value, CliError> {
    let inventory = &app.services.inventory;

    match cmd {
        NozzleCommand::Create {
            name,
            tank,
            fuel_type,
            meter_limit,
        } => {
            app.authorize(actor, Operation::ConfigureEquipment)?;
            to_json(inventory.create_nozzle(&name, &tank, fuel_type, meter_limit).await?)
        }
        NozzleCommand::List { station } => {
            app.authorize(actor, Operation::ViewInventory)?;
            to_json(inventory.nozzles_for_station(&station).await?)
        }
    }
}

pub async fn delivery(app: &App, actor: &Actor, cmd: DeliveryCommand) -> Result<Value, CliError> {
    let inventory = &app.services.inventory;

    match cmd {
        DeliveryCommand::Record {
            tank,
            liters,
            date,
            delivered_by,
            ticket,
            notes,
        } => {
            app.authorize(actor, Operation::RecordDelivery)?;
            let recorded = inventory
                .record_delivery(NewDelivery {
                    tank_id: tank,
                    liters,
                    delivery_date: date,
                    delivered_by: delivered_by.or_else(|| Some(actor.employee_id.clone())),
                    ticket_ref: ticket,
                    notes,
                })
                .await?;
            to_json(recorded)
        }
        DeliveryCommand::List { tank } => {
            app.authorize(actor, Operation::ViewInventory)?;
            to_json(inventory.list_deliveries(tank.as_deref()).await?)
        }
    }
}

pub async fn price(app: &App, actor: &Actor, cmd: PriceCommand) -> Result<Value, CliError> {
    let prices = &app.services.prices;

    match cmd {
        PriceCommand::Set {
            station,
            fuel_type,
            price,
        } => {
            app.authorize(actor, Operation::SetFuelPrice)?;
            to_json(prices.set_price(&station, fuel_type, price, Some(&actor.id)).await?)
        }
        PriceCommand::Current { station } => {
            app.authorize(actor, Operation::ViewPrices)?;
            to_json(prices.current_prices(&station).await?)
        }
        PriceCommand::History => {
            app.authorize(actor, Operation::ViewPrices)?;
            to_json(prices.all_prices().await?)
        }
    }
}
