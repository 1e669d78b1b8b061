//! Shifts, meter readings and nozzle sales.

use serde_json::Value;

use petro_core::{Actor, Operation, SaleUpdate};

use super::to_json;
use crate::cli::{ReadingCommand, SaleCommand, ShiftCommand};
use crate::error::CliError;
use crate::App;

pub async fn shift(app: &App, actor: &Actor, cmd: ShiftCommand) -> Result<Value, CliError> {
    let services = &app.services;

    match cmd {
        ShiftCommand::Current { station, cash } => {
            app.authorize(actor, Operation::ResolveShift)?;
            let shift = if cash {
                services.shifts.resolve_cash_shift(&station).await?
            } else {
                services.shifts.resolve_inventory_shift(&station).await?
            };
            to_json(shift)
        }
        ShiftCommand::Show { shift } => {
            app.authorize(actor, Operation::ViewInventory)?;
            to_json(services.shifts.get(&shift).await?)
        }
        ShiftCommand::Lock { shift } => {
            app.authorize(actor, Operation::LockShift)?;
            to_json(services.readings.lock_shift(&shift, &actor.id).await?)
        }
        ShiftCommand::Unlock { shift } => {
            app.authorize(actor, Operation::UnlockShift)?;
            to_json(services.readings.unlock_shift(&shift, &actor.id).await?)
        }
        ShiftCommand::Reconcile { shift } => {
            app.authorize(actor, Operation::ViewInventory)?;
            to_json(services.readings.reconcile_shift(&shift).await?)
        }
    }
}

pub async fn reading(app: &App, actor: &Actor, cmd: ReadingCommand) -> Result<Value, CliError> {
    let readings = &app.services.readings;

    match cmd {
        ReadingCommand::Record {
            shift,
            station,
            readings: inputs,
        } => {
            app.authorize(actor, Operation::RecordReadings)?;
            to_json(readings.record_readings(&shift, &station, &inputs).await?)
        }
        ReadingCommand::Update {
            shift,
            reading,
            closing,
        } => {
            app.authorize(actor, Operation::UpdateReading)?;
            to_json(readings.update_reading(&shift, &reading, closing).await?)
        }
        ReadingCommand::List { shift } => {
            app.authorize(actor, Operation::ViewInventory)?;
            to_json(readings.shift_readings(&shift).await?)
        }
    }
}

pub async fn sale(app: &App, actor: &Actor, cmd: SaleCommand) -> Result<Value, CliError> {
    let sales = &app.services.sales;

    match cmd {
        SaleCommand::Init { shift, station } => {
            app.authorize(actor, Operation::UpdateSale)?;
            to_json(sales.initialize_sales(&shift, &station).await?)
        }
        SaleCommand::Update {
            sale,
            quantity,
            card,
            cash,
        } => {
            app.authorize(actor, Operation::UpdateSale)?;
            let update = SaleUpdate {
                quantity_liters: quantity,
                card_amount: card,
                cash_amount: cash,
            };
            if update.is_empty() {
                return Err(CliError::validation(
                    "Nothing to update; pass --quantity, --card or --cash",
                ));
            }
            to_json(sales.update_sale(&sale, update).await?)
        }
        SaleCommand::Submit { shift } => {
            app.authorize(actor, Operation::SubmitSales)?;
            to_json(sales.submit_sales(&shift).await?)
        }
        SaleCommand::List { shift } => {
            app.authorize(actor, Operation::ViewInventory)?;
            to_json(sales.shift_sales(&shift).await?)
        }
    }
}
