//! Cash custody: entry, handover, acceptance, bank deposit.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::warn;

use petro_core::{Actor, NewCashTransaction, Operation};

use super::to_json;
use crate::cli::CashCommand;
use crate::error::CliError;
use crate::App;

pub async fn cash(app: &App, actor: &Actor, cmd: CashCommand) -> Result<Value, CliError> {
    let custody = &app.services.custody;

    match cmd {
        CashCommand::Create {
            station,
            liters,
            rate,
            card,
            bank,
        } => {
            app.authorize(actor, Operation::CreateCashTransaction)?;
            let station_id = station
                .or_else(|| actor.station_id.clone())
                .ok_or_else(|| CliError::validation("--station is required for users without a home station"))?;

            let transaction = custody
                .create_transaction(
                    &actor.id,
                    NewCashTransaction {
                        station_id,
                        liters_sold: liters,
                        rate_per_liter: rate,
                        card_payments: card,
                        bank_deposit: bank,
                    },
                )
                .await?;
            to_json(transaction)
        }
        CashCommand::Transfer { transaction } => {
            app.authorize(actor, Operation::InitiateTransfer)?;
            to_json(custody.initiate_transfer(&transaction, &actor.id).await?)
        }
        CashCommand::Accept { transaction } => {
            app.authorize(actor, Operation::AcceptCash)?;
            to_json(custody.accept_cash(&transaction, &actor.id).await?)
        }
        CashCommand::Deposit {
            transaction,
            receipt,
        } => {
            app.authorize(actor, Operation::DepositCash)?;
            let receipt_url = store_receipt(app, receipt).await?;
            match custody.deposit_cash(&transaction, &receipt_url).await {
                Ok(transfer) => to_json(transfer),
                Err(err) => {
                    discard_receipt(app, receipt_url).await;
                    Err(err.into())
                }
            }
        }
        CashCommand::Floating => {
            app.authorize(actor, Operation::ViewFloatingCash)?;
            to_json(custody.floating_cash().await?)
        }
        CashCommand::List => {
            app.authorize(actor, Operation::ListCashTransactions)?;
            to_json(custody.list_transactions(actor).await?)
        }
        CashCommand::Show { transaction } => {
            app.authorize(actor, Operation::ListCashTransactions)?;
            let found = custody.get_transaction(&transaction).await?;
            let transfer = custody.transfer_for(&transaction).await?;
            Ok(json!({ "transaction": found, "transfer": transfer }))
        }
    }
}

async fn store_receipt(app: &App, source: PathBuf) -> Result<String, CliError> {
    let receipts = Arc::clone(&app.receipts);
    let stored = tokio::task::spawn_blocking(move || receipts.store(&source))
        .await
        .map_err(|err| CliError::internal(format!("Receipt storage task failed: {err}")))?;
    Ok(stored?)
}

/// Failures are logged, not returned.
async fn discard_receipt(app: &App, location: String) {
    let receipts = Arc::clone(&app.receipts);
    let discarded = tokio::task::spawn_blocking(move || {
        let result = receipts.discard(&location);
        (location, result)
    })
    .await;

    match discarded {
        Ok((_, Ok(()))) => {}
        Ok((location, Err(err))) => warn!(location = %location, error = %err, "Could not discard receipt"),
        Err(err) => warn!(error = %err, "Receipt discard task failed"),
    }
}
