//! # Command Dispatch
//!
//! Each handler authenticates, checks the role gate for its operation, calls
//! one service method and returns the result as JSON.

pub mod admin;
pub mod cash;
pub mod inventory;
pub mod shift;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::cli::Command;
use crate::error::CliError;
use crate::App;

/// Runs one parsed command.
pub async fn execute(app: &App, token: Option<&str>, command: Command) -> Result<Value, CliError> {
    let actor = match &command {
        Command::Login { name, password } => return login(app, name, password).await,
        _ => app.authenticate(token)?,
    };

    match command {
        Command::Login { name, password } => login(app, &name, &password).await,
        Command::Station(cmd) => admin::station(app, &actor, cmd).await,
        Command::User(cmd) => admin::user(app, &actor, cmd).await,
        Command::Shift(cmd) => shift::shift(app, &actor, cmd).await,
        Command::Reading(cmd) => shift::reading(app, &actor, cmd).await,
        Command::Sale(cmd) => shift::sale(app, &actor, cmd).await,
        Command::Tank(cmd) => inventory::tank(app, &actor, cmd).await,
        Command::Nozzle(cmd) => inventory::nozzle(app, &actor, cmd).await,
        Command::Delivery(cmd) => inventory::delivery(app, &actor, cmd).await,
        Command::Price(cmd) => inventory::price(app, &actor, cmd).await,
        Command::Cash(cmd) => cash::cash(app, &actor, cmd).await,
    }
}

async fn login(app: &App, name: &str, password: &str) -> Result<Value, CliError> {
    let user = app.services.accounts.login(name, password).await?;
    let token = app.jwt.issue(&user)?;

    info!(user_id = %user.id, role = %user.role, "Logged in");
    Ok(json!({ "token": token, "user": user }))
}

pub(crate) fn to_json<T: Serialize>(value: T) -> Result<Value, CliError> {
    Ok(serde_json::to_value(value)?)
}
