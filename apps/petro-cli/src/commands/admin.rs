//! Stations and users.

use serde_json::Value;

use petro_core::{Actor, Operation};
use petro_db::service::NewUser;

use super::to_json;
use crate::cli::{StationCommand, UserCommand};
use crate::error::CliError;
use crate::App;

pub async fn station(app: &App, actor: &Actor, cmd: StationCommand) -> Result<Value, CliError> {
    let accounts = &app.services.accounts;

    match cmd {
        StationCommand::Create { name, address } => {
            app.authorize(actor, Operation::CreateStation)?;
            to_json(accounts.create_station(&name, address.as_deref()).await?)
        }
        StationCommand::List => {
            app.authorize(actor, Operation::ViewInventory)?;
            to_json(accounts.list_stations().await?)
        }
    }
}

/// User administration is admin-only, reads included.
pub async fn user(app: &App, actor: &Actor, cmd: UserCommand) -> Result<Value, CliError> {
    app.authorize(actor, Operation::RegisterUser)?;
    let accounts = &app.services.accounts;

    match cmd {
        UserCommand::Register(args) => {
            let created = accounts
                .register_user(NewUser {
                    employee_id: args.employee_id,
                    name: args.name,
                    password: args.password,
                    role: args.role,
                    station_id: args.station,
                    area_manager_id: args.area_manager,
                })
                .await?;
            to_json(created)
        }
        UserCommand::List { role } => to_json(accounts.list_users(role).await?),
        UserCommand::Show { user } => to_json(accounts.get_user(&user).await?),
    }
}
