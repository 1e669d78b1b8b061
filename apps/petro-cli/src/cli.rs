//! Command line definition.
//!
//! ```text
//! petro login --name "Dana Field"                 → {"token": ..., "user": ...}
//! export PETRO_TOKEN=...
//! petro shift current --station S1               → resolves (or opens) the shift
//! petro reading record --shift X --station S1 --reading P1=1520.5
//! petro sale submit --shift X
//! petro cash create --liters 1000 --rate 2.50 --card 1500
//! ```

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

use petro_core::{FuelType, Money, ReadingInput, Role};

#[derive(Debug, Parser)]
#[command(name = "petro", version, about = "Petrol station shift, fuel and cash operations")]
pub struct Cli {
    /// Config file (TOML); defaults to ./petro.toml when present
    #[arg(long, global = true, env = "PETRO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bearer token printed by `petro login`
    #[arg(long, global = true, env = "PETRO_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check a name and password and print a bearer token
    Login {
        #[arg(long)]
        name: String,
        #[arg(long, env = "PETRO_PASSWORD", hide_env_values = true)]
        password: String,
    },

    #[command(subcommand)]
    Station(StationCommand),

    #[command(subcommand)]
    User(UserCommand),

    #[command(subcommand)]
    Shift(ShiftCommand),

    #[command(subcommand)]
    Reading(ReadingCommand),

    #[command(subcommand)]
    Sale(SaleCommand),

    #[command(subcommand)]
    Tank(TankCommand),

    #[command(subcommand)]
    Nozzle(NozzleCommand),

    #[command(subcommand)]
    Delivery(DeliveryCommand),

    #[command(subcommand)]
    Price(PriceCommand),

    #[command(subcommand)]
    Cash(CashCommand),
}

#[derive(Debug, Subcommand)]
pub enum StationCommand {
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: Option<String>,
    },
    List,
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    Register(RegisterArgs),
    List {
        #[arg(long)]
        role: Option<Role>,
    },
    Show {
        #[arg(long)]
        user: String,
    },
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub employee_id: String,
    #[arg(long)]
    pub name: String,
    #[arg(long, env = "PETRO_NEW_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// SM, AM or Admin
    #[arg(long)]
    pub role: Role,
    /// Home station (station managers)
    #[arg(long)]
    pub station: Option<String>,
    /// Area manager that receives this user's cash
    #[arg(long)]
    pub area_manager: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ShiftCommand {
    /// Current shift for a station, opened if needed
    Current {
        #[arg(long)]
        station: String,
        /// Use the six-to-six cash-entry windows
        #[arg(long)]
        cash: bool,
    },
    Show {
        #[arg(long)]
        shift: String,
    },
    Lock {
        #[arg(long)]
        shift: String,
    },
    Unlock {
        #[arg(long)]
        shift: String,
    },
    /// Meter consumption against sold quantity per nozzle
    Reconcile {
        #[arg(long)]
        shift: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ReadingCommand {
    /// Record closing meter values, one `--reading NOZZLE_ID=CLOSING` per nozzle
    Record {
        #[arg(long)]
        shift: String,
        #[arg(long)]
        station: String,
        #[arg(long = "reading", value_parser = parse_reading, required = true)]
        readings: Vec<ReadingInput>,
    },
    /// Correct the closing value of one reading
    Update {
        #[arg(long)]
        shift: String,
        #[arg(long)]
        reading: String,
        #[arg(long)]
        closing: f64,
    },
    List {
        #[arg(long)]
        shift: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum SaleCommand {
    /// Seed missing sale rows for a shift
    Init {
        #[arg(long)]
        shift: String,
        #[arg(long)]
        station: String,
    },
    Update {
        #[arg(long)]
        sale: String,
        #[arg(long)]
        quantity: Option<f64>,
        #[arg(long)]
        card: Option<Money>,
        #[arg(long)]
        cash: Option<Money>,
    },
    /// Debit the tanks by what was sold and close the shift
    Submit {
        #[arg(long)]
        shift: String,
    },
    List {
        #[arg(long)]
        shift: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum TankCommand {
    Create {
        #[arg(long)]
        station: String,
        #[arg(long)]
        fuel_type: FuelType,
        /// Liters; unbounded when omitted
        #[arg(long)]
        capacity: Option<f64>,
        #[arg(long, default_value_t = 0.0)]
        level: f64,
    },
    List {
        #[arg(long)]
        station: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum NozzleCommand {
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        tank: String,
        #[arg(long)]
        fuel_type: FuelType,
        #[arg(long)]
        meter_limit: Option<f64>,
    },
    List {
        #[arg(long)]
        station: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum DeliveryCommand {
    Record {
        #[arg(long)]
        tank: String,
        #[arg(long)]
        liters: f64,
        /// RFC 3339; defaults to now
        #[arg(long)]
        date: Option<DateTime<Utc>>,
        #[arg(long)]
        delivered_by: Option<String>,
        #[arg(long)]
        ticket: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    List {
        #[arg(long)]
        tank: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum PriceCommand {
    Set {
        #[arg(long)]
        station: String,
        #[arg(long)]
        fuel_type: FuelType,
        /// Per liter, e.g. 2.33
        #[arg(long)]
        price: Money,
    },
    Current {
        #[arg(long)]
        station: String,
    },
    History,
}

#[derive(Debug, Subcommand)]
pub enum CashCommand {
    /// Record the cash of the station's live shift
    Create {
        /// Defaults to the caller's home station
        #[arg(long)]
        station: Option<String>,
        #[arg(long)]
        liters: f64,
        #[arg(long)]
        rate: Money,
        #[arg(long, default_value = "0")]
        card: Money,
        #[arg(long, default_value = "0")]
        bank: Money,
    },
    /// Hand the cash to the caller's area manager
    Transfer {
        #[arg(long)]
        transaction: String,
    },
    Accept {
        #[arg(long)]
        transaction: String,
    },
    /// Store the deposit slip and mark the cash as banked
    Deposit {
        #[arg(long)]
        transaction: String,
        #[arg(long)]
        receipt: PathBuf,
    },
    Floating,
    List,
    Show {
        #[arg(long)]
        transaction: String,
    },
}

/// Parses `NOZZLE_ID=CLOSING`.
fn parse_reading(raw: &str) -> Result<ReadingInput, String> {
    let (nozzle_id, closing) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NOZZLE_ID=CLOSING, got {raw}"))?;
    let closing_reading: f64 = closing
        .trim()
        .parse()
        .map_err(|_| format!("closing reading must be a number, got {closing}"))?;

    if nozzle_id.trim().is_empty() {
        return Err("nozzle id is empty".to_string());
    }

    Ok(ReadingInput {
        nozzle_id: nozzle_id.trim().to_string(),
        closing_reading,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_reading() {
        let reading = parse_reading("n-1=1520.5").unwrap();
        assert_eq!(reading.nozzle_id, "n-1");
        assert_eq!(reading.closing_reading, 1520.5);

        assert!(parse_reading("n-1").is_err());
        assert!(parse_reading("=5").is_err());
        assert!(parse_reading("n-1=abc").is_err());
    }

    #[test]
    fn test_parses_money_and_fuel_arguments() {
        let cli = Cli::try_parse_from([
            "petro", "price", "set", "--station", "s1", "--fuel-type", "DIESEL", "--price", "1.66",
        ])
        .unwrap();

        match cli.command {
            Command::Price(PriceCommand::Set {
                fuel_type, price, ..
            }) => {
                assert_eq!(fuel_type, FuelType::Diesel);
                assert_eq!(price, Money::from_cents(166));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cash_defaults() {
        let cli = Cli::try_parse_from(["petro", "cash", "create", "--liters", "1000", "--rate", "2.50"])
            .unwrap();

        match cli.command {
            Command::Cash(CashCommand::Create {
                station, card, bank, rate, ..
            }) => {
                assert!(station.is_none());
                assert_eq!(card, Money::zero());
                assert_eq!(bank, Money::zero());
                assert_eq!(rate, Money::from_cents(250));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
