//! # Seed Data Generator
//!
//! Populates the database with a demo station for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./petro_dev.db
//! cargo run -p petro-db --bin seed
//!
//! # Specify database path
//! cargo run -p petro-db --bin seed -- --db ./data/petro.db
//! ```
//!
//! ## Generated Data
//! - One station with a tank per fuel type (10,000L capacity)
//! - Two nozzles per tank
//! - A current price per fuel type
//! - Users: an admin, an area manager and a station manager reporting to it
//!   (password `petro-demo` for all three)

use std::env;
use std::sync::Arc;

use petro_core::{FuelType, Money, Role, SystemClock};
use petro_db::service::NewUser;
use petro_db::{Database, DbConfig, ServiceConfig};

const DEMO_PASSWORD: &str = "petro-demo";

/// Fuel type, starting level, price in cents.
const TANKS: &[(FuelType, f64, i64)] = &[
    (FuelType::Gasoline91, 6_000.0, 218),
    (FuelType::Gasoline95, 4_500.0, 233),
    (FuelType::Diesel, 8_000.0, 166),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./petro_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Petro Station Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./petro_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Petro Station Seed Data Generator");
    println!("====================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.stations().list().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} stations", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let services = db.services(ServiceConfig::default(), Arc::new(SystemClock));

    let station = services
        .accounts
        .create_station("Demo Station", Some("Ring Road, Exit 4"))
        .await?;
    println!("✓ Station {} ({})", station.name, station.id);

    let admin = services
        .accounts
        .register_user(demo_user("ADM-001", "Admin", Role::Admin, None, None))
        .await?;
    let area_manager = services
        .accounts
        .register_user(demo_user("AM-001", "Area Manager", Role::AreaManager, None, None))
        .await?;
    let station_manager = services
        .accounts
        .register_user(demo_user(
            "SM-001",
            "Station Manager",
            Role::StationManager,
            Some(station.id.clone()),
            Some(area_manager.id.clone()),
        ))
        .await?;
    println!("✓ Users: {}, {}, {}", admin.name, area_manager.name, station_manager.name);

    for (index, (fuel_type, level, price_cents)) in TANKS.iter().enumerate() {
        let tank = services
            .inventory
            .create_tank(&station.id, *fuel_type, Some(10_000.0), *level)
            .await?;

        for pump in 1..=2 {
            let name = format!("P{}-{}", index + 1, pump);
            services
                .inventory
                .create_nozzle(&name, &tank.id, *fuel_type, None)
                .await?;
        }

        services
            .prices
            .set_price(&station.id, *fuel_type, Money::from_cents(*price_cents), Some(&admin.id))
            .await?;

        println!("  {} tank: {:.0}L, price {}", fuel_type, level, Money::from_cents(*price_cents));
    }

    println!();
    println!("✓ Seed complete! Log in with any user name and password '{}'", DEMO_PASSWORD);

    Ok(())
}

fn demo_user(
    employee_id: &str,
    name: &str,
    role: Role,
    station_id: Option<String>,
    area_manager_id: Option<String>,
) -> NewUser {
    NewUser {
        employee_id: employee_id.to_string(),
        name: name.to_string(),
        password: DEMO_PASSWORD.to_string(),
        role,
        station_id,
        area_manager_id,
    }
}
