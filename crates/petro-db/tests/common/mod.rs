//! Shared fixtures for the service integration tests.
//!
//! Every test gets its own in-memory database with one station and three
//! users: an admin, an area manager and a station manager reporting to it.
//! Users are inserted directly so tests do not pay for password hashing.
//!
//! `TestEnv::on_disk` swaps the single-connection in-memory store for a WAL
//! file in a temp dir with a real pool, so writers actually contend.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;
use uuid::Uuid;

use petro_core::{Actor, FuelType, ManualClock, Money, Nozzle, Role, Station, Tank, User};
use petro_db::{Database, DbConfig, ServiceConfig, Services};

/// 2024-03-01 at `hour:minute` UTC.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap()
}

pub struct TestEnv {
    pub db: Database,
    pub services: Services,
    pub clock: ManualClock,
    pub station: Station,
    pub admin: User,
    pub area_manager: User,
    pub station_manager: User,
    _dir: Option<TempDir>,
}

impl TestEnv {
    /// Fresh database, clock at 2024-03-01 08:00 UTC, default settings.
    pub async fn new() -> TestEnv {
        TestEnv::with_config(ServiceConfig::default()).await
    }

    pub async fn with_config(config: ServiceConfig) -> TestEnv {
        TestEnv::build(DbConfig::in_memory(), config, None).await
    }

    /// File-backed database with an eight-connection pool.
    pub async fn on_disk() -> TestEnv {
        let dir = TempDir::new().unwrap();
        let db_config = DbConfig::new(dir.path().join("petro.db")).max_connections(8);
        TestEnv::build(db_config, ServiceConfig::default(), Some(dir)).await
    }

    async fn build(db_config: DbConfig, config: ServiceConfig, dir: Option<TempDir>) -> TestEnv {
        let db = Database::new(db_config).await.unwrap();
        let clock = ManualClock::new(at(8, 0));
        let services = db.services(config, Arc::new(clock.clone()));

        let station = services
            .accounts
            .create_station("Station One", Some("Main Road"))
            .await
            .unwrap();

        let admin = insert_user(&db, &clock, "ADM-1", "Admin", Role::Admin, None, None).await;
        let area_manager =
            insert_user(&db, &clock, "AM-1", "Area Manager", Role::AreaManager, None, None).await;
        let station_manager = insert_user(
            &db,
            &clock,
            "SM-1",
            "Station Manager",
            Role::StationManager,
            Some(&station.id),
            Some(&area_manager.id),
        )
        .await;

        TestEnv {
            db,
            services,
            clock,
            station,
            admin,
            area_manager,
            station_manager,
            _dir: dir,
        }
    }

    pub async fn add_station(&self, name: &str) -> Station {
        self.services.accounts.create_station(name, None).await.unwrap()
    }

    /// A station manager for `station` reporting to the fixture's area manager.
    pub async fn add_station_manager(&self, employee_id: &str, station: &Station) -> User {
        insert_user(
            &self.db,
            &self.clock,
            employee_id,
            employee_id,
            Role::StationManager,
            Some(&station.id),
            Some(&self.area_manager.id),
        )
        .await
    }

    pub async fn add_tank(&self, fuel_type: FuelType, capacity: Option<f64>, level: f64) -> Tank {
        self.add_tank_at(&self.station, fuel_type, capacity, level).await
    }

    pub async fn add_tank_at(
        &self,
        station: &Station,
        fuel_type: FuelType,
        capacity: Option<f64>,
        level: f64,
    ) -> Tank {
        self.services
            .inventory
            .create_tank(&station.id, fuel_type, capacity, level)
            .await
            .unwrap()
    }

    pub async fn add_nozzle(&self, name: &str, tank: &Tank) -> Nozzle {
        self.services
            .inventory
            .create_nozzle(name, &tank.id, tank.fuel_type, None)
            .await
            .unwrap()
    }

    pub async fn set_price(&self, fuel_type: FuelType, cents: i64) {
        self.services
            .prices
            .set_price(&self.station.id, fuel_type, Money::from_cents(cents), Some(&self.admin.id))
            .await
            .unwrap();
    }

    pub async fn tank_level(&self, tank_id: &str) -> f64 {
        self.db
            .tanks()
            .get_by_id(tank_id)
            .await
            .unwrap()
            .unwrap()
            .current_level
    }

    pub fn actor(&self, user: &User) -> Actor {
        Actor::from(user)
    }
}

async fn insert_user(
    db: &Database,
    clock: &ManualClock,
    employee_id: &str,
    name: &str,
    role: Role,
    station_id: Option<&str>,
    area_manager_id: Option<&str>,
) -> User {
    let user = User {
        id: Uuid::new_v4().to_string(),
        employee_id: employee_id.to_string(),
        name: name.to_string(),
        role,
        station_id: station_id.map(str::to_string),
        area_manager_id: area_manager_id.map(str::to_string),
        created_at: petro_core::Clock::now(clock),
    };

    sqlx::query(
        "INSERT INTO users (id, employee_id, name, password_hash, role, station_id, area_manager_id, created_at) \
         VALUES (?1, ?2, ?3, 'not-a-hash', ?4, ?5, ?6, ?7)",
    )
    .bind(&user.id)
    .bind(&user.employee_id)
    .bind(&user.name)
    .bind(user.role)
    .bind(&user.station_id)
    .bind(&user.area_manager_id)
    .bind(user.created_at)
    .execute(db.pool())
    .await
    .unwrap();

    user
}
