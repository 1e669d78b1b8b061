//! Shift resolution on both call paths.

mod common;

use chrono::{Duration, TimeZone, Utc};
use common::{at, TestEnv};
use petro_core::{ErrorKind, FuelType, ShiftStatus, ShiftType, DEFAULT_FALLBACK_PRICE};
use petro_db::ServiceConfig;

#[tokio::test]
async fn test_inventory_shift_is_reused_within_window() {
    let env = TestEnv::new().await;

    let first = env.services.shifts.resolve_inventory_shift(&env.station.id).await.unwrap();
    assert_eq!(first.shift_type, ShiftType::Day);
    assert_eq!(first.status, ShiftStatus::Open);
    assert_eq!(first.window_start, at(0, 0));
    assert_eq!(first.start_time, at(0, 0));

    env.clock.set(at(11, 59));
    let again = env.services.shifts.resolve_inventory_shift(&env.station.id).await.unwrap();
    assert_eq!(again.id, first.id);

    env.clock.set(at(12, 0));
    let night = env.services.shifts.resolve_inventory_shift(&env.station.id).await.unwrap();
    assert_ne!(night.id, first.id);
    assert_eq!(night.shift_type, ShiftType::Night);
    assert_eq!(night.window_start, at(12, 0));
}

#[tokio::test]
async fn test_new_inventory_shift_seeds_sales_at_current_price() {
    let env = TestEnv::new().await;
    let gasoline = env.add_tank(FuelType::Gasoline95, Some(10_000.0), 5_000.0).await;
    let diesel = env.add_tank(FuelType::Diesel, Some(10_000.0), 5_000.0).await;
    env.add_nozzle("P1", &gasoline).await;
    env.add_nozzle("P2", &gasoline).await;
    env.add_nozzle("D1", &diesel).await;
    env.set_price(FuelType::Gasoline95, 233).await;

    let shift = env.services.shifts.resolve_inventory_shift(&env.station.id).await.unwrap();
    let sales = env.services.sales.shift_sales(&shift.id).await.unwrap();

    assert_eq!(sales.len(), 3);
    let priced: Vec<i64> = sales.iter().map(|s| s.price_per_liter_cents).collect();
    assert_eq!(priced.iter().filter(|&&p| p == 233).count(), 2);
    assert_eq!(priced.iter().filter(|&&p| p == DEFAULT_FALLBACK_PRICE.cents()).count(), 1);
    assert!(sales.iter().all(|s| s.quantity_liters == 0.0 && s.total_amount_cents == 0));

    // Resolving again neither creates a shift nor duplicates rows.
    env.services.shifts.resolve_inventory_shift(&env.station.id).await.unwrap();
    let seeded = env.services.sales.initialize_sales(&shift.id, &env.station.id).await.unwrap();
    assert_eq!(seeded.len(), 3);
}

#[tokio::test]
async fn test_station_offset_moves_window() {
    let config = ServiceConfig::default().with_utc_offset_minutes(180).unwrap();
    let env = TestEnv::with_config(config).await;

    // 22:00 UTC is 01:00 the next day at UTC+3.
    env.clock.set(at(22, 0));
    let shift = env.services.shifts.resolve_inventory_shift(&env.station.id).await.unwrap();

    assert_eq!(shift.shift_type, ShiftType::Day);
    assert_eq!(shift.window_start, at(21, 0));
}

#[tokio::test]
async fn test_cash_shift_uses_six_to_six_and_any_open_shift() {
    let env = TestEnv::new().await;
    env.clock.set(at(5, 0));

    let early = env.services.shifts.resolve_cash_shift(&env.station.id).await.unwrap();
    assert_eq!(early.shift_type, ShiftType::Night);
    assert_eq!(early.window_start, Utc.with_ymd_and_hms(2024, 2, 29, 18, 0, 0).unwrap());
    assert_eq!(early.start_time, at(5, 0));

    // Still open, so it is reused even though the six-to-six window changed.
    env.clock.set(at(7, 0));
    let later = env.services.shifts.resolve_cash_shift(&env.station.id).await.unwrap();
    assert_eq!(later.id, early.id);

    // Cash-entry shifts do not seed sales.
    assert!(env.services.sales.shift_sales(&early.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cash_path_reuses_open_inventory_shift() {
    let env = TestEnv::new().await;

    let inventory = env.services.shifts.resolve_inventory_shift(&env.station.id).await.unwrap();
    env.clock.advance(Duration::hours(1));
    let cash = env.services.shifts.resolve_cash_shift(&env.station.id).await.unwrap();

    assert_eq!(cash.id, inventory.id);
}

#[tokio::test]
async fn test_unknown_station() {
    let env = TestEnv::new().await;

    let err = env.services.shifts.resolve_inventory_shift("nowhere").await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));

    let err = env.services.shifts.get("missing").await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_open_window_index_rejects_second_open_shift() {
    let env = TestEnv::new().await;
    let shift = env.services.shifts.resolve_inventory_shift(&env.station.id).await.unwrap();

    let duplicate = sqlx::query(
        "INSERT INTO shifts (id, station_id, shift_type, window_start, start_time, status, locked, created_at) \
         VALUES ('dup', ?1, ?2, ?3, ?3, 'OPEN', 0, ?3)",
    )
    .bind(&shift.station_id)
    .bind(shift.shift_type)
    .bind(shift.window_start)
    .execute(env.db.pool())
    .await;

    let err = petro_db::DbError::from(duplicate.unwrap_err());
    assert!(err.is_unique_violation());
}
