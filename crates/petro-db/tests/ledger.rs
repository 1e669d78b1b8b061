//! Tank ledger and tanker delivery tests.

mod common;

use chrono::Duration;
use common::{at, TestEnv};
use petro_core::{CoreError, ErrorKind, FuelType, NewDelivery, ReadingInput, SaleUpdate};
use petro_db::ServiceError;

fn delivery(tank_id: &str, liters: f64) -> NewDelivery {
    NewDelivery {
        tank_id: tank_id.to_string(),
        liters,
        delivery_date: None,
        delivered_by: None,
        ticket_ref: Some("TK-1".to_string()),
        notes: None,
    }
}

#[tokio::test]
async fn test_deltas_commute() {
    let env = TestEnv::new().await;
    let a = env.add_tank(FuelType::Diesel, Some(10_000.0), 1_000.0).await;
    let b = env.add_tank(FuelType::Diesel, Some(10_000.0), 1_000.0).await;

    for delta in [500.0, -300.0, 2_000.0, -1_200.0] {
        env.services.ledger.apply_delta(&a.id, delta).await.unwrap();
    }
    for delta in [-1_200.0, 2_000.0, -300.0, 500.0] {
        env.services.ledger.apply_delta(&b.id, delta).await.unwrap();
    }

    assert_eq!(env.tank_level(&a.id).await, 2_000.0);
    assert_eq!(env.tank_level(&b.id).await, 2_000.0);
}

#[tokio::test]
async fn test_ledger_enforces_both_bounds() {
    let env = TestEnv::new().await;
    let tank = env.add_tank(FuelType::Gasoline91, Some(1_000.0), 900.0).await;

    let err = env.services.ledger.apply_delta(&tank.id, 200.0).await.unwrap_err();
    assert!(matches!(err, ServiceError::Domain(CoreError::InvalidDelivery { .. })));

    let err = env.services.ledger.apply_delta(&tank.id, -901.0).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidInput));
    assert_eq!(
        err.to_string(),
        "Insufficient fuel in 91_GASOLINE tank. Current: 900L, Needed: 901L"
    );

    assert_eq!(env.tank_level(&tank.id).await, 900.0);

    let drained = env.services.ledger.apply_delta(&tank.id, -900.0).await.unwrap();
    assert_eq!(drained.current_level, 0.0);
}

#[tokio::test]
async fn test_uncapped_tank_accepts_any_credit() {
    let env = TestEnv::new().await;
    let tank = env.add_tank(FuelType::Diesel, None, 0.0).await;

    let tank = env.services.ledger.apply_delta(&tank.id, 1_000_000.0).await.unwrap();
    assert_eq!(tank.current_level, 1_000_000.0);
}

#[tokio::test]
async fn test_unknown_tank() {
    let env = TestEnv::new().await;

    let err = env.services.ledger.apply_delta("missing", 10.0).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_delivery_credits_tank_and_is_listed() {
    let env = TestEnv::new().await;
    let tank = env.add_tank(FuelType::Diesel, Some(10_000.0), 5_000.0).await;

    let first = env.services.inventory.record_delivery(delivery(&tank.id, 2_000.0)).await.unwrap();
    assert_eq!(first.tank.current_level, 7_000.0);
    assert_eq!(first.delivery.delivery_date, at(8, 0));

    env.clock.advance(Duration::hours(1));
    env.services.inventory.record_delivery(delivery(&tank.id, 500.0)).await.unwrap();

    let listed = env.services.inventory.list_deliveries(Some(&tank.id)).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].liters_delivered, 500.0);
    assert_eq!(env.tank_level(&tank.id).await, 7_500.0);
}

#[tokio::test]
async fn test_overflowing_delivery_records_nothing() {
    let env = TestEnv::new().await;
    let tank = env.add_tank(FuelType::Diesel, Some(10_000.0), 9_000.0).await;

    let err = env
        .services
        .inventory
        .record_delivery(delivery(&tank.id, 1_500.0))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Delivery exceeds tank capacity. Capacity: 10000L, Current: 9000L, Delivery: 1500L, New Total: 10500L"
    );
    assert_eq!(env.tank_level(&tank.id).await, 9_000.0);
    assert!(env.services.inventory.list_deliveries(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delivery_requires_positive_liters() {
    let env = TestEnv::new().await;
    let tank = env.add_tank(FuelType::Diesel, Some(10_000.0), 0.0).await;

    let err = env.services.inventory.record_delivery(delivery(&tank.id, 0.0)).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidInput));
}

#[tokio::test]
async fn test_nozzle_fuel_type_must_match_tank() {
    let env = TestEnv::new().await;
    let tank = env.add_tank(FuelType::Diesel, Some(10_000.0), 0.0).await;

    let err = env
        .services
        .inventory
        .create_nozzle("P9", &tank.id, FuelType::Gasoline95, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidInput));
}

/// Delivery, meter readings and sales submission on one tank.
///
/// Both consumption tracks debit the tank: readings and sales each take
/// the 50L dispensed through the nozzle.
#[tokio::test]
async fn test_station_day_scenario() {
    let env = TestEnv::new().await;
    let tank = env.add_tank(FuelType::Gasoline91, Some(10_000.0), 5_100.0).await;
    let nozzle = env.add_nozzle("N1", &tank).await;
    env.set_price(FuelType::Gasoline91, 250).await;

    // Previous night shift leaves the meter at 100.
    env.clock.set(at(8, 0) - Duration::hours(12));
    let night = env.services.shifts.resolve_inventory_shift(&env.station.id).await.unwrap();
    env.services
        .readings
        .record_readings(
            &night.id,
            &env.station.id,
            &[ReadingInput {
                nozzle_id: nozzle.id.clone(),
                closing_reading: 100.0,
            }],
        )
        .await
        .unwrap();
    assert_eq!(env.tank_level(&tank.id).await, 5_000.0);

    env.clock.set(at(8, 0));
    env.services.inventory.record_delivery(delivery(&tank.id, 2_000.0)).await.unwrap();
    assert_eq!(env.tank_level(&tank.id).await, 7_000.0);

    let day = env.services.shifts.resolve_inventory_shift(&env.station.id).await.unwrap();
    assert_ne!(day.id, night.id);

    let readings = env
        .services
        .readings
        .record_readings(
            &day.id,
            &env.station.id,
            &[ReadingInput {
                nozzle_id: nozzle.id.clone(),
                closing_reading: 150.0,
            }],
        )
        .await
        .unwrap();
    assert_eq!(readings[0].opening_reading, 100.0);
    assert_eq!(readings[0].consumption, Some(50.0));
    assert_eq!(env.tank_level(&tank.id).await, 6_950.0);

    let sales = env.services.sales.shift_sales(&day.id).await.unwrap();
    assert_eq!(sales.len(), 1);
    let sale = env
        .services
        .sales
        .update_sale(
            &sales[0].id,
            SaleUpdate {
                quantity_liters: Some(50.0),
                ..SaleUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(sale.total_amount_cents, 12_500);

    let submission = env.services.sales.submit_sales(&day.id).await.unwrap();
    assert!(submission.reconciliation.is_balanced());
    assert_eq!(env.tank_level(&tank.id).await, 6_900.0);
}
