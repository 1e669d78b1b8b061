//! Meter reading engine tests.

mod common;

use chrono::Duration;
use common::TestEnv;
use petro_core::{CoreError, ErrorKind, FuelType, Nozzle, ReadingInput, Shift, ShiftStatus, Tank};
use petro_db::ServiceError;

fn reading(nozzle: &Nozzle, closing: f64) -> ReadingInput {
    ReadingInput {
        nozzle_id: nozzle.id.clone(),
        closing_reading: closing,
    }
}

struct Pumps {
    env: TestEnv,
    tank: Tank,
    p1: Nozzle,
    p2: Nozzle,
    shift: Shift,
}

/// One 10,000L tank at 5,000L feeding two nozzles, and the current shift.
async fn pumps() -> Pumps {
    let env = TestEnv::new().await;
    let tank = env.add_tank(FuelType::Diesel, Some(10_000.0), 5_000.0).await;
    let p1 = env.add_nozzle("P1", &tank).await;
    let p2 = env.add_nozzle("P2", &tank).await;
    let shift = env.services.shifts.resolve_inventory_shift(&env.station.id).await.unwrap();
    Pumps {
        env,
        tank,
        p1,
        p2,
        shift,
    }
}

#[tokio::test]
async fn test_first_shift_opens_at_zero_and_debits_once_per_tank() {
    let Pumps { env, tank, p1, p2, shift } = pumps().await;

    let readings = env
        .services
        .readings
        .record_readings(&shift.id, &env.station.id, &[reading(&p1, 120.0), reading(&p2, 30.5)])
        .await
        .unwrap();

    assert_eq!(readings.len(), 2);
    for r in &readings {
        assert_eq!(r.opening_reading, 0.0);
        assert_eq!(r.consumption, r.closing_reading);
        assert!(!r.is_rollover);
    }
    assert_eq!(env.tank_level(&tank.id).await, 4_849.5);
}

#[tokio::test]
async fn test_opening_comes_from_previous_shift_closing() {
    let Pumps { env, tank, p1, p2, shift } = pumps().await;
    env.services
        .readings
        .record_readings(&shift.id, &env.station.id, &[reading(&p1, 100.0)])
        .await
        .unwrap();

    env.clock.advance(Duration::hours(12));
    let next = env.services.shifts.resolve_inventory_shift(&env.station.id).await.unwrap();
    let readings = env
        .services
        .readings
        .record_readings(&next.id, &env.station.id, &[reading(&p1, 160.0), reading(&p2, 10.0)])
        .await
        .unwrap();

    let p1_reading = readings.iter().find(|r| r.nozzle_id == p1.id).unwrap();
    assert_eq!(p1_reading.opening_reading, 100.0);
    assert_eq!(p1_reading.consumption, Some(60.0));

    // P2 was never closed in the previous shift.
    let p2_reading = readings.iter().find(|r| r.nozzle_id == p2.id).unwrap();
    assert_eq!(p2_reading.opening_reading, 0.0);

    assert_eq!(env.tank_level(&tank.id).await, 5_000.0 - 100.0 - 60.0 - 10.0);
}

#[tokio::test]
async fn test_backwards_meter_fails_and_changes_nothing() {
    let Pumps { env, tank, p1, p2, shift } = pumps().await;
    env.services
        .readings
        .record_readings(&shift.id, &env.station.id, &[reading(&p1, 100.0)])
        .await
        .unwrap();

    env.clock.advance(Duration::hours(12));
    let next = env.services.shifts.resolve_inventory_shift(&env.station.id).await.unwrap();
    let level_before = env.tank_level(&tank.id).await;

    let err = env
        .services
        .readings
        .record_readings(&next.id, &env.station.id, &[reading(&p2, 40.0), reading(&p1, 80.0)])
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Domain(CoreError::InvalidReading { .. })));
    assert_eq!(err.kind(), Some(ErrorKind::InvalidInput));
    assert_eq!(env.tank_level(&tank.id).await, level_before);
    assert!(env.services.readings.shift_readings(&next.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rerecording_debits_only_the_difference() {
    let Pumps { env, tank, p1, shift, .. } = pumps().await;

    for closing in [100.0, 130.0, 130.0] {
        env.services
            .readings
            .record_readings(&shift.id, &env.station.id, &[reading(&p1, closing)])
            .await
            .unwrap();
    }

    assert_eq!(env.tank_level(&tank.id).await, 4_870.0);
    let readings = env.services.readings.shift_readings(&shift.id).await.unwrap();
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0].consumption, Some(130.0));
}

#[tokio::test]
async fn test_update_reading_applies_delta_and_is_idempotent() {
    let Pumps { env, tank, p1, shift, .. } = pumps().await;
    let recorded = env
        .services
        .readings
        .record_readings(&shift.id, &env.station.id, &[reading(&p1, 150.0)])
        .await
        .unwrap();
    assert_eq!(env.tank_level(&tank.id).await, 4_850.0);

    let updated = env
        .services
        .readings
        .update_reading(&shift.id, &recorded[0].id, 170.0)
        .await
        .unwrap();
    assert_eq!(updated.consumption, Some(170.0));
    assert_eq!(env.tank_level(&tank.id).await, 4_830.0);

    env.services
        .readings
        .update_reading(&shift.id, &recorded[0].id, 170.0)
        .await
        .unwrap();
    assert_eq!(env.tank_level(&tank.id).await, 4_830.0);

    // Lowering the closing value puts fuel back.
    env.services
        .readings
        .update_reading(&shift.id, &recorded[0].id, 140.0)
        .await
        .unwrap();
    assert_eq!(env.tank_level(&tank.id).await, 4_860.0);
}

#[tokio::test]
async fn test_update_reading_must_match_shift() {
    let Pumps { env, p1, shift, .. } = pumps().await;
    let recorded = env
        .services
        .readings
        .record_readings(&shift.id, &env.station.id, &[reading(&p1, 10.0)])
        .await
        .unwrap();

    env.clock.advance(Duration::hours(12));
    let other = env.services.shifts.resolve_inventory_shift(&env.station.id).await.unwrap();

    let err = env
        .services
        .readings
        .update_reading(&other.id, &recorded[0].id, 20.0)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(CoreError::ReadingShiftMismatch { .. })));
}

#[tokio::test]
async fn test_locked_shift_rejects_readings_until_unlocked() {
    let Pumps { env, tank, p1, shift, .. } = pumps().await;
    let recorded = env
        .services
        .readings
        .record_readings(&shift.id, &env.station.id, &[reading(&p1, 10.0)])
        .await
        .unwrap();

    let locked = env
        .services
        .readings
        .lock_shift(&shift.id, &env.station_manager.id)
        .await
        .unwrap();
    assert!(locked.locked);
    assert_eq!(locked.status, ShiftStatus::Locked);
    assert_eq!(locked.locked_by.as_deref(), Some(env.station_manager.id.as_str()));

    let err = env
        .services
        .readings
        .record_readings(&shift.id, &env.station.id, &[reading(&p1, 20.0)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidState));

    let err = env
        .services
        .readings
        .update_reading(&shift.id, &recorded[0].id, 20.0)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(CoreError::ShiftLocked(_))));
    assert_eq!(env.tank_level(&tank.id).await, 4_990.0);

    let unlocked = env
        .services
        .readings
        .unlock_shift(&shift.id, &env.admin.id)
        .await
        .unwrap();
    assert!(!unlocked.locked);
    assert_eq!(unlocked.status, ShiftStatus::Closed);
    assert_eq!(unlocked.locked_by.as_deref(), Some(env.admin.id.as_str()));

    env.services
        .readings
        .update_reading(&shift.id, &recorded[0].id, 20.0)
        .await
        .unwrap();
    assert_eq!(env.tank_level(&tank.id).await, 4_980.0);
}

#[tokio::test]
async fn test_readings_reject_foreign_nozzle_and_missing_shift() {
    let Pumps { env, shift, .. } = pumps().await;
    let elsewhere = env.add_station("Station Two").await;
    let far_tank = env.add_tank_at(&elsewhere, FuelType::Diesel, None, 100.0).await;
    let far_nozzle = env.add_nozzle("X1", &far_tank).await;

    let err = env
        .services
        .readings
        .record_readings(&shift.id, &env.station.id, &[reading(&far_nozzle, 5.0)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidInput));

    let err = env
        .services
        .readings
        .record_readings("missing", &env.station.id, &[reading(&far_nozzle, 5.0)])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(CoreError::ShiftNotFound(_))));
}

#[tokio::test]
async fn test_consumption_beyond_tank_level_fails() {
    let env = TestEnv::new().await;
    let tank = env.add_tank(FuelType::Gasoline91, Some(1_000.0), 40.0).await;
    let nozzle = env.add_nozzle("G1", &tank).await;
    let shift = env.services.shifts.resolve_inventory_shift(&env.station.id).await.unwrap();

    let err = env
        .services
        .readings
        .record_readings(&shift.id, &env.station.id, &[reading(&nozzle, 50.0)])
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Domain(CoreError::InsufficientFuel { .. })));
    assert_eq!(env.tank_level(&tank.id).await, 40.0);
    assert!(env.services.readings.shift_readings(&shift.id).await.unwrap().is_empty());
}
