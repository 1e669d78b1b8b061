//! Nozzle sales engine tests.

mod common;

use common::TestEnv;
use petro_core::{CoreError, ErrorKind, FuelType, Money, NozzleSale, SaleUpdate, ShiftStatus};
use petro_db::ServiceError;

fn quantity(liters: f64) -> SaleUpdate {
    SaleUpdate {
        quantity_liters: Some(liters),
        ..SaleUpdate::default()
    }
}

fn sale_for<'a>(sales: &'a [NozzleSale], nozzle_id: &str) -> &'a NozzleSale {
    sales.iter().find(|s| s.nozzle_id == nozzle_id).unwrap()
}

#[tokio::test]
async fn test_update_sale_derives_total_and_keeps_other_fields() {
    let env = TestEnv::new().await;
    let tank = env.add_tank(FuelType::Diesel, Some(10_000.0), 5_000.0).await;
    env.add_nozzle("D1", &tank).await;
    env.set_price(FuelType::Diesel, 166).await;
    let shift = env.services.shifts.resolve_inventory_shift(&env.station.id).await.unwrap();
    let sale = env.services.sales.shift_sales(&shift.id).await.unwrap().remove(0);

    let updated = env.services.sales.update_sale(&sale.id, quantity(100.0)).await.unwrap();
    assert_eq!(updated.total_amount_cents, 16_600);
    assert_eq!(updated.price_per_liter_cents, 166);

    let updated = env
        .services
        .sales
        .update_sale(
            &sale.id,
            SaleUpdate {
                card_amount: Some(Money::from_cents(6_600)),
                cash_amount: Some(Money::from_cents(10_000)),
                ..SaleUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.quantity_liters, 100.0);
    assert_eq!(updated.card_amount_cents, 6_600);
    assert_eq!(updated.cash_amount_cents, 10_000);
    assert_eq!(updated.total_amount_cents, 16_600);
}

#[tokio::test]
async fn test_update_sale_rejects_negative_values_and_unknown_rows() {
    let env = TestEnv::new().await;
    let tank = env.add_tank(FuelType::Diesel, Some(10_000.0), 5_000.0).await;
    env.add_nozzle("D1", &tank).await;
    let shift = env.services.shifts.resolve_inventory_shift(&env.station.id).await.unwrap();
    let sale = env.services.sales.shift_sales(&shift.id).await.unwrap().remove(0);

    let err = env.services.sales.update_sale(&sale.id, quantity(-1.0)).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidInput));

    let err = env
        .services
        .sales
        .update_sale(
            &sale.id,
            SaleUpdate {
                card_amount: Some(Money::from_cents(-5)),
                ..SaleUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidInput));

    let err = env.services.sales.update_sale("missing", quantity(1.0)).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_submit_debits_tanks_and_locks_shift() {
    let env = TestEnv::new().await;
    let tank = env.add_tank(FuelType::Gasoline95, Some(10_000.0), 3_000.0).await;
    let p1 = env.add_nozzle("P1", &tank).await;
    let p2 = env.add_nozzle("P2", &tank).await;
    let shift = env.services.shifts.resolve_inventory_shift(&env.station.id).await.unwrap();
    let sales = env.services.sales.shift_sales(&shift.id).await.unwrap();

    env.services
        .sales
        .update_sale(&sale_for(&sales, &p1.id).id, quantity(120.0))
        .await
        .unwrap();
    env.services
        .sales
        .update_sale(&sale_for(&sales, &p2.id).id, quantity(80.0))
        .await
        .unwrap();

    let submission = env.services.sales.submit_sales(&shift.id).await.unwrap();
    assert_eq!(submission.shift.status, ShiftStatus::Closed);
    assert!(submission.shift.locked);
    assert!(submission.shift.end_time.is_some());
    assert_eq!(submission.tanks.len(), 1);
    assert_eq!(submission.tanks[0].current_level, 2_800.0);

    // No readings were recorded, so both nozzles show up as variances.
    assert!(!submission.reconciliation.is_balanced());
    assert_eq!(submission.reconciliation.total_sold, 200.0);

    let err = env.services.sales.submit_sales(&shift.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Domain(CoreError::ShiftLocked(_))));
    let err = env
        .services
        .sales
        .update_sale(&sale_for(&sales, &p1.id).id, quantity(1.0))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(CoreError::ShiftLocked(_))));

    assert_eq!(env.tank_level(&tank.id).await, 2_800.0);
}

#[tokio::test]
async fn test_submit_is_all_or_nothing_across_tanks() {
    let env = TestEnv::new().await;
    let full = env.add_tank(FuelType::Diesel, Some(10_000.0), 5_000.0).await;
    let short = env.add_tank(FuelType::Gasoline91, Some(10_000.0), 100.0).await;
    let d1 = env.add_nozzle("D1", &full).await;
    let g1 = env.add_nozzle("G1", &short).await;
    let shift = env.services.shifts.resolve_inventory_shift(&env.station.id).await.unwrap();
    let sales = env.services.sales.shift_sales(&shift.id).await.unwrap();

    env.services
        .sales
        .update_sale(&sale_for(&sales, &d1.id).id, quantity(300.0))
        .await
        .unwrap();
    env.services
        .sales
        .update_sale(&sale_for(&sales, &g1.id).id, quantity(200.0))
        .await
        .unwrap();

    let err = env.services.sales.submit_sales(&shift.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Domain(CoreError::InsufficientFuel { .. })));
    assert!(err.to_string().contains("Current: 100L, Needed: 200L"));

    assert_eq!(env.tank_level(&full.id).await, 5_000.0);
    assert_eq!(env.tank_level(&short.id).await, 100.0);
    let shift = env.services.shifts.get(&shift.id).await.unwrap();
    assert!(!shift.locked);
    assert_eq!(shift.status, ShiftStatus::Open);

    // Correcting the figure lets the submission through.
    env.services
        .sales
        .update_sale(&sale_for(&sales, &g1.id).id, quantity(100.0))
        .await
        .unwrap();
    env.services.sales.submit_sales(&shift.id).await.unwrap();
    assert_eq!(env.tank_level(&full.id).await, 4_700.0);
    assert_eq!(env.tank_level(&short.id).await, 0.0);
}

#[tokio::test]
async fn test_resubmission_after_unlock_debits_only_the_edits() {
    let env = TestEnv::new().await;
    let tank = env.add_tank(FuelType::Diesel, Some(10_000.0), 3_000.0).await;
    let p1 = env.add_nozzle("P1", &tank).await;
    let shift = env.services.shifts.resolve_inventory_shift(&env.station.id).await.unwrap();
    let sales = env.services.sales.shift_sales(&shift.id).await.unwrap();
    let sale_id = sale_for(&sales, &p1.id).id.clone();

    env.services.sales.update_sale(&sale_id, quantity(120.0)).await.unwrap();
    env.services.sales.submit_sales(&shift.id).await.unwrap();
    assert_eq!(env.tank_level(&tank.id).await, 2_880.0);

    // Unlocked and resubmitted untouched: nothing moves.
    env.services.readings.unlock_shift(&shift.id, &env.admin.id).await.unwrap();
    let submission = env.services.sales.submit_sales(&shift.id).await.unwrap();
    assert_eq!(submission.tanks[0].current_level, 2_880.0);

    env.services.readings.unlock_shift(&shift.id, &env.admin.id).await.unwrap();
    env.services.sales.update_sale(&sale_id, quantity(150.0)).await.unwrap();
    env.services.sales.submit_sales(&shift.id).await.unwrap();
    assert_eq!(env.tank_level(&tank.id).await, 2_850.0);

    // Lowering the quantity credits the difference back.
    env.services.readings.unlock_shift(&shift.id, &env.admin.id).await.unwrap();
    env.services.sales.update_sale(&sale_id, quantity(100.0)).await.unwrap();
    let submission = env.services.sales.submit_sales(&shift.id).await.unwrap();
    assert!(submission.shift.locked);
    assert_eq!(env.tank_level(&tank.id).await, 2_900.0);
}

#[tokio::test]
async fn test_seeded_price_is_frozen_for_the_shift() {
    let env = TestEnv::new().await;
    let tank = env.add_tank(FuelType::Diesel, Some(10_000.0), 5_000.0).await;
    env.add_nozzle("D1", &tank).await;
    env.set_price(FuelType::Diesel, 160).await;
    let shift = env.services.shifts.resolve_inventory_shift(&env.station.id).await.unwrap();

    env.set_price(FuelType::Diesel, 175).await;
    let sale = env.services.sales.shift_sales(&shift.id).await.unwrap().remove(0);
    assert_eq!(sale.price_per_liter_cents, 160);

    let updated = env.services.sales.update_sale(&sale.id, quantity(10.0)).await.unwrap();
    assert_eq!(updated.total_amount_cents, 1_600);
}
