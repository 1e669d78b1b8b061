//! Cash custody state machine tests.

mod common;

use common::TestEnv;
use petro_core::{
    CashTransaction, CoreError, CustodyStatus, ErrorKind, Money, NewCashTransaction, Station,
};
use petro_db::ServiceError;

fn cash_entry(station: &Station, liters: f64, card_cents: i64, bank_cents: i64) -> NewCashTransaction {
    NewCashTransaction {
        station_id: station.id.clone(),
        liters_sold: liters,
        rate_per_liter: Money::from_cents(250),
        card_payments: Money::from_cents(card_cents),
        bank_deposit: Money::from_cents(bank_cents),
    }
}

async fn record(env: &TestEnv) -> CashTransaction {
    env.services
        .custody
        .create_transaction(&env.station_manager.id, cash_entry(&env.station, 1_000.0, 150_000, 20_000))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_transaction_derives_amounts() {
    let env = TestEnv::new().await;

    let transaction = record(&env).await;

    assert_eq!(transaction.total_revenue_cents, 250_000);
    assert_eq!(transaction.cash_on_hand_cents, 100_000);
    assert_eq!(transaction.cash_to_am_cents, 80_000);
    assert_eq!(transaction.status, CustodyStatus::PendingAcceptance);
    assert_eq!(transaction.created_by.as_deref(), Some(env.station_manager.id.as_str()));

    let shift = env.services.shifts.get(&transaction.shift_id).await.unwrap();
    assert_eq!(shift.station_id, env.station.id);
}

#[tokio::test]
async fn test_one_transaction_per_shift() {
    let env = TestEnv::new().await;
    let first = record(&env).await;

    let err = env
        .services
        .custody
        .create_transaction(&env.station_manager.id, cash_entry(&env.station, 10.0, 0, 0))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Domain(CoreError::CashAlreadyRecorded(ref id)) if *id == first.shift_id));
    assert_eq!(err.kind(), Some(ErrorKind::InvalidState));
}

#[tokio::test]
async fn test_create_transaction_rejects_impossible_amounts() {
    let env = TestEnv::new().await;

    // Card payments above revenue.
    let err = env
        .services
        .custody
        .create_transaction(&env.station_manager.id, cash_entry(&env.station, 10.0, 5_000, 0))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidInput));

    // Bank deposit above cash on hand.
    let err = env
        .services
        .custody
        .create_transaction(&env.station_manager.id, cash_entry(&env.station, 10.0, 1_000, 2_000))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidInput));

    // Nothing was stored, so a valid entry still goes through.
    record(&env).await;
}

#[tokio::test]
async fn test_full_custody_chain() {
    let env = TestEnv::new().await;
    let transaction = record(&env).await;

    let transfer = env
        .services
        .custody
        .initiate_transfer(&transaction.id, &env.station_manager.id)
        .await
        .unwrap();
    assert_eq!(transfer.to_user_id, env.area_manager.id);
    assert_eq!(transfer.status, CustodyStatus::PendingAcceptance);
    assert_eq!(
        env.services.custody.get_transaction(&transaction.id).await.unwrap().status,
        CustodyStatus::PendingAcceptance
    );

    let accepted = env
        .services
        .custody
        .accept_cash(&transaction.id, &env.area_manager.id)
        .await
        .unwrap();
    assert_eq!(accepted.status, CustodyStatus::WithAm);
    assert_eq!(
        env.services.custody.get_transaction(&transaction.id).await.unwrap().status,
        CustodyStatus::WithAm
    );

    let deposited = env
        .services
        .custody
        .deposit_cash(&transaction.id, "receipts/receipt-1.jpg")
        .await
        .unwrap();
    assert_eq!(deposited.status, CustodyStatus::Deposited);
    assert_eq!(deposited.receipt_url.as_deref(), Some("receipts/receipt-1.jpg"));
    assert!(deposited.deposited_at.is_some());
    assert_eq!(
        env.services.custody.get_transaction(&transaction.id).await.unwrap().status,
        CustodyStatus::Deposited
    );

    let err = env
        .services
        .custody
        .deposit_cash(&transaction.id, "receipts/receipt-2.jpg")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(CoreError::AlreadyProcessed { .. })));
}

#[tokio::test]
async fn test_transfer_needs_an_area_manager() {
    let env = TestEnv::new().await;
    let transaction = record(&env).await;

    let err = env
        .services
        .custody
        .initiate_transfer(&transaction.id, &env.admin.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(CoreError::NoAreaManagerAssigned(_))));
    assert_eq!(err.kind(), Some(ErrorKind::Configuration));
    assert!(env.services.custody.transfer_for(&transaction.id).await.unwrap().is_none());

    env.services
        .custody
        .initiate_transfer(&transaction.id, &env.station_manager.id)
        .await
        .unwrap();
    let err = env
        .services
        .custody
        .initiate_transfer(&transaction.id, &env.station_manager.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(CoreError::AlreadyProcessed { .. })));
}

#[tokio::test]
async fn test_only_the_assigned_area_manager_accepts() {
    let env = TestEnv::new().await;
    let transaction = record(&env).await;
    env.services
        .custody
        .initiate_transfer(&transaction.id, &env.station_manager.id)
        .await
        .unwrap();

    let err = env
        .services
        .custody
        .accept_cash(&transaction.id, &env.admin.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(CoreError::Unauthorized { .. })));
    assert_eq!(err.kind(), Some(ErrorKind::Unauthorized));

    env.services
        .custody
        .accept_cash(&transaction.id, &env.area_manager.id)
        .await
        .unwrap();
    let err = env
        .services
        .custody
        .accept_cash(&transaction.id, &env.area_manager.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(CoreError::AlreadyProcessed { .. })));
}

#[tokio::test]
async fn test_deposit_requires_acceptance_and_receipt() {
    let env = TestEnv::new().await;
    let transaction = record(&env).await;

    // No transfer at all yet.
    let err = env
        .services
        .custody
        .deposit_cash(&transaction.id, "r.jpg")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));

    env.services
        .custody
        .initiate_transfer(&transaction.id, &env.station_manager.id)
        .await
        .unwrap();
    let err = env
        .services
        .custody
        .deposit_cash(&transaction.id, "r.jpg")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(CoreError::NotYetAccepted { .. })));

    let err = env.services.custody.deposit_cash(&transaction.id, "").await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidInput));
}

#[tokio::test]
async fn test_floating_cash_and_listing_by_role() {
    let env = TestEnv::new().await;
    let north = env.add_station("North").await;
    let north_manager = env.add_station_manager("SM-2", &north).await;

    let here = record(&env).await;
    let there = env
        .services
        .custody
        .create_transaction(&north_manager.id, cash_entry(&north, 400.0, 0, 0))
        .await
        .unwrap();
    assert_eq!(there.cash_to_am_cents, 100_000);

    let floating = env.services.custody.floating_cash().await.unwrap();
    assert_eq!(floating.total.cents(), 180_000);
    assert_eq!(floating.pending_acceptance.cents(), 180_000);
    assert_eq!(floating.transactions.len(), 2);

    // Move the first one all the way to the bank.
    env.services
        .custody
        .initiate_transfer(&here.id, &env.station_manager.id)
        .await
        .unwrap();
    env.services
        .custody
        .accept_cash(&here.id, &env.area_manager.id)
        .await
        .unwrap();

    let floating = env.services.custody.floating_cash().await.unwrap();
    assert_eq!(floating.total.cents(), 180_000);
    assert_eq!(floating.with_am.cents(), 80_000);
    assert_eq!(floating.pending_acceptance.cents(), 100_000);

    env.services
        .custody
        .deposit_cash(&here.id, "r.jpg")
        .await
        .unwrap();

    let floating = env.services.custody.floating_cash().await.unwrap();
    assert_eq!(floating.total.cents(), 100_000);
    assert_eq!(floating.transactions.len(), 1);

    let sm_view = env
        .services
        .custody
        .list_transactions(&env.actor(&env.station_manager))
        .await
        .unwrap();
    assert_eq!(sm_view.len(), 1);
    assert_eq!(sm_view[0].id, here.id);

    let am_view = env
        .services
        .custody
        .list_transactions(&env.actor(&env.area_manager))
        .await
        .unwrap();
    assert_eq!(am_view.len(), 1);
    assert_eq!(am_view[0].id, there.id);

    let admin_view = env
        .services
        .custody
        .list_transactions(&env.actor(&env.admin))
        .await
        .unwrap();
    assert_eq!(admin_view.len(), 2);
}
