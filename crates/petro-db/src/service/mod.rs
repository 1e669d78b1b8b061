//! # Service Module
//!
//! Station operations, each one a single database transaction.
//!
//! ## Call Graph
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CashCustody ─────────► ShiftResolver (cash-entry policy)               │
//! │                                                                         │
//! │  ShiftResolver ───────► NozzleSalesEngine::seed_in (new inventory shift)│
//! │                                                                         │
//! │  MeterReadingEngine ──┐                                                 │
//! │  NozzleSalesEngine ───┼─► TankLedger::apply_delta (conditional UPDATE)  │
//! │  InventoryService ────┘                                                 │
//! │                                                                         │
//! │  FuelPriceRegister ◄── price snapshots for sales and readings           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Services compose through crate-private functions that take the caller's
//! connection, so a whole operation commits or rolls back as one unit.

pub mod accounts;
pub mod config;
pub mod custody;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod prices;
pub mod readings;
pub mod receipts;
pub mod sales;
pub mod shift;

use sqlx::SqlitePool;
use std::sync::Arc;

use petro_core::Clock;

pub use accounts::{AccountService, NewUser};
pub use config::{ServiceConfig, ServiceContext};
pub use custody::CashCustody;
pub use error::{ServiceError, ServiceResult};
pub use inventory::{DeliveryRecorded, InventoryService};
pub use ledger::TankLedger;
pub use prices::FuelPriceRegister;
pub use readings::MeterReadingEngine;
pub use receipts::{FsReceiptStore, ReceiptStore};
pub use sales::{NozzleSalesEngine, SalesSubmission};
pub use shift::ShiftResolver;

/// Every service over one pool, settings and clock.
#[derive(Debug, Clone)]
pub struct Services {
    pub ledger: TankLedger,
    pub shifts: ShiftResolver,
    pub readings: MeterReadingEngine,
    pub sales: NozzleSalesEngine,
    pub custody: CashCustody,
    pub prices: FuelPriceRegister,
    pub inventory: InventoryService,
    pub accounts: AccountService,
}

impl Services {
    pub fn new(pool: SqlitePool, config: ServiceConfig, clock: Arc<dyn Clock>) -> Self {
        let ctx = ServiceContext::new(pool, config, clock);
        Services {
            ledger: TankLedger::new(ctx.clone()),
            shifts: ShiftResolver::new(ctx.clone()),
            readings: MeterReadingEngine::new(ctx.clone()),
            sales: NozzleSalesEngine::new(ctx.clone()),
            custody: CashCustody::new(ctx.clone()),
            prices: FuelPriceRegister::new(ctx.clone()),
            inventory: InventoryService::new(ctx.clone()),
            accounts: AccountService::new(ctx),
        }
    }
}
