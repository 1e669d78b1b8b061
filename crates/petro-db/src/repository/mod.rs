//! # Repository Module
//!
//! Database repository implementations for Petro Station.
//!
//! ## Two Ways In
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Read path (CLI queries)              Write path (services)             │
//! │  ───────────────────────              ─────────────────────             │
//! │  db.tanks().list_for_station(id)      let mut tx = ctx.begin_write()    │
//! │        │                              tank::apply_delta(&mut *tx, ..)   │
//! │        │ acquire connection           shift::close_and_lock(&mut *tx,..)│
//! │        ▼                              tx.commit()                       │
//! │  tank::list_for_station(&mut conn)          │                           │
//! │        │                                    │                           │
//! │        └──────────────┬─────────────────────┘                           │
//! │                       ▼                                                 │
//! │            one SQL function per query                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each module exposes crate-private functions taking `&mut SqliteConnection`
//! so services can compose them inside one transaction, plus a small
//! repository struct for standalone reads.

pub mod cash;
pub mod delivery;
pub mod nozzle;
pub mod price;
pub mod reading;
pub mod sale;
pub mod shift;
pub mod station;
pub mod tank;
pub mod user;

pub use cash::CashRepository;
pub use delivery::DeliveryRepository;
pub use nozzle::NozzleRepository;
pub use price::PriceRepository;
pub use reading::ReadingRepository;
pub use sale::SaleRepository;
pub use shift::ShiftRepository;
pub use station::StationRepository;
pub use tank::TankRepository;
pub use user::{UserCredentials, UserRepository};
