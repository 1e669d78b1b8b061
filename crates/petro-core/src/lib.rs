//! # petro-core: Pure Business Logic for Petro Station
//!
//! This crate is the **heart** of Petro Station. It contains the rules for
//! fuel accounting and cash custody as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Petro Station Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    petro-cli (boundary)                         │   │
//! │  │    token → Actor ──► AccessPolicy ──► service operation        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    petro-db (services)                          │   │
//! │  │   ShiftResolver • MeterReadingEngine • NozzleSalesEngine        │   │
//! │  │   TankLedger • CashCustody • FuelPriceRegister                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ petro-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   types • money • shift • metering • cash • reconcile • access │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (Tank, Nozzle, Shift, CashTransaction, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types and their [`ErrorKind`] classification
//! - [`validation`] - Field-level input validation
//! - [`clock`] - Injectable time source
//! - [`shift`] - The two shift-window policies
//! - [`metering`] - Meter-delta consumption and per-tank aggregation
//! - [`cash`] - Cash breakdown and floating-cash aggregation
//! - [`reconcile`] - Sales track vs readings track comparison
//! - [`access`] - Role-based access policy consulted by the boundary
//!
//! ## Example Usage
//!
//! ```rust
//! use petro_core::cash::CashBreakdown;
//! use petro_core::money::Money;
//!
//! let breakdown = CashBreakdown::compute(
//!     1000.0,
//!     Money::from_cents(250),
//!     Money::from_cents(150_000),
//!     Money::from_cents(20_000),
//! )
//! .unwrap();
//!
//! assert_eq!(breakdown.total_revenue, Money::from_cents(250_000));
//! assert_eq!(breakdown.cash_on_hand, Money::from_cents(100_000));
//! assert_eq!(breakdown.cash_to_am, Money::from_cents(80_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod cash;
pub mod clock;
pub mod error;
pub mod metering;
pub mod money;
pub mod reconcile;
pub mod shift;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{AccessPolicy, Actor, Operation, RouteAccessPolicy};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use shift::{ShiftWindow, ShiftWindowPolicy};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Length of one shift window in hours (both policies split the day in two).
pub const SHIFT_WINDOW_HOURS: i64 = 12;

/// Price snapshot used when a station has no registered price for a fuel type.
///
/// Logged whenever it is applied so operators can register a real price.
pub const DEFAULT_FALLBACK_PRICE: Money = Money::from_cents(10_000);

/// Default meter rollover ceiling for new nozzles.
pub const DEFAULT_METER_LIMIT: f64 = 999_999.0;

/// Tolerance used when comparing liter quantities from the two accounting tracks.
pub const LITER_EPSILON: f64 = 1e-6;
