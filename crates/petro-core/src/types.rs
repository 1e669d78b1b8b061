//! # Domain Types
//!
//! Core domain types used throughout Petro Station.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Station ──┬── Tank ──── Nozzle            (inventory)                  │
//! │            │     ▲                                                      │
//! │            │     └── TankerDelivery         (ledger credit)             │
//! │            │                                                            │
//! │            ├── Shift ──┬── NozzleReading    (ledger debit, meters)      │
//! │            │           ├── NozzleSale       (ledger debit, revenue)     │
//! │            │           └── CashTransaction ── CashTransfer (custody)    │
//! │            │                                                            │
//! │            └── FuelPrice                    (append-only history)       │
//! │                                                                         │
//! │  User { role: SM | AM | Admin, station, area_manager }                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conventions
//! - `id`: UUID v4 string, immutable, used for every relation
//! - Liters and meter values are `f64` measurements
//! - Money columns are integer cents with a `Money` accessor

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Fuel Type
// =============================================================================

/// The closed set of fuels a station sells.
///
/// Shared by tanks, nozzles and prices. Adding a fuel is a schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum FuelType {
    #[serde(rename = "91_GASOLINE")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "91_GASOLINE"))]
    Gasoline91,
    #[serde(rename = "95_GASOLINE")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "95_GASOLINE"))]
    Gasoline95,
    #[serde(rename = "DIESEL")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "DIESEL"))]
    Diesel,
}

impl FuelType {
    /// All fuel types, in display order.
    pub const ALL: [FuelType; 3] = [FuelType::Gasoline91, FuelType::Gasoline95, FuelType::Diesel];

    /// Wire/storage code for this fuel type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            FuelType::Gasoline91 => "91_GASOLINE",
            FuelType::Gasoline95 => "95_GASOLINE",
            FuelType::Diesel => "DIESEL",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FuelType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FuelType::ALL
            .into_iter()
            .find(|fuel| fuel.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "fuel_type".to_string(),
                reason: format!("expected one of 91_GASOLINE, 95_GASOLINE, DIESEL, got {s}"),
            })
    }
}

// =============================================================================
// Role
// =============================================================================

/// Organisational role of a user. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum Role {
    /// Station manager: runs one station's shifts and cash entry.
    #[serde(rename = "SM")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "SM"))]
    StationManager,
    /// Area manager: takes custody of cash from their station managers.
    #[serde(rename = "AM")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "AM"))]
    AreaManager,
    #[serde(rename = "Admin")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Admin"))]
    Admin,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::StationManager => "SM",
            Role::AreaManager => "AM",
            Role::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "SM" | "sm" => Ok(Role::StationManager),
            "AM" | "am" => Ok(Role::AreaManager),
            "Admin" | "admin" | "ADMIN" => Ok(Role::Admin),
            other => Err(ValidationError::InvalidFormat {
                field: "role".to_string(),
                reason: format!("expected SM, AM or Admin, got {other}"),
            }),
        }
    }
}

// =============================================================================
// Shift Type & Status
// =============================================================================

/// Which half of the day a shift covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShiftType {
    Day,
    Night,
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShiftType::Day => "DAY",
            ShiftType::Night => "NIGHT",
        })
    }
}

/// Shift lifecycle.
///
/// ```text
/// OPEN ──► CLOSED ──► LOCKED
///   │                   ▲
///   └───────────────────┘   (lock straight from OPEN)
///
/// unlock: LOCKED ──► CLOSED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShiftStatus {
    Open,
    Closed,
    Locked,
}

impl Default for ShiftStatus {
    fn default() -> Self {
        ShiftStatus::Open
    }
}

impl fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShiftStatus::Open => "OPEN",
            ShiftStatus::Closed => "CLOSED",
            ShiftStatus::Locked => "LOCKED",
        })
    }
}

// =============================================================================
// Custody Status
// =============================================================================

/// Cash custody state, shared by `CashTransaction` and `CashTransfer`.
///
/// Transitions only move forward:
/// `PENDING_ACCEPTANCE → WITH_AM → DEPOSITED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustodyStatus {
    PendingAcceptance,
    WithAm,
    Deposited,
}

impl CustodyStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CustodyStatus::PendingAcceptance => "PENDING_ACCEPTANCE",
            CustodyStatus::WithAm => "WITH_AM",
            CustodyStatus::Deposited => "DEPOSITED",
        }
    }

    /// The only state reachable from this one, if any.
    pub const fn next(&self) -> Option<CustodyStatus> {
        match self {
            CustodyStatus::PendingAcceptance => Some(CustodyStatus::WithAm),
            CustodyStatus::WithAm => Some(CustodyStatus::Deposited),
            CustodyStatus::Deposited => None,
        }
    }

    /// Whether the cash is still floating (not yet in the bank).
    pub const fn is_floating(&self) -> bool {
        !matches!(self, CustodyStatus::Deposited)
    }
}

impl Default for CustodyStatus {
    fn default() -> Self {
        CustodyStatus::PendingAcceptance
    }
}

impl fmt::Display for CustodyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Station & User
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A user as seen by the rest of the system.
///
/// The password hash lives only in the credential store and is never part
/// of this type.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    /// Business identifier printed on the badge (unique).
    pub employee_id: String,
    pub name: String,
    pub role: Role,
    /// Home station (station managers only).
    pub station_id: Option<String>,
    /// The area manager this station manager hands cash to.
    pub area_manager_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Tank & Nozzle
// =============================================================================

/// A fuel tank. `current_level` is only ever changed by the tank ledger.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Tank {
    pub id: String,
    pub station_id: String,
    pub fuel_type: FuelType,
    /// Upper bound in liters; `None` means unbounded.
    pub capacity: Option<f64>,
    pub current_level: f64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Tank {
    /// Whether the tank can take `liters` more without overflowing.
    pub fn can_receive(&self, liters: f64) -> bool {
        match self.capacity {
            Some(capacity) => self.current_level + liters <= capacity,
            None => true,
        }
    }

    /// Whether the tank holds at least `liters`.
    pub fn can_supply(&self, liters: f64) -> bool {
        self.current_level - liters >= 0.0
    }
}

/// Tank plus the number of nozzles drawing from it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TankSummary {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub tank: Tank,
    pub nozzle_count: i64,
}

/// A dispensing nozzle. Draws from exactly one tank of the same fuel type.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Nozzle {
    pub id: String,
    /// Unique display name ("P1-A").
    pub name: String,
    pub station_id: String,
    pub tank_id: String,
    pub fuel_type: FuelType,
    /// Meter rollover ceiling.
    pub meter_limit: f64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Nozzle joined with the state of the tank it draws from.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct NozzleWithTank {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub nozzle: Nozzle,
    pub tank_current_level: f64,
    pub tank_capacity: Option<f64>,
}

// =============================================================================
// Shift
// =============================================================================

/// A DAY or NIGHT operating window at one station.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Shift {
    pub id: String,
    pub station_id: String,
    pub shift_type: ShiftType,
    /// Start of the window bucket this shift was resolved for.
    ///
    /// Together with station and type this is unique among OPEN shifts.
    #[ts(as = "String")]
    pub window_start: DateTime<Utc>,
    #[ts(as = "String")]
    pub start_time: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub end_time: Option<DateTime<Utc>>,
    pub status: ShiftStatus,
    pub locked: bool,
    pub locked_by: Option<String>,
    #[ts(as = "Option<String>")]
    pub locked_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Nozzle Reading
// =============================================================================

/// Meter readings for one nozzle in one shift.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct NozzleReading {
    pub id: String,
    pub shift_id: String,
    pub nozzle_id: String,
    /// Previous shift's closing reading, or 0.
    pub opening_reading: f64,
    pub closing_reading: Option<f64>,
    /// closing − opening; always ≥ 0.
    pub consumption: Option<f64>,
    pub is_rollover: bool,
    /// Fuel price at the time the reading was first recorded.
    pub price_per_liter_cents: Option<i64>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl NozzleReading {
    pub fn price_per_liter(&self) -> Option<Money> {
        self.price_per_liter_cents.map(Money::from_cents)
    }
}

/// Closing meter value submitted for a nozzle.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReadingInput {
    pub nozzle_id: String,
    pub closing_reading: f64,
}

// =============================================================================
// Nozzle Sale
// =============================================================================

/// Revenue line for one nozzle in one shift.
///
/// Uses the snapshot pattern: the price is frozen when the shift opens.
/// `total_amount_cents` is derived by the database and never written.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct NozzleSale {
    pub id: String,
    pub shift_id: String,
    pub nozzle_id: String,
    pub quantity_liters: f64,
    pub price_per_liter_cents: i64,
    pub card_amount_cents: i64,
    pub cash_amount_cents: i64,
    pub total_amount_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl NozzleSale {
    #[inline]
    pub fn price_per_liter(&self) -> Money {
        Money::from_cents(self.price_per_liter_cents)
    }

    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

/// Partial edit of a sale line. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleUpdate {
    pub quantity_liters: Option<f64>,
    pub card_amount: Option<Money>,
    pub cash_amount: Option<Money>,
}

impl SaleUpdate {
    pub fn is_empty(&self) -> bool {
        self.quantity_liters.is_none() && self.card_amount.is_none() && self.cash_amount.is_none()
    }
}

// =============================================================================
// Tanker Delivery
// =============================================================================

/// A fuel delivery into a tank. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TankerDelivery {
    pub id: String,
    pub tank_id: String,
    pub liters_delivered: f64,
    #[ts(as = "String")]
    pub delivery_date: DateTime<Utc>,
    pub delivered_by: Option<String>,
    /// Tanker ticket / waybill number.
    pub ticket_ref: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewDelivery {
    pub tank_id: String,
    pub liters: f64,
    /// Defaults to now when absent.
    #[ts(as = "Option<String>")]
    pub delivery_date: Option<DateTime<Utc>>,
    pub delivered_by: Option<String>,
    pub ticket_ref: Option<String>,
    pub notes: Option<String>,
}

// =============================================================================
// Fuel Price
// =============================================================================

/// One entry in a station's price history.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct FuelPrice {
    pub id: String,
    pub station_id: String,
    pub fuel_type: FuelType,
    pub price_per_liter_cents: i64,
    #[ts(as = "String")]
    pub effective_from: DateTime<Utc>,
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl FuelPrice {
    #[inline]
    pub fn price_per_liter(&self) -> Money {
        Money::from_cents(self.price_per_liter_cents)
    }
}

// =============================================================================
// Cash Custody
// =============================================================================

/// Cash collected for one shift (1:1 with the shift).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashTransaction {
    pub id: String,
    pub shift_id: String,
    pub station_id: String,
    pub liters_sold: f64,
    pub rate_per_liter_cents: i64,
    pub total_revenue_cents: i64,
    pub card_payments_cents: i64,
    pub cash_on_hand_cents: i64,
    pub bank_deposit_cents: i64,
    pub cash_to_am_cents: i64,
    pub status: CustodyStatus,
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl CashTransaction {
    #[inline]
    pub fn total_revenue(&self) -> Money {
        Money::from_cents(self.total_revenue_cents)
    }

    #[inline]
    pub fn cash_on_hand(&self) -> Money {
        Money::from_cents(self.cash_on_hand_cents)
    }

    #[inline]
    pub fn cash_to_am(&self) -> Money {
        Money::from_cents(self.cash_to_am_cents)
    }
}

/// Station manager's cash entry for the current shift.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCashTransaction {
    pub station_id: String,
    pub liters_sold: f64,
    pub rate_per_liter: Money,
    pub card_payments: Money,
    pub bank_deposit: Money,
}

/// Handoff of a transaction's cash from a station manager to their area manager.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashTransfer {
    pub id: String,
    pub cash_transaction_id: String,
    pub from_user_id: String,
    pub to_user_id: String,
    pub status: CustodyStatus,
    pub receipt_url: Option<String>,
    #[ts(as = "Option<String>")]
    pub deposited_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
