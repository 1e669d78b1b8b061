//! # petro-db: Database Layer for Petro Station
//!
//! SQLite storage through sqlx, and the transactional services that run
//! every station operation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Petro Station Data Flow                            │
//! │                                                                         │
//! │  petro-cli (submit-sales --shift S)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     petro-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Services    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │ (service/)    │───►│ (repository/) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ one tx per    │    │ one fn per    │    │ 001_initial  │  │   │
//! │  │   │ operation     │    │ query         │    │ _schema.sql  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One module per table
//! - [`service`] - Tank ledger, shift resolver, readings, sales, custody, prices
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use petro_core::SystemClock;
//! use petro_db::{Database, DbConfig, ServiceConfig};
//!
//! let db = Database::new(DbConfig::new("petro.db")).await?;
//! let services = db.services(ServiceConfig::default(), Arc::new(SystemClock));
//!
//! let shift = services.shifts.resolve_inventory_shift(&station_id).await?;
//! services.readings.record_readings(&shift.id, &station_id, &inputs).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use service::{ServiceConfig, ServiceError, ServiceResult, Services};
