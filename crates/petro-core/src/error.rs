//! # Error Types
//!
//! Domain-specific error types for petro-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  petro-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule failures                         │
//! │  ├── ErrorKind        - NotFound / InvalidState / InvalidInput /       │
//! │  │                      Unauthorized / Configuration                   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  petro-db errors (separate crate)                                      │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── ServiceError     - CoreError | DbError from a service operation   │
//! │                                                                         │
//! │  petro-cli errors (app)                                                │
//! │  └── CliError         - What the operator sees (code + message)        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → CliError           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (tank fuel type, levels, IDs)
//! 3. Every variant maps to exactly one [`ErrorKind`]
//! 4. Errors are raised, never recovered silently: the enclosing
//!    transaction rolls back and the caller decides whether to retry

use serde::Serialize;
use thiserror::Error;

use crate::types::{CustodyStatus, FuelType};

// =============================================================================
// Error Kind
// =============================================================================

/// Coarse classification of a business failure.
///
/// The boundary layer maps each kind to a response code without having to
/// know every concrete variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Referenced entity does not exist.
    NotFound,
    /// Entity is in the wrong lifecycle state for the operation.
    InvalidState,
    /// Negative or out-of-range computed value.
    InvalidInput,
    /// Actor is not the party required for the transition.
    Unauthorized,
    /// Organisational setup is missing (e.g. no area manager).
    Configuration,
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Generic lookup failure for stations, tanks, nozzles, users, sales...
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Shift not found: {0}")]
    ShiftNotFound(String),

    /// Shift has been locked; readings and sales are frozen.
    #[error("Shift {0} is locked")]
    ShiftLocked(String),

    /// Reading does not belong to the shift named in the request.
    #[error("Reading {reading_id} does not belong to shift {shift_id}")]
    ReadingShiftMismatch { reading_id: String, shift_id: String },

    /// Meter went backwards.
    ///
    /// ## When This Occurs
    /// ```text
    /// opening = 150.0 (previous shift closing)
    /// closing = 120.0 (submitted)
    ///      │
    ///      ▼
    /// consumption = -30.0 → InvalidReading
    /// ```
    #[error("Invalid reading for nozzle {nozzle}: closing {closing} is below opening {opening}")]
    InvalidReading {
        nozzle: String,
        opening: f64,
        closing: f64,
    },

    /// Delivery would push a tank above its capacity.
    #[error(
        "Delivery exceeds tank capacity. Capacity: {capacity}L, Current: {current}L, \
         Delivery: {delivered}L, New Total: {new_total}L"
    )]
    InvalidDelivery {
        capacity: f64,
        current: f64,
        delivered: f64,
        new_total: f64,
    },

    /// A debit would take a tank below empty.
    #[error("Insufficient fuel in {fuel_type} tank. Current: {current}L, Needed: {needed}L")]
    InsufficientFuel {
        fuel_type: FuelType,
        current: f64,
        needed: f64,
    },

    /// Cash transaction or transfer has already moved past the expected state.
    #[error("{entity} {id} already processed (status {status})")]
    AlreadyProcessed {
        entity: &'static str,
        id: String,
        status: CustodyStatus,
    },

    /// A cash transaction already exists for the shift (1:1 relation).
    #[error("Shift {0} already has a cash transaction")]
    CashAlreadyRecorded(String),

    /// Deposit attempted before the area manager accepted the cash.
    #[error("Cash for transaction {id} must be accepted before deposit (status {status})")]
    NotYetAccepted { id: String, status: CustodyStatus },

    /// Acting user is not the party the custody step requires.
    #[error("User {user_id} is not authorized to {action}")]
    Unauthorized { user_id: String, action: &'static str },

    /// Role gate at the boundary rejected the operation.
    #[error("Role {role} may not perform {operation}")]
    Forbidden { role: String, operation: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No area manager assigned to user {0}")]
    NoAreaManagerAssigned(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Classifies the error for the boundary layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound { .. } | CoreError::ShiftNotFound(_) => ErrorKind::NotFound,
            CoreError::ShiftLocked(_)
            | CoreError::ReadingShiftMismatch { .. }
            | CoreError::AlreadyProcessed { .. }
            | CoreError::CashAlreadyRecorded(_)
            | CoreError::NotYetAccepted { .. } => ErrorKind::InvalidState,
            CoreError::InvalidReading { .. }
            | CoreError::InvalidDelivery { .. }
            | CoreError::InsufficientFuel { .. }
            | CoreError::Validation(_) => ErrorKind::InvalidInput,
            CoreError::Unauthorized { .. }
            | CoreError::Forbidden { .. }
            | CoreError::InvalidCredentials => ErrorKind::Unauthorized,
            CoreError::NoAreaManagerAssigned(_) => ErrorKind::Configuration,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Derived amount exceeds the amount it is taken from.
    #[error("{field} ({amount}) exceeds {limit_field} ({limit})")]
    Exceeds {
        field: String,
        amount: String,
        limit_field: String,
        limit: String,
    },

    /// Invalid format (e.g., invalid UUID, invalid amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_fuel_message_names_tank() {
        let err = CoreError::InsufficientFuel {
            fuel_type: FuelType::Diesel,
            current: 40.0,
            needed: 55.5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient fuel in DIESEL tank. Current: 40L, Needed: 55.5L"
        );
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_delivery_message_includes_totals() {
        let err = CoreError::InvalidDelivery {
            capacity: 10000.0,
            current: 9000.0,
            delivered: 2000.0,
            new_total: 11000.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("Capacity: 10000L"));
        assert!(msg.contains("New Total: 11000L"));
    }

    #[test]
    fn test_kinds() {
        assert_eq!(CoreError::ShiftLocked("s".into()).kind(), ErrorKind::InvalidState);
        assert_eq!(
            CoreError::NoAreaManagerAssigned("u".into()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            CoreError::Unauthorized {
                user_id: "u".into(),
                action: "accept cash"
            }
            .kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(CoreError::not_found("Tank", "t1").kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "receipt_url".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.kind(), ErrorKind::InvalidInput);
    }
}
