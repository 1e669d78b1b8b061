//! # Validation Module
//!
//! Field-level input checks run before any business logic touches the store.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI argument parsing (clap)                                  │
//! │  ├── Types: numbers, enums, money strings                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Finite, non-negative measurements                                 │
//! │  ├── Non-empty identifiers and receipt paths                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Services + SQLite                                            │
//! │  ├── Lifecycle preconditions (conditional UPDATEs)                     │
//! │  ├── UNIQUE / CHECK / FOREIGN KEY constraints                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use petro_core::validation::{validate_liters, validate_required};
//!
//! assert!(validate_liters("closing_reading", 150.0).is_ok());
//! assert!(validate_liters("closing_reading", -1.0).is_err());
//! assert!(validate_required("receipt_url", "  ").is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length for names (stations, users, nozzles).
pub const MAX_NAME_LENGTH: usize = 100;

/// Minimum password length accepted when registering a user.
pub const MIN_PASSWORD_LENGTH: usize = 8;

// =============================================================================
// String Validators
// =============================================================================

/// Rejects empty or whitespace-only values.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a display name.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_NAME_LENGTH`] characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    validate_required(field, name)?;

    if name.trim().chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates an employee id: non-empty, no whitespace inside.
pub fn validate_employee_id(employee_id: &str) -> ValidationResult<()> {
    validate_name("employee_id", employee_id)?;

    if employee_id.trim().chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "employee_id".to_string(),
            reason: "must not contain spaces".to_string(),
        });
    }

    Ok(())
}

pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidFormat {
            field: "password".to_string(),
            reason: format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a liter quantity or meter value: finite and ≥ 0.
///
/// ## Example
/// ```rust
/// use petro_core::validation::validate_liters;
///
/// assert!(validate_liters("quantity", 0.0).is_ok());
/// assert!(validate_liters("quantity", f64::NAN).is_err());
/// ```
pub fn validate_liters(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a strictly positive liter quantity (deliveries, capacities).
pub fn validate_positive_liters(field: &str, value: f64) -> ValidationResult<()> {
    validate_liters(field, value)?;
    if value <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates that an amount is not negative.
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a price per liter: strictly positive.
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "price_per_liter".to_string(),
        });
    }
    Ok(())
}

/// Validates that `amount` does not exceed `limit`.
pub fn validate_not_exceeding(
    field: &str,
    amount: Money,
    limit_field: &str,
    limit: Money,
) -> ValidationResult<()> {
    if amount > limit {
        return Err(ValidationError::Exceeds {
            field: field.to_string(),
            amount: amount.to_string(),
            limit_field: limit_field.to_string(),
            limit: limit.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
