//! # CLI Error Type
//!
//! Unified error type for every subcommand.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Subcommand ─── Result<Value, CliError>                                 │
//! │       │                                                                 │
//! │       ├── CoreError  (business rule) ──► code from ErrorKind            │
//! │       ├── DbError    (store)         ──► DATABASE_ERROR, logged         │
//! │       ├── ConfigError                ──► CONFIGURATION                  │
//! │       └── token / role gate          ──► UNAUTHENTICATED / FORBIDDEN    │
//! │                                                                         │
//! │  stderr: {"code": "INVALID_STATE", "message": "Shift s1 is locked"}     │
//! │  exit status: one per code                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use petro_core::{CoreError, ErrorKind};
use petro_db::{DbError, ServiceError};

use crate::config::ConfigError;

/// Error printed when a subcommand fails.
///
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Tank not found: 3f2c..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CliError {
    /// Machine-readable error code for scripts
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes, one per failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Referenced entity does not exist
    NotFound,

    /// Input failed validation or a computed value is out of range
    ValidationError,

    /// Entity is in the wrong lifecycle state
    InvalidState,

    /// Missing, invalid or expired token, or wrong credentials
    Unauthenticated,

    /// Caller is not allowed to do this
    Forbidden,

    /// Organisational setup or configuration is missing
    Configuration,

    /// Database operation failed
    DatabaseError,

    /// Anything else
    Internal,
}

impl ErrorCode {
    /// Process exit status for this code.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorCode::ValidationError => 2,
            ErrorCode::NotFound => 3,
            ErrorCode::InvalidState => 4,
            ErrorCode::Unauthenticated => 5,
            ErrorCode::Forbidden => 6,
            ErrorCode::Configuration => 7,
            ErrorCode::DatabaseError => 8,
            ErrorCode::Internal => 1,
        }
    }
}

impl CliError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CliError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        CliError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::Unauthenticated, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::Internal, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.code.exit_code()
    }

    /// The JSON payload printed on stderr.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| format!(r#"{{"code":"INTERNAL","message":{:?}}}"#, self.message))
    }
}

impl From<DbError> for CliError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => CliError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => CliError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                CliError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::ConnectionFailed(_) => {
                CliError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                CliError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::Busy(e) => {
                tracing::warn!("Database busy: {}", e);
                CliError::new(ErrorCode::DatabaseError, "Database is busy, try again")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                CliError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                CliError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                CliError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                CliError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::Forbidden { .. } => ErrorCode::Forbidden,
            CoreError::InvalidCredentials => ErrorCode::Unauthenticated,
            other => match other.kind() {
                ErrorKind::NotFound => ErrorCode::NotFound,
                ErrorKind::InvalidState => ErrorCode::InvalidState,
                ErrorKind::InvalidInput => ErrorCode::ValidationError,
                ErrorKind::Unauthorized => ErrorCode::Forbidden,
                ErrorKind::Configuration => ErrorCode::Configuration,
            },
        };
        CliError::new(code, err.to_string())
    }
}

impl From<ServiceError> for CliError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(err) => err.into(),
            ServiceError::Db(err) => err.into(),
            ServiceError::Storage(e) => {
                tracing::error!("Receipt storage failed: {}", e);
                CliError::internal("Receipt could not be stored")
            }
            ServiceError::Hashing(e) => {
                tracing::error!("Password hashing failed: {}", e);
                CliError::internal("Password hashing failed")
            }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::new(ErrorCode::Configuration, err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::internal(format!("Failed to encode output: {}", err))
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for CliError {}

#[cfg(test)]
mod tests {
    use super::*;
    use petro_core::{CustodyStatus, ValidationError};

    #[test]
    fn test_core_errors_map_by_kind() {
        let err: CliError = CoreError::ShiftLocked("s1".into()).into();
        assert_eq!(err.code, ErrorCode::InvalidState);
        assert_eq!(err.message, "Shift s1 is locked");

        let err: CliError = CoreError::NotYetAccepted {
            id: "t1".into(),
            status: CustodyStatus::PendingAcceptance,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InvalidState);

        let err: CliError = CoreError::NoAreaManagerAssigned("u1".into()).into();
        assert_eq!(err.code, ErrorCode::Configuration);

        let err: CliError = CoreError::Validation(ValidationError::Required {
            field: "receipt_url".into(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_auth_failures_split() {
        let err: CliError = CoreError::InvalidCredentials.into();
        assert_eq!(err.code, ErrorCode::Unauthenticated);

        let err: CliError = CoreError::Unauthorized {
            user_id: "u1".into(),
            action: "accept this cash",
        }
        .into();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[test]
    fn test_db_details_not_leaked() {
        let err: CliError = DbError::QueryFailed("no such column: secret".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Database operation failed");
    }

    #[test]
    fn test_busy_database_asks_for_a_retry() {
        let err: CliError = DbError::Busy("database is locked".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(err.message.contains("try again"));
    }

    #[test]
    fn test_json_payload() {
        let err = CliError::not_found("Tank", "t1");
        assert_eq!(err.to_json(), r#"{"code":"NOT_FOUND","message":"Tank not found: t1"}"#);
        assert_eq!(err.exit_code(), 3);
    }
}
