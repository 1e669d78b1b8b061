//! # Service Errors
//!
//! Every service operation returns [`ServiceResult`]: either a business rule
//! failed ([`CoreError`]) or the store did ([`DbError`]). In both cases the
//! operation's transaction has been dropped and nothing was written.

use thiserror::Error;

use crate::error::DbError;
use petro_core::{CoreError, ErrorKind, ValidationError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),

    /// Receipt file could not be stored.
    #[error("Receipt storage failed: {0}")]
    Storage(#[from] std::io::Error),

    /// Credential hashing failed (not a wrong password).
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

impl ServiceError {
    /// Business classification, if this is a business failure.
    ///
    /// `DbError::NotFound` also counts as `NotFound`; every other store
    /// failure is internal and returns `None`.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ServiceError::Domain(err) => Some(err.kind()),
            ServiceError::Db(DbError::NotFound { .. }) => Some(ErrorKind::NotFound),
            _ => None,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, ServiceError::Db(err) if err.is_unique_violation())
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Db(err.into())
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Domain(err.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
