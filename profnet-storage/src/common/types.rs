use rst_common::with_errors::thiserror::{self, Error};

/// CommonError covers the failures of bootstrapping the storage layer
///
/// Failures of the stores themselves are reported through the domain errors of
/// `profnet-core`, `ConnectionError::StorageError` and `MessageError::StorageError`
#[derive(Debug, PartialEq, Error)]
pub enum CommonError {
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("db error: {0}")]
    DbError(String),

    #[error("config error: {0}")]
    ConfigError(String),
}

pub trait ToValidate {
    fn validate(&self) -> Result<(), CommonError>;
}
