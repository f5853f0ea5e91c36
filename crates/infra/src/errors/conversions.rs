//! Conversions from external infrastructure errors into domain errors.

use portico_common::StorageError;
use portico_domain::{ClientError, PorticoError};
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub PorticoError);

impl From<InfraError> for PorticoError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<PorticoError> for InfraError {
    fn from(value: PorticoError) -> Self {
        InfraError(value)
    }
}

/// Maps driver errors onto the storage port's error type.
pub trait IntoStorageError {
    fn into_storage(self) -> StorageError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → StorageError */
/* -------------------------------------------------------------------------- */

impl IntoStorageError for SqlError {
    fn into_storage(self) -> StorageError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => StorageError::Database("database is busy".into()),
                    ErrorCode::DatabaseLocked => {
                        StorageError::Database("database is locked".into())
                    }
                    ErrorCode::DiskFull => StorageError::QuotaExceeded,
                    ErrorCode::CannotOpen | ErrorCode::ReadOnly => {
                        StorageError::Unavailable(format!("sqlite store unavailable: {message}"))
                    }
                    _ => StorageError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                StorageError::Serialization(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                StorageError::Serialization(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => {
                StorageError::Serialization("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidPath(path) => StorageError::Unavailable(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => StorageError::Database(other.to_string()),
        }
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → StorageError */
/* -------------------------------------------------------------------------- */

impl IntoStorageError for r2d2::Error {
    fn into_storage(self) -> StorageError {
        StorageError::Connection(self.to_string())
    }
}

/* -------------------------------------------------------------------------- */
/* StorageError → PorticoError */
/* -------------------------------------------------------------------------- */

impl From<StorageError> for InfraError {
    fn from(value: StorageError) -> Self {
        InfraError(PorticoError::Storage(value.to_string()))
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError::from(value.into_storage())
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError::from(value.into_storage())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → PorticoError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        if value.is_timeout() {
            return InfraError(PorticoError::Network("HTTP request timed out".into()));
        }

        if value.is_builder() {
            return InfraError(PorticoError::InvalidInput(format!("invalid request: {value}")));
        }

        if value.is_connect() {
            return InfraError(PorticoError::Network("HTTP connection failure".into()));
        }

        if let Some(status) = value.status() {
            return InfraError(PorticoError::Api(ClientError::new(status.as_u16())));
        }

        InfraError(PorticoError::Network(value.to_string()))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
