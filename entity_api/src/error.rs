//! Error types for entity API
use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;

use sea_orm::error::{DbErr, SqlErr};

/// Errors while executing operations related to entities.
/// The intent is to categorize errors into two major types:
///  * Errors related to data. Ex DbError::RecordNotFound
///  * Errors related to interactions with the database itself. Ex DbError::Conn
#[derive(Debug, PartialEq)]
pub struct Error {
    // Underlying error emitted from seaORM internals
    pub source: Option<DbErr>,
    // Enum representing which category of error
    pub error_kind: EntityApiErrorKind,
}

#[derive(Debug, PartialEq, Serialize)]
pub enum EntityApiErrorKind {
    // Record not found, or not visible to the caller
    RecordNotFound,
    // A unique constraint rejected the write
    RecordExists,
    // Record not authenticated
    RecordUnauthenticated,
    // Errors related to interactions with the database itself. Ex DbError::Conn
    SystemError,
}

impl Error {
    pub(crate) fn not_found() -> Self {
        Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Entity API Error: {:?}", self)
    }
}

impl StdError for Error {}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        let error_kind = match (&err, err.sql_err()) {
            (DbErr::RecordNotFound(_), _) => EntityApiErrorKind::RecordNotFound,
            (_, Some(SqlErr::UniqueConstraintViolation(_))) => EntityApiErrorKind::RecordExists,
            _ => EntityApiErrorKind::SystemError,
        };

        Error {
            source: Some(err),
            error_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_not_found_keeps_its_kind() {
        let err: Error = DbErr::RecordNotFound("appointments".to_string()).into();
        assert_eq!(err.error_kind, EntityApiErrorKind::RecordNotFound);
        assert!(err.source.is_some());
    }

    #[test]
    fn connection_failures_are_system_errors() {
        let err: Error = DbErr::Custom("connection reset".to_string()).into();
        assert_eq!(err.error_kind, EntityApiErrorKind::SystemError);
    }
}
