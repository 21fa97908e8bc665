//! Error taxonomy shared by every service.

use async_graphql::ErrorExtensions;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by service operations.
///
/// Every variant is recoverable: the caller reports the message and the
/// store is left as it was before the call.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    ReferentialBlock(String),

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Authorization(message.into())
    }

    /// Stable code exposed to API clients.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Duplicate(_) => "DUPLICATE",
            Self::ReferentialBlock(_) => "REFERENTIAL_BLOCK",
            Self::Authorization(_) => "FORBIDDEN",
            Self::Authentication(_) => "UNAUTHENTICATED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                Self::Duplicate(format!("Record already exists: {detail}"))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                Self::ReferentialBlock(format!("Referenced record constraint failed: {detail}"))
            }
            _ => Self::Database(err),
        }
    }
}

impl From<bcrypt::BcryptError> for ServiceError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self::Internal(format!("password hashing failed: {err}"))
    }
}

impl From<jsonwebtoken::errors::Error> for ServiceError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Internal(format!("token handling failed: {err}"))
    }
}

impl ErrorExtensions for ServiceError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", self.code()))
    }
}

/// Replaces the store's generic unique-violation text with a message the
/// end user can act on. Other errors pass through the usual classification.
pub trait DbResultExt<T> {
    fn or_duplicate<F>(self, message: F) -> ServiceResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> DbResultExt<T> for Result<T, DbErr> {
    fn or_duplicate<F>(self, message: F) -> ServiceResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| match ServiceError::from(err) {
            ServiceError::Duplicate(_) => ServiceError::Duplicate(message()),
            other => other,
        })
    }
}

/// Trims a required text field, rejecting blanks.
pub fn required(field: &str, value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("Name", "  Physics ").unwrap(), "Physics");
        let err = required("Name", "   ").unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.to_string(), "Name must not be empty");
    }

    #[test]
    fn plain_db_errors_stay_database_errors() {
        let err = ServiceError::from(DbErr::Custom("boom".into()));
        assert_eq!(err.code(), "DATABASE_ERROR");
        assert!(!err.is_duplicate());
    }

    #[test]
    fn or_duplicate_keeps_non_unique_errors() {
        let res: Result<(), DbErr> = Err(DbErr::RecordNotFound("grade".into()));
        let err = res.or_duplicate(|| "never used".into()).unwrap_err();
        assert!(matches!(err, ServiceError::Database(_)));
    }

    #[test]
    fn graphql_extension_carries_code() {
        let gql = ServiceError::forbidden("Admin access required").extend();
        assert_eq!(gql.message, "Admin access required");
        let code = gql
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .cloned();
        assert_eq!(code, Some(async_graphql::Value::from("FORBIDDEN")));
    }
}
