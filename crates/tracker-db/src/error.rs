//! # Database Error Types
//!
//! ## Error Flow
//! ```text
//! SQLite Error (sqlx::Error)
//!      │
//!      ▼
//! DbError (this module) ← Adds context and categorization
//!      │
//!      ▼
//! SyncError / RefreshError (tracker-sync) ← Classified for the UI
//! ```

use thiserror::Error;
use tracker_core::{RefreshError, ValidationError};

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - The same (company, position, date) is entered twice
    /// - Any UNIQUE index violation
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Input rejected before reaching SQLite.
    #[error("Invalid input: {0}")]
    Invalid(#[from] ValidationError),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Returns true for errors caused by caller input rather than the store.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            DbError::NotFound { .. } | DbError::UniqueViolation { .. } | DbError::Invalid(_)
        )
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // "UNIQUE constraint failed: <table>.<column>"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::duplicate(field, "unknown")
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Convert DbError to the refresh taxonomy.
///
/// A refresh operation that reads the local store reports its failure as a
/// [`RefreshError`]; pool pressure is a timeout, a broken connection is
/// network, the rest is classified from the message.
impl From<DbError> for RefreshError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::PoolExhausted => RefreshError::timeout(err.to_string()),
            DbError::ConnectionFailed(_) => RefreshError::network(err.to_string()),
            other => RefreshError::from_message(other.to_string()),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DbError::not_found("Application", "abc");
        assert_eq!(err.to_string(), "Application not found: abc");
        assert!(err.is_rejection());

        let err = DbError::PoolExhausted;
        assert!(!err.is_rejection());
    }

    #[test]
    fn test_row_not_found_maps() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_refresh_error_mapping() {
        use tracker_core::ErrorKind;

        let err: RefreshError = DbError::PoolExhausted.into();
        assert_eq!(err.kind, ErrorKind::Timeout);

        let err: RefreshError = DbError::ConnectionFailed("disk gone".into()).into();
        assert_eq!(err.kind, ErrorKind::Network);
        assert_eq!(err.message, "Connection failed: disk gone");

        let err: RefreshError = DbError::not_found("Application", "x").into();
        assert_eq!(err.kind, ErrorKind::Unknown);
    }
}
