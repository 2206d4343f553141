//! # Sync Error Types
//!
//! Error types for the orchestration layer's fallible edges: configuration,
//! preferences, collaborator stores and the scheduler.
//!
//! Refresh operations themselves never fail with a `SyncError` at the
//! coordinator boundary; they report a [`RefreshError`] which becomes a
//! `RefreshOutcome`.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │  Collaborators  │  │     Internal            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Connection     │  │  Serialization          │ │
//! │  │  ConfigLoad     │  │  Disconnected   │  │  Internal               │ │
//! │  │  ConfigSave     │  │  Timeout        │  │                         │ │
//! │  │  Preferences    │  │  Database       │  │                         │ │
//! │  │                 │  │  Domain         │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  SyncError ──From──▶ RefreshError (typed kind where known)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use tracker_core::{CoreError, RefreshError};

/// Result type alias for orchestration operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors raised outside the refresh fan-out boundary.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// Failed to read or write the persisted auto-refresh preference.
    #[error("Preference storage failed: {0}")]
    PreferencesFailed(String),

    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    /// Could not reach a collaborator store.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The collaborator went away mid-operation.
    #[error("Disconnected from remote store")]
    Disconnected,

    /// Collaborator did not answer in time.
    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    /// Local store query failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// The local store rejected a record (duplicate, unknown id, bad input).
    #[error(transparent)]
    Domain(#[from] CoreError),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Failed to serialize a value for the UI or a file.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Internal orchestration error (e.g. a background task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<tracker_db::DbError> for SyncError {
    fn from(err: tracker_db::DbError) -> Self {
        match err {
            tracker_db::DbError::ConnectionFailed(msg) => SyncError::ConnectionFailed(msg),
            other => SyncError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::SerializationFailed(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

impl From<tokio::task::JoinError> for SyncError {
    fn from(err: tokio::task::JoinError) -> Self {
        SyncError::Internal(err.to_string())
    }
}

/// Maps a collaborator failure onto the refresh taxonomy.
///
/// ```text
/// Timeout                         → timeout
/// ConnectionFailed / Disconnected → network
/// anything else                   → classified from the message
/// ```
impl From<SyncError> for RefreshError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Timeout(_) => RefreshError::timeout(err.to_string()),
            SyncError::ConnectionFailed(_) | SyncError::Disconnected => {
                RefreshError::network(err.to_string())
            }
            other => RefreshError::from_message(other.to_string()),
        }
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl SyncError {
    /// Returns true if the operation may succeed when tried again.
    ///
    /// ## Retryable Errors
    /// - Connection failures
    /// - Timeouts
    /// - Temporary disconnections
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::ConnectionFailed(_) | SyncError::Disconnected | SyncError::Timeout(_)
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
                | SyncError::PreferencesFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_core::ErrorKind;

    #[test]
    fn test_retryable_errors() {
        assert!(SyncError::ConnectionFailed("refused".into()).is_retryable());
        assert!(SyncError::Disconnected.is_retryable());
        assert!(SyncError::Timeout(30).is_retryable());

        assert!(!SyncError::InvalidConfig("bad".into()).is_retryable());
        assert!(SyncError::InvalidConfig("bad".into()).is_config_error());
        assert!(!SyncError::DatabaseError("locked".into()).is_config_error());
    }

    #[test]
    fn test_refresh_error_mapping() {
        let err: RefreshError = SyncError::Timeout(10).into();
        assert_eq!(err.kind, ErrorKind::Timeout);

        let err: RefreshError = SyncError::Disconnected.into();
        assert_eq!(err.kind, ErrorKind::Network);
        assert_eq!(err.message, "Disconnected from remote store");

        let err: RefreshError = SyncError::DatabaseError("permission denied".into()).into();
        assert_eq!(err.kind, ErrorKind::Permission);

        let err: RefreshError = SyncError::Internal("boom".into()).into();
        assert_eq!(err.kind, ErrorKind::Unknown);
    }

    #[test]
    fn test_domain_error_is_not_retryable() {
        let err: SyncError = CoreError::ApplicationNotFound("a-1".into()).into();
        assert!(!err.is_retryable());
        assert!(!err.is_config_error());
        assert_eq!(err.to_string(), "Application not found: a-1");
    }

    #[test]
    fn test_db_connection_error_is_retryable() {
        let err: SyncError = tracker_db::DbError::ConnectionFailed("gone".into()).into();
        assert!(err.is_retryable());

        let err: SyncError = tracker_db::DbError::PoolExhausted.into();
        assert!(matches!(err, SyncError::DatabaseError(_)));
    }
}
