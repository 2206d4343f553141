//! # Error Types
//!
//! Error taxonomy and domain errors for tracker-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tracker-core errors (this file)                                       │
//! │  ├── ErrorKind        - timeout | network | auth | permission | unknown│
//! │  ├── RefreshError     - what a refresh operation fails with            │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tracker-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  tracker-sync errors (separate crate)                                  │
//! │  └── SyncError        - Config, scheduler and collaborator failures    │
//! │                                                                         │
//! │  Flow: DbError / SyncError → RefreshError → RefreshOutcome → UI        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Classification
//! Refresh operations should construct a typed [`RefreshError`] with an
//! explicit kind. Collaborators that only hand back a message go through
//! [`RefreshError::from_message`], which inspects the text for known
//! substrings. That adapter is the last resort, not the main path.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Error Kind
// =============================================================================

/// Category of a failed refresh operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The operation reported that it ran out of time.
    Timeout,
    /// Connectivity failure reaching a data source.
    Network,
    /// The session is missing or expired.
    Auth,
    /// The user is authenticated but not allowed.
    Permission,
    /// Anything that could not be classified.
    Unknown,
}

impl ErrorKind {
    /// Classifies an untyped error message by substring.
    ///
    /// Matching is case-insensitive and first-match in this order:
    /// `timeout`, `network`, `authentication`, `permission`.
    ///
    /// ```rust
    /// use tracker_core::ErrorKind;
    ///
    /// assert_eq!(ErrorKind::classify("Request timeout after 30s"), ErrorKind::Timeout);
    /// assert_eq!(ErrorKind::classify("Authentication required"), ErrorKind::Auth);
    /// assert_eq!(ErrorKind::classify("boom"), ErrorKind::Unknown);
    /// ```
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();

        if lower.contains("timeout") {
            ErrorKind::Timeout
        } else if lower.contains("network") {
            ErrorKind::Network
        } else if lower.contains("authentication") {
            ErrorKind::Auth
        } else if lower.contains("permission") {
            ErrorKind::Permission
        } else {
            ErrorKind::Unknown
        }
    }

    /// Returns true if retrying the same operation later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorKind::Timeout | ErrorKind::Network)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Timeout => write!(f, "timeout"),
            ErrorKind::Network => write!(f, "network"),
            ErrorKind::Auth => write!(f, "auth"),
            ErrorKind::Permission => write!(f, "permission"),
            ErrorKind::Unknown => write!(f, "unknown"),
        }
    }
}

// =============================================================================
// Refresh Error
// =============================================================================

/// Failure of a single refresh, fetch or upload operation.
///
/// `Display` prints the message only; the kind is carried separately so the
/// coordinator can format `"name: message (kind)"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RefreshError {
    /// Typed category.
    pub kind: ErrorKind,
    /// Human-readable message from the failing collaborator.
    pub message: String,
}

impl RefreshError {
    /// Creates an error with an explicit kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        RefreshError {
            kind,
            message: message.into(),
        }
    }

    /// Adapts an untyped message, deriving the kind from its content.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        RefreshError {
            kind: ErrorKind::classify(&message),
            message,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    /// Creates an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Auth, message)
    }

    /// Creates a permission error.
    pub fn permission(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Permission, message)
    }

    /// Creates an unclassified error.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }
}

impl From<CoreError> for RefreshError {
    fn from(err: CoreError) -> Self {
        RefreshError::from_message(err.to_string())
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Domain errors raised around application records.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An application with the same company, position and date already exists.
    ///
    /// ## When This Occurs
    /// - The same posting is entered twice from the form
    /// - An import contains a row that is already tracked
    #[error("Application already tracked: {company} / {position} on {applied_on}")]
    DuplicateApplication {
        company: String,
        position: String,
        applied_on: String,
    },

    /// Application record cannot be found.
    #[error("Application not found: {0}")]
    ApplicationNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., unknown status, bad date).
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
