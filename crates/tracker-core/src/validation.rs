//! # Validation Module
//!
//! Checks applied to a new application before it reaches the local store.
//!
//! ## Duplicate Avoidance
//! The reconciler never deduplicates; it uploads whatever is flagged
//! unsynced. Duplicates are stopped here, at creation time, by comparing the
//! normalised `(company, position, applied_on)` triple.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::ApplicationStatus;
use crate::MAX_NAME_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// New Application
// =============================================================================

/// Input for creating an application record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub company: String,
    pub position: String,
    pub applied_on: NaiveDate,
    #[serde(default)]
    pub status: ApplicationStatus,
}

impl NewApplication {
    /// Creates a new application in the `applied` status.
    pub fn new(company: impl Into<String>, position: impl Into<String>, applied_on: NaiveDate) -> Self {
        NewApplication {
            company: company.into(),
            position: position.into(),
            applied_on,
            status: ApplicationStatus::Applied,
        }
    }

    /// Sets the initial status.
    pub fn with_status(mut self, status: ApplicationStatus) -> Self {
        self.status = status;
        self
    }

    /// Validates required fields and lengths.
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use tracker_core::NewApplication;
    ///
    /// let day = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
    /// assert!(NewApplication::new("Acme", "Engineer", day).validate().is_ok());
    /// assert!(NewApplication::new("  ", "Engineer", day).validate().is_err());
    /// ```
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("company", &self.company)?;
        validate_name("position", &self.position)?;
        Ok(())
    }

    /// Returns the uniqueness key for this application.
    pub fn duplicate_key(&self) -> DuplicateKey {
        DuplicateKey::new(&self.company, &self.position, self.applied_on)
    }
}

fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Duplicate Key
// =============================================================================

/// Normalised `(company, position, date)` triple.
///
/// Company and position are trimmed, whitespace-collapsed and lowercased so
/// `"Acme  Corp"` and `"acme corp"` collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DuplicateKey {
    pub company: String,
    pub position: String,
    pub applied_on: NaiveDate,
}

impl DuplicateKey {
    pub fn new(company: &str, position: &str, applied_on: NaiveDate) -> Self {
        DuplicateKey {
            company: normalise(company),
            position: normalise(position),
            applied_on,
        }
    }
}

fn normalise(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
