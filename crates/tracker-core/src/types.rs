//! # Domain Types
//!
//! Core types shared by the local store, the orchestration layer and the UI.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌───────────────────┐   ┌───────────────────┐   ┌─────────────────┐   │
//! │  │ ApplicationRecord │   │GlobalRefreshState │   │ RefreshOutcome  │   │
//! │  │  ───────────────  │   │  ───────────────  │   │  ─────────────  │   │
//! │  │  id (UUID)        │   │  is_refreshing    │   │  name           │   │
//! │  │  company/position │   │  status           │   │  success        │   │
//! │  │  sync_status      │   │  errors           │   │  error_kind     │   │
//! │  │  cloud_id         │   │  auto_refresh_*   │   │  message        │   │
//! │  └───────────────────┘   └───────────────────┘   └─────────────────┘   │
//! │                                                                         │
//! │  ┌───────────────────┐   ┌───────────────────┐   ┌─────────────────┐   │
//! │  │ ToastKind         │   │ ToastCategory     │   │ SyncReport      │   │
//! │  │  success/error/   │   │  keyword-based    │   │  success_count  │   │
//! │  │  warning/info     │   │  + cooldown table │   │  error_count    │   │
//! │  └───────────────────┘   └───────────────────┘   └─────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{ErrorKind, RefreshError, ValidationError};
use crate::validation::{DuplicateKey, NewApplication};
use crate::DEFAULT_AUTO_REFRESH_INTERVAL_SECS;

// =============================================================================
// Application Status
// =============================================================================

/// Where an application stands in the hiring pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Screening,
    Interviewing,
    Offer,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    /// All statuses, in pipeline order.
    pub const ALL: [ApplicationStatus; 6] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Screening,
        ApplicationStatus::Interviewing,
        ApplicationStatus::Offer,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
    ];

    /// Returns true if the employer has responded in any way.
    pub fn has_response(&self) -> bool {
        !matches!(self, ApplicationStatus::Applied | ApplicationStatus::Withdrawn)
    }

    /// Returns true if the application reached the interview stage or later.
    pub fn reached_interview(&self) -> bool {
        matches!(self, ApplicationStatus::Interviewing | ApplicationStatus::Offer)
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationStatus::Applied => write!(f, "applied"),
            ApplicationStatus::Screening => write!(f, "screening"),
            ApplicationStatus::Interviewing => write!(f, "interviewing"),
            ApplicationStatus::Offer => write!(f, "offer"),
            ApplicationStatus::Rejected => write!(f, "rejected"),
            ApplicationStatus::Withdrawn => write!(f, "withdrawn"),
        }
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "applied" => Ok(ApplicationStatus::Applied),
            "screening" | "screen" => Ok(ApplicationStatus::Screening),
            "interviewing" | "interview" => Ok(ApplicationStatus::Interviewing),
            "offer" => Ok(ApplicationStatus::Offer),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "withdrawn" => Ok(ApplicationStatus::Withdrawn),
            other => Err(ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: format!("unknown status '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Record Sync Status
// =============================================================================

/// Whether a local record has reached the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RecordSyncStatus {
    /// Created locally, not yet uploaded.
    #[default]
    Pending,
    /// Uploaded; `cloud_id` holds the remote identifier.
    Synced,
}

// =============================================================================
// Application Record
// =============================================================================

/// A tracked job application, owned by the local store.
///
/// The orchestration layer only reads records and asks the store to flip
/// `sync_status` / `cloud_id`; it never owns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ApplicationRecord {
    /// Local identifier (UUID v4).
    pub id: String,

    /// Employer name as entered.
    pub company: String,

    /// Role title as entered.
    pub position: String,

    /// Day the application was submitted.
    #[ts(as = "String")]
    pub applied_on: NaiveDate,

    /// Pipeline status.
    pub status: ApplicationStatus,

    /// Upload state.
    pub sync_status: RecordSyncStatus,

    /// Identifier assigned by the remote store after upload.
    pub cloud_id: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl ApplicationRecord {
    /// Builds a fresh, unsynced record from form input.
    pub fn from_new(new: NewApplication) -> Self {
        let now = Utc::now();
        ApplicationRecord {
            id: Uuid::new_v4().to_string(),
            company: new.company.trim().to_string(),
            position: new.position.trim().to_string(),
            applied_on: new.applied_on,
            status: new.status,
            sync_status: RecordSyncStatus::Pending,
            cloud_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if this record is a reconciliation candidate.
    ///
    /// A record needs upload when it is not marked synced OR has no cloud id;
    /// either half alone is enough.
    pub fn needs_sync(&self) -> bool {
        self.sync_status != RecordSyncStatus::Synced || self.cloud_id.is_none()
    }

    /// Returns the normalised `(company, position, date)` uniqueness key.
    pub fn duplicate_key(&self) -> DuplicateKey {
        DuplicateKey::new(&self.company, &self.position, self.applied_on)
    }
}

// =============================================================================
// Refresh Status & Outcome
// =============================================================================

/// Overall status of the most recent refresh run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RefreshStatus {
    #[default]
    Idle,
    Refreshing,
    Success,
    Error,
}

impl std::fmt::Display for RefreshStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshStatus::Idle => write!(f, "idle"),
            RefreshStatus::Refreshing => write!(f, "refreshing"),
            RefreshStatus::Success => write!(f, "success"),
            RefreshStatus::Error => write!(f, "error"),
        }
    }
}

/// Result of one named operation within one refresh run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RefreshOutcome {
    pub name: String,
    pub success: bool,
    pub error_kind: Option<ErrorKind>,
    pub message: Option<String>,
}

impl RefreshOutcome {
    /// Outcome of an operation that completed.
    pub fn succeeded(name: impl Into<String>) -> Self {
        RefreshOutcome {
            name: name.into(),
            success: true,
            error_kind: None,
            message: None,
        }
    }

    /// Outcome of an operation that failed.
    pub fn failed(name: impl Into<String>, error: &RefreshError) -> Self {
        RefreshOutcome {
            name: name.into(),
            success: false,
            error_kind: Some(error.kind),
            message: Some(error.message.clone()),
        }
    }

    /// Formats a failed outcome as `"name: message (kind)"`.
    ///
    /// Returns `None` for successful outcomes.
    pub fn describe(&self) -> Option<String> {
        if self.success {
            return None;
        }
        let kind = self.error_kind.unwrap_or(ErrorKind::Unknown);
        let message = self.message.as_deref().unwrap_or("");
        Some(format!("{}: {} ({})", self.name, message, kind))
    }
}

// =============================================================================
// Global Refresh State
// =============================================================================

/// Shared refresh status read by the UI.
///
/// Mutated only by the refresh coordinator and the auto-refresh scheduler.
/// Only the two `auto_refresh_*` fields survive a restart, and
/// `auto_refresh_enabled` is always restored as `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GlobalRefreshState {
    pub is_refreshing: bool,
    #[ts(as = "Option<String>")]
    pub last_refresh_timestamp: Option<DateTime<Utc>>,
    pub status: RefreshStatus,
    pub auto_refresh_enabled: bool,
    pub auto_refresh_interval_seconds: u64,
    pub errors: Vec<String>,
}

impl Default for GlobalRefreshState {
    fn default() -> Self {
        GlobalRefreshState {
            is_refreshing: false,
            last_refresh_timestamp: None,
            status: RefreshStatus::Idle,
            auto_refresh_enabled: false,
            auto_refresh_interval_seconds: DEFAULT_AUTO_REFRESH_INTERVAL_SECS,
            errors: Vec::new(),
        }
    }
}

impl GlobalRefreshState {
    /// Builds the initial state from a persisted preference.
    pub fn from_preference(pref: AutoRefreshPreference) -> Self {
        let pref = pref.restored();
        GlobalRefreshState {
            auto_refresh_enabled: pref.enabled,
            auto_refresh_interval_seconds: pref.interval_secs,
            ..Default::default()
        }
    }

    /// Returns the persistable part of the state.
    pub fn preference(&self) -> AutoRefreshPreference {
        AutoRefreshPreference {
            enabled: self.auto_refresh_enabled,
            interval_secs: self.auto_refresh_interval_seconds,
        }
    }
}

// =============================================================================
// Auto-Refresh Preference
// =============================================================================

/// Durable auto-refresh preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AutoRefreshPreference {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_interval_secs() -> u64 {
    DEFAULT_AUTO_REFRESH_INTERVAL_SECS
}

impl Default for AutoRefreshPreference {
    fn default() -> Self {
        AutoRefreshPreference {
            enabled: false,
            interval_secs: DEFAULT_AUTO_REFRESH_INTERVAL_SECS,
        }
    }
}

impl AutoRefreshPreference {
    /// Returns the preference as it must look after a restart.
    ///
    /// Auto-refresh is never resumed implicitly; the interval is kept.
    pub fn restored(self) -> Self {
        AutoRefreshPreference {
            enabled: false,
            ..self
        }
    }
}

// =============================================================================
// Toasts
// =============================================================================

/// Visual kind of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for ToastKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToastKind::Success => write!(f, "success"),
            ToastKind::Error => write!(f, "error"),
            ToastKind::Warning => write!(f, "warning"),
            ToastKind::Info => write!(f, "info"),
        }
    }
}

/// Rate-limited family of status messages.
///
/// ## Keyword Table (first match wins)
/// ```text
/// ┌──────────────┬──────────────────────────────────┬──────────┐
/// │ Category     │ Keywords                         │ Cooldown │
/// ├──────────────┼──────────────────────────────────┼──────────┤
/// │ sync         │ sync                             │ 10s      │
/// │ error        │ error, failed                    │ 5s       │
/// │ milestone    │ milestone, achievement           │ 60s      │
/// │ goal         │ goal                             │ 30s      │
/// │ connectivity │ offline, online, connection      │ 15s      │
/// │ refresh      │ auto-refresh                     │ 5s       │
/// └──────────────┴──────────────────────────────────┴──────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ToastCategory {
    Sync,
    Error,
    Milestone,
    Goal,
    Connectivity,
    Refresh,
}

const CATEGORY_KEYWORDS: &[(ToastCategory, &[&str])] = &[
    (ToastCategory::Sync, &["sync"]),
    (ToastCategory::Error, &["error", "failed"]),
    (ToastCategory::Milestone, &["milestone", "achievement"]),
    (ToastCategory::Goal, &["goal"]),
    (ToastCategory::Connectivity, &["offline", "online", "connection"]),
    (ToastCategory::Refresh, &["auto-refresh"]),
];

impl ToastCategory {
    /// Resolves a category from message keywords, if any match.
    pub fn classify(message: &str) -> Option<Self> {
        let lower = message.to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
            .map(|(category, _)| *category)
    }

    /// Minimum time between two toasts of this category.
    pub fn cooldown(&self) -> Duration {
        let secs = match self {
            ToastCategory::Sync => 10,
            ToastCategory::Error => 5,
            ToastCategory::Milestone => 60,
            ToastCategory::Goal => 30,
            ToastCategory::Connectivity => 15,
            ToastCategory::Refresh => 5,
        };
        Duration::from_secs(secs)
    }
}

// =============================================================================
// Sync Report
// =============================================================================

/// Result of one reconciliation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub success_count: u32,
    pub error_count: u32,
    /// True when the attempt was dropped by the cooldown guard.
    pub skipped: bool,
}

impl SyncReport {
    /// Report for a cooldown no-op.
    pub fn skipped() -> Self {
        SyncReport {
            skipped: true,
            ..Default::default()
        }
    }

    /// Total records the attempt touched.
    pub fn attempted(&self) -> u32 {
        self.success_count + self.error_count
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
