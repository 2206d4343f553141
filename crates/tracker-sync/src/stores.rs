//! # Collaborator Interfaces
//!
//! The narrow seams through which the orchestration layer reaches data it
//! does not own.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Collaborators                                     │
//! │                                                                         │
//! │  LocalStore              get_records / add_record / mark_synced        │
//! │    └─ impl for tracker_db::Database                                    │
//! │  RemoteStore             add_records_batch (per-record results)        │
//! │  LiveAnalyticsSource     fetch_safe (slow, flaky)                      │
//! │  LocalAnalyticsFallback  compute (pure, never fails)                   │
//! │    └─ LocalAnalytics over a record snapshot                            │
//! │  EnvironmentGates        visible / online / hidden                     │
//! │    └─ StaticGates (atomic flags)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Async seams use `async_trait` so they can be held as `Arc<dyn …>`.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tracker_core::{Analytics, ApplicationRecord, CoreError, NewApplication, RefreshError};
use tracker_db::{Database, DbError};

use crate::error::SyncResult;

// =============================================================================
// Local Store
// =============================================================================

/// The on-device record store.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// All records, oldest first.
    async fn get_records(&self) -> SyncResult<Vec<ApplicationRecord>>;

    /// Creates a record. Duplicate `(company, position, date)` triples are rejected here.
    async fn add_record(&self, new: NewApplication) -> SyncResult<ApplicationRecord>;

    /// Flags a record as uploaded with the id the remote assigned.
    async fn mark_synced(&self, id: &str, cloud_id: &str) -> SyncResult<()>;
}

#[async_trait]
impl LocalStore for Database {
    async fn get_records(&self) -> SyncResult<Vec<ApplicationRecord>> {
        Ok(self.applications().list().await?)
    }

    async fn add_record(&self, new: NewApplication) -> SyncResult<ApplicationRecord> {
        let duplicate = CoreError::DuplicateApplication {
            company: new.company.clone(),
            position: new.position.clone(),
            applied_on: new.applied_on.to_string(),
        };

        match self.applications().insert(new).await {
            Ok(record) => Ok(record),
            Err(DbError::UniqueViolation { .. }) => Err(duplicate.into()),
            Err(DbError::Invalid(e)) => Err(CoreError::from(e).into()),
            Err(e) => Err(e.into()),
        }
    }

    async fn mark_synced(&self, id: &str, cloud_id: &str) -> SyncResult<()> {
        match self.applications().mark_synced(id, cloud_id).await {
            Err(DbError::NotFound { .. }) => {
                Err(CoreError::ApplicationNotFound(id.to_string()).into())
            }
            other => Ok(other?),
        }
    }
}

// =============================================================================
// Remote Store
// =============================================================================

/// The remote backing store records are reconciled into.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Uploads a batch. Returns one result per input record, in input order;
    /// `Ok` carries the remote id.
    async fn add_records_batch(
        &self,
        records: &[ApplicationRecord],
    ) -> Vec<Result<String, RefreshError>>;
}

// =============================================================================
// Analytics Sources
// =============================================================================

/// Remote analytics service.
#[async_trait]
pub trait LiveAnalyticsSource: Send + Sync {
    async fn fetch_safe(&self) -> Result<Analytics, RefreshError>;
}

/// On-device analytics, used when the live source is unavailable.
pub trait LocalAnalyticsFallback: Send + Sync {
    fn compute(&self) -> Analytics;
}

/// Computes analytics from a snapshot of local records.
#[derive(Debug, Clone, Default)]
pub struct LocalAnalytics {
    records: Vec<ApplicationRecord>,
}

impl LocalAnalytics {
    pub fn new(records: Vec<ApplicationRecord>) -> Self {
        LocalAnalytics { records }
    }

    /// Snapshots the local store.
    pub async fn from_store(store: &dyn LocalStore) -> SyncResult<Self> {
        Ok(LocalAnalytics::new(store.get_records().await?))
    }
}

impl LocalAnalyticsFallback for LocalAnalytics {
    fn compute(&self) -> Analytics {
        Analytics::compute(&self.records)
    }
}

// =============================================================================
// Environment Gates
// =============================================================================

/// Host conditions that gate scheduled refreshes.
pub trait EnvironmentGates: Send + Sync {
    /// The dashboard view is mounted.
    fn is_dashboard_visible(&self) -> bool;

    /// The host reports network connectivity.
    fn is_online(&self) -> bool;

    /// The host window is hidden/minimised.
    fn is_host_hidden(&self) -> bool;
}

/// Settable gates. Defaults to visible, online, not hidden.
#[derive(Debug)]
pub struct StaticGates {
    visible: AtomicBool,
    online: AtomicBool,
    hidden: AtomicBool,
}

impl Default for StaticGates {
    fn default() -> Self {
        StaticGates {
            visible: AtomicBool::new(true),
            online: AtomicBool::new(true),
            hidden: AtomicBool::new(false),
        }
    }
}

impl StaticGates {
    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn set_hidden(&self, hidden: bool) {
        self.hidden.store(hidden, Ordering::SeqCst);
    }
}

impl EnvironmentGates for StaticGates {
    fn is_dashboard_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn is_host_hidden(&self) -> bool {
        self.hidden.load(Ordering::SeqCst)
    }
}
