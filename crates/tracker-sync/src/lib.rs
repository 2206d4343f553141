//! # tracker-sync: Refresh and Sync Orchestration
//!
//! This crate keeps the job tracker's dashboard data fresh and pushes
//! locally created applications to the remote store.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Orchestration Architecture                          │
//! │                                                                         │
//! │  ┌──────────────────────┐        ┌──────────────────────────────────┐  │
//! │  │ AutoRefreshScheduler │        │ RefreshTriggers                  │  │
//! │  │                      │        │                                  │  │
//! │  │ One timer task,      │        │ on_authenticated: sync, refresh  │  │
//! │  │ gated on visible /   │        │ refresh_now: manual refresh      │  │
//! │  │ online / not hidden  │        │                                  │  │
//! │  └──────────┬───────────┘        └───────┬──────────────┬───────────┘  │
//! │             │                            │              │              │
//! │             ▼                            ▼              ▼              │
//! │  ┌──────────────────────────────────────────┐  ┌───────────────────┐   │
//! │  │ RefreshCoordinator                       │  │ SyncReconciler    │   │
//! │  │                                          │  │                   │   │
//! │  │ Single-flight guard, concurrent ops,     │  │ Cooldown, upload  │   │
//! │  │ error aggregation, GlobalRefreshState    │  │ unsynced, mark    │   │
//! │  └──────────┬───────────────────────────────┘  └─────────┬─────────┘   │
//! │             │  ops may use DegradingFetcher               │             │
//! │             │  (retry, then local fallback)               │             │
//! │             ▼                                             ▼             │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │ NotificationCenter                                              │   │
//! │  │ dedup window, category cooldowns, max visible, auto-dismiss     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  UI EVENTS (UiEventEmitter):                                           │
//! │  • "refresh://state"  - GlobalRefreshState changes                     │
//! │  • "toast://visible"  - Visible toast list                             │
//! │  • "sync://report"    - Reconciliation results                         │
//! │  • "sync://records"   - Record list after sync                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - `tracker.toml` loading, env overrides, validation
//! - [`error`] - Sync error types
//! - [`events`] - UI event sink trait
//! - [`notifications`] - Toast deduplication and lifetime
//! - [`fetcher`] - Retry with backoff, then degrade to a local fallback
//! - [`coordinator`] - Concurrent refresh with a single-flight guard
//! - [`preferences`] - Persisted auto-refresh preference
//! - [`scheduler`] - Periodic auto-refresh timer
//! - [`reconciler`] - Upload of unsynced local records
//! - [`triggers`] - Sign-in and manual entry points
//! - [`stores`] - Collaborator traits (local/remote stores, gates)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tracker_sync::{NotificationCenter, RefreshCoordinator, RefreshOperation};
//!
//! let coordinator = RefreshCoordinator::with_defaults(NotificationCenter::with_defaults());
//! let summary = coordinator
//!     .run(vec![RefreshOperation::new("Applications", || async { Ok(()) })])
//!     .await;
//! assert!(summary.is_success());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod events;
pub mod notifications;
pub mod stores;

pub mod coordinator;
pub mod fetcher;
pub mod preferences;
pub mod reconciler;
pub mod scheduler;
pub mod triggers;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{BackoffKind, TrackerConfig};
pub use error::{SyncError, SyncResult};
pub use events::{NoOpEmitter, TracingEmitter, UiEventEmitter};
pub use notifications::{NotificationCenter, NotificationSettings, Toast, ToastId, ToastRecord};
pub use stores::{
    EnvironmentGates, LiveAnalyticsSource, LocalAnalytics, LocalAnalyticsFallback, LocalStore,
    RemoteStore, StaticGates,
};

pub use coordinator::{
    OperationFuture, OperationsFactory, RefreshCoordinator, RefreshOperation, RefreshSummary,
};
pub use fetcher::{BackoffPolicy, DegradingFetcher, FetchOutcome, FetcherSettings};
pub use preferences::{MemoryPreferenceStore, PreferenceStore, TomlPreferenceStore};
pub use reconciler::{SyncReconciler, DEFAULT_SYNC_COOLDOWN};
pub use scheduler::{AutoRefreshScheduler, SchedulerStats};
pub use triggers::RefreshTriggers;
