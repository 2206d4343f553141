//! # Refresh Coordinator
//!
//! Runs a list of named refresh operations concurrently and folds their
//! outcomes into the shared [`GlobalRefreshState`].
//!
//! ## Run Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       RefreshCoordinator::run                           │
//! │                                                                         │
//! │  write lock ──▶ is_refreshing? ── yes ──▶ return (skipped)             │
//! │      │ no                                                               │
//! │      ▼                                                                  │
//! │  is_refreshing = true, status = refreshing, errors = []                │
//! │  (set under the same guard, before any operation is polled)            │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  ┌──────────┐ ┌──────────┐ ┌──────────┐                                │
//! │  │  op A    │ │  op B    │ │  op C    │   all started, then join_all   │
//! │  └────┬─────┘ └────┬─────┘ └────┬─────┘   (no short-circuit)           │
//! │       └────────────┼────────────┘                                       │
//! │                    ▼                                                    │
//! │  errors = ["C: network unreachable (network)"]                         │
//! │  status = success | error, is_refreshing = false, timestamp = now      │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  one summary toast: "Refreshed in 42ms" | "Refresh completed with 1 errors"
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Operation failures never escape `run`. Per-operation detail lives in
//! `GlobalRefreshState::errors`; the user sees a single aggregate toast.

use chrono::Utc;
use futures_util::future::{join_all, BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use tracker_core::{GlobalRefreshState, RefreshError, RefreshOutcome, RefreshStatus};

use crate::events::{NoOpEmitter, UiEventEmitter};
use crate::notifications::{NotificationCenter, Toast};

// =============================================================================
// Operation Descriptor
// =============================================================================

/// Boxed future produced by a refresh operation.
pub type OperationFuture = BoxFuture<'static, Result<(), RefreshError>>;

/// Builds a fresh set of operations for each run (used by timers and triggers).
pub type OperationsFactory = Arc<dyn Fn() -> Vec<RefreshOperation> + Send + Sync>;

/// One named unit of refresh work.
pub struct RefreshOperation {
    name: String,
    run: Box<dyn FnOnce() -> OperationFuture + Send>,
}

impl RefreshOperation {
    /// Creates an operation from a name and an async closure.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let op = RefreshOperation::new("Applications", move || async move {
    ///     store.get_records().await.map(|_| ()).map_err(RefreshError::from)
    /// });
    /// ```
    pub fn new<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), RefreshError>> + Send + 'static,
    {
        RefreshOperation {
            name: name.into(),
            run: Box::new(move || f().boxed()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for RefreshOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshOperation")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Summary
// =============================================================================

/// What a single `run` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSummary {
    /// One outcome per operation, in the order given.
    pub outcomes: Vec<RefreshOutcome>,

    /// Wall time from start to aggregation.
    pub elapsed: Duration,

    /// True when the run was refused because another was in flight.
    pub skipped: bool,
}

impl RefreshSummary {
    fn skipped() -> Self {
        RefreshSummary {
            outcomes: Vec::new(),
            elapsed: Duration::ZERO,
            skipped: true,
        }
    }

    pub fn error_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }

    pub fn is_success(&self) -> bool {
        !self.skipped && self.error_count() == 0
    }
}

// =============================================================================
// Coordinator
// =============================================================================

/// Fan-out / fan-in driver for refresh operations.
///
/// Cheap to clone; clones share the refresh state.
#[derive(Clone)]
pub struct RefreshCoordinator {
    state: Arc<RwLock<GlobalRefreshState>>,
    notifications: NotificationCenter,
    emitter: Arc<dyn UiEventEmitter>,
}

impl RefreshCoordinator {
    /// Creates a coordinator over an explicitly owned state.
    pub fn new(
        state: Arc<RwLock<GlobalRefreshState>>,
        notifications: NotificationCenter,
        emitter: Arc<dyn UiEventEmitter>,
    ) -> Self {
        RefreshCoordinator {
            state,
            notifications,
            emitter,
        }
    }

    /// Creates a coordinator with fresh state and no emitter.
    pub fn with_defaults(notifications: NotificationCenter) -> Self {
        Self::new(
            Arc::new(RwLock::new(GlobalRefreshState::default())),
            notifications,
            Arc::new(NoOpEmitter),
        )
    }

    /// Shared state handle (for the scheduler and the host).
    pub fn state_handle(&self) -> &Arc<RwLock<GlobalRefreshState>> {
        &self.state
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> GlobalRefreshState {
        self.state.read().await.clone()
    }

    pub async fn is_refreshing(&self) -> bool {
        self.state.read().await.is_refreshing
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub(crate) fn emitter(&self) -> &Arc<dyn UiEventEmitter> {
        &self.emitter
    }

    /// Runs every operation concurrently and records the aggregate result.
    ///
    /// Returns immediately with `skipped = true` if a run is in flight.
    pub async fn run(&self, operations: Vec<RefreshOperation>) -> RefreshSummary {
        {
            let mut state = self.state.write().await;
            if state.is_refreshing {
                debug!("Refresh already in progress, skipping");
                return RefreshSummary::skipped();
            }
            state.is_refreshing = true;
            state.status = RefreshStatus::Refreshing;
            state.errors.clear();
            self.emitter.emit_refresh_state(&state);
        }

        let started = Instant::now();
        info!(operations = operations.len(), "Refresh started");

        let pending: Vec<_> = operations
            .into_iter()
            .map(|op| {
                let future = (op.run)();
                let name = op.name;
                async move {
                    let result = future.await;
                    (name, result)
                }
            })
            .collect();

        let outcomes: Vec<RefreshOutcome> = join_all(pending)
            .await
            .into_iter()
            .map(|(name, result)| match result {
                Ok(()) => RefreshOutcome::succeeded(name),
                Err(e) => {
                    warn!(operation = %name, kind = %e.kind, error = %e, "Refresh operation failed");
                    RefreshOutcome::failed(name, &e)
                }
            })
            .collect();

        let elapsed = started.elapsed();
        let errors: Vec<String> = outcomes.iter().filter_map(RefreshOutcome::describe).collect();
        let error_count = errors.len();

        {
            let mut state = self.state.write().await;
            state.status = if errors.is_empty() {
                RefreshStatus::Success
            } else {
                RefreshStatus::Error
            };
            state.errors = errors;
            state.is_refreshing = false;
            state.last_refresh_timestamp = Some(Utc::now());
            self.emitter.emit_refresh_state(&state);
        }

        info!(
            elapsed_ms = elapsed.as_millis() as u64,
            errors = error_count,
            "Refresh finished"
        );

        let toast = if error_count == 0 {
            Toast::success(format!("Refreshed in {}ms", elapsed.as_millis()))
        } else {
            Toast::warning(format!("Refresh completed with {} errors", error_count))
        };
        self.notifications.publish(toast).await;

        RefreshSummary {
            outcomes,
            elapsed,
            skipped: false,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
