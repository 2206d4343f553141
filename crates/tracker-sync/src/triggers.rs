//! # Refresh Triggers
//!
//! Host-facing entry points that are not timer driven.
//!
//! ```text
//! sign-in completed ──▶ on_authenticated ──▶ sync_pending ──▶ run(ops)
//! user pressed ⟳    ──▶ refresh_now      ─────────────────▶ run(ops)
//! ```
//!
//! Reconciliation goes first on sign-in so the refresh that follows reads
//! records that already carry their cloud ids.

use std::sync::Arc;
use tracing::info;
use tracker_core::SyncReport;

use crate::coordinator::{OperationsFactory, RefreshCoordinator, RefreshSummary};
use crate::reconciler::SyncReconciler;

/// Sequences reconciliation and refresh for one-off events.
#[derive(Clone)]
pub struct RefreshTriggers {
    reconciler: Arc<SyncReconciler>,
    coordinator: RefreshCoordinator,
    operations: OperationsFactory,
}

impl RefreshTriggers {
    pub fn new(
        reconciler: Arc<SyncReconciler>,
        coordinator: RefreshCoordinator,
        operations: OperationsFactory,
    ) -> Self {
        RefreshTriggers {
            reconciler,
            coordinator,
            operations,
        }
    }

    /// Session became authenticated: upload pending records, then refresh.
    pub async fn on_authenticated(&self) -> (SyncReport, RefreshSummary) {
        info!("Session authenticated, reconciling before refresh");
        let report = self.reconciler.sync_pending().await;
        let summary = self.coordinator.run((self.operations)()).await;
        (report, summary)
    }

    /// Manual refresh. Skipped if one is already running.
    pub async fn refresh_now(&self) -> RefreshSummary {
        self.coordinator.run((self.operations)()).await
    }

    /// Manual reconciliation. Subject to the reconciler cooldown.
    pub async fn sync_now(&self) -> SyncReport {
        self.reconciler.sync_pending().await
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }
}
