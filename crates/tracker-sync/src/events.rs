//! # UI Events
//!
//! Push channel from the orchestration layer to whatever renders it.
//!
//! ```text
//! RefreshCoordinator ──emit_refresh_state──┐
//! AutoRefreshScheduler ─emit_refresh_state─┤
//! NotificationCenter ───emit_toasts────────┼──▶ UiEventEmitter ──▶ UI / CLI
//! SyncReconciler ───────emit_sync_report───┤
//!                 └─────emit_records───────┘
//! ```
//!
//! Emitters are called synchronously, sometimes while internal state is
//! locked; implementations must not block or call back into the layer.

use tracing::debug;
use tracker_core::{ApplicationRecord, GlobalRefreshState, SyncReport};

use crate::notifications::ToastRecord;

/// Receiver of state changes (implemented by the host).
pub trait UiEventEmitter: Send + Sync {
    /// Shared refresh state changed.
    fn emit_refresh_state(&self, state: &GlobalRefreshState);

    /// The visible toast list changed.
    fn emit_toasts(&self, toasts: &[ToastRecord]);

    /// A reconciliation attempt finished.
    fn emit_sync_report(&self, report: &SyncReport);

    /// Local records were re-read after a reconciliation.
    fn emit_records(&self, records: &[ApplicationRecord]);
}

/// No-op event emitter for testing.
pub struct NoOpEmitter;

impl UiEventEmitter for NoOpEmitter {
    fn emit_refresh_state(&self, _state: &GlobalRefreshState) {}
    fn emit_toasts(&self, _toasts: &[ToastRecord]) {}
    fn emit_sync_report(&self, _report: &SyncReport) {}
    fn emit_records(&self, _records: &[ApplicationRecord]) {}
}

/// Emitter that writes every event to the `tracing` log.
///
/// Used by headless hosts that have no UI to push to.
pub struct TracingEmitter;

impl UiEventEmitter for TracingEmitter {
    fn emit_refresh_state(&self, state: &GlobalRefreshState) {
        debug!(
            status = %state.status,
            is_refreshing = state.is_refreshing,
            errors = state.errors.len(),
            auto_refresh = state.auto_refresh_enabled,
            "refresh://state"
        );
    }

    fn emit_toasts(&self, toasts: &[ToastRecord]) {
        debug!(count = toasts.len(), "toast://visible");
    }

    fn emit_sync_report(&self, report: &SyncReport) {
        debug!(
            success = report.success_count,
            errors = report.error_count,
            skipped = report.skipped,
            "sync://report"
        );
    }

    fn emit_records(&self, records: &[ApplicationRecord]) {
        let pending = records.iter().filter(|r| r.needs_sync()).count();
        debug!(total = records.len(), pending, "sync://records");
    }
}
