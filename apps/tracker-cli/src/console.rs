//! Terminal rendering of UI events.

use std::sync::atomic::{AtomicU64, Ordering};
use tracker_core::{ApplicationRecord, GlobalRefreshState, SyncReport, ToastKind};
use tracker_sync::{ToastRecord, TracingEmitter, UiEventEmitter};

/// Prints each toast once, when it first becomes visible. Everything else
/// goes to the log.
#[derive(Default)]
pub struct ConsoleEmitter {
    last_printed: AtomicU64,
}

impl ConsoleEmitter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UiEventEmitter for ConsoleEmitter {
    fn emit_refresh_state(&self, state: &GlobalRefreshState) {
        TracingEmitter.emit_refresh_state(state);
    }

    fn emit_toasts(&self, toasts: &[ToastRecord]) {
        for toast in toasts {
            // Ids only grow; anything at or below the mark was already shown.
            if self.last_printed.fetch_max(toast.id.0, Ordering::SeqCst) < toast.id.0 {
                println!("{} {}", marker(toast.kind), toast.message);
            }
        }
    }

    fn emit_sync_report(&self, report: &SyncReport) {
        TracingEmitter.emit_sync_report(report);
    }

    fn emit_records(&self, records: &[ApplicationRecord]) {
        TracingEmitter.emit_records(records);
    }
}

fn marker(kind: ToastKind) -> &'static str {
    match kind {
        ToastKind::Success => "[ok]",
        ToastKind::Error => "[error]",
        ToastKind::Warning => "[warn]",
        ToastKind::Info => "[info]",
    }
}
