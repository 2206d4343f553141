//! # Sync Reconciler
//!
//! One-way upload of locally created records to the remote store.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     SyncReconciler::sync_pending                        │
//! │                                                                         │
//! │  previous attempt started < cooldown ago? ── yes ──▶ skipped {0,0}     │
//! │        │ no (stamp attempt start)                                       │
//! │        ▼                                                                │
//! │  local.get_records() ──▶ filter needs_sync()                           │
//! │        │                      │ empty ──▶ {0,0}                         │
//! │        ▼                                                                │
//! │  remote.add_records_batch(pending)                                     │
//! │        │                                                                │
//! │        ▼  per record                                                    │
//! │  Ok(cloud_id) ──▶ local.mark_synced ── ok ──▶ success                  │
//! │        │                          └── err ──▶ error                    │
//! │  Err / missing result ──────────────────────▶ error                    │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  local.get_records() (re-read) ──▶ emit records + report, toast        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here deduplicates. Duplicates are stopped when records are
//! created; this only uploads what is flagged unsynced.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use tracker_core::{ApplicationRecord, SyncReport};

use crate::events::UiEventEmitter;
use crate::notifications::{NotificationCenter, Toast};
use crate::stores::{LocalStore, RemoteStore};

/// Default minimum time between reconciliation attempts.
pub const DEFAULT_SYNC_COOLDOWN: Duration = Duration::from_millis(3000);

/// Uploads unsynced local records, at most once per cooldown window.
pub struct SyncReconciler {
    local: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteStore>,
    notifications: NotificationCenter,
    emitter: Arc<dyn UiEventEmitter>,
    cooldown: Duration,
    last_attempt: Mutex<Option<Instant>>,
}

impl SyncReconciler {
    pub fn new(
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
        notifications: NotificationCenter,
        emitter: Arc<dyn UiEventEmitter>,
    ) -> Self {
        SyncReconciler {
            local,
            remote,
            notifications,
            emitter,
            cooldown: DEFAULT_SYNC_COOLDOWN,
            last_attempt: Mutex::new(None),
        }
    }

    /// Overrides the cooldown window.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Uploads every record that needs it. Never fails; see [`SyncReport`].
    pub async fn sync_pending(&self) -> SyncReport {
        if !self.begin_attempt().await {
            return SyncReport::skipped();
        }

        let records = match self.local.get_records().await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Failed to read local records, sync aborted");
                return SyncReport::default();
            }
        };

        let pending: Vec<ApplicationRecord> =
            records.into_iter().filter(|r| r.needs_sync()).collect();

        if pending.is_empty() {
            debug!("Nothing to sync");
            return SyncReport::default();
        }

        info!(count = pending.len(), "Uploading unsynced applications");

        let results = self.remote.add_records_batch(&pending).await;
        if results.len() != pending.len() {
            warn!(
                sent = pending.len(),
                received = results.len(),
                "Remote returned a mismatched result count"
            );
        }

        let mut report = SyncReport::default();
        let mut results = results.into_iter();

        for record in &pending {
            match results.next() {
                Some(Ok(cloud_id)) => match self.local.mark_synced(&record.id, &cloud_id).await {
                    Ok(()) => report.success_count += 1,
                    Err(e) => {
                        warn!(id = %record.id, error = %e, "Uploaded but failed to mark synced");
                        report.error_count += 1;
                    }
                },
                Some(Err(e)) => {
                    warn!(id = %record.id, kind = %e.kind, error = %e, "Remote rejected record");
                    report.error_count += 1;
                }
                None => {
                    warn!(id = %record.id, "No remote result for record");
                    report.error_count += 1;
                }
            }
        }

        match self.local.get_records().await {
            Ok(records) => self.emitter.emit_records(&records),
            Err(e) => warn!(error = %e, "Failed to re-read local records after sync"),
        }

        info!(
            success = report.success_count,
            errors = report.error_count,
            "Sync finished"
        );
        self.emitter.emit_sync_report(&report);

        let toast = if report.error_count == 0 {
            Toast::success(format!("Synced {} applications", report.success_count))
        } else {
            Toast::warning(format!("Sync finished with {} errors", report.error_count))
        };
        self.notifications.publish(toast).await;

        report
    }

    /// Stamps the attempt start, or returns false inside the cooldown.
    async fn begin_attempt(&self) -> bool {
        let now = Instant::now();
        let mut last = self.last_attempt.lock().await;

        if let Some(previous) = *last {
            let since = now.duration_since(previous);
            if since < self.cooldown {
                debug!(
                    since_ms = since.as_millis() as u64,
                    cooldown_ms = self.cooldown.as_millis() as u64,
                    "Sync attempt inside cooldown, skipping"
                );
                return false;
            }
        }

        *last = Some(now);
        true
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SyncError, SyncResult};
    use crate::events::NoOpEmitter;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;
    use tracker_core::{
        ApplicationStatus, NewApplication, RecordSyncStatus, RefreshError, ToastKind,
    };

    // -------------------------------------------------------------------------
    // Fakes
    // -------------------------------------------------------------------------

    #[derive(Default)]
    struct MemoryLocal {
        records: Mutex<Vec<ApplicationRecord>>,
        fail_reads: bool,
        fail_mark: HashSet<String>,
    }

    impl MemoryLocal {
        fn with_records(records: Vec<ApplicationRecord>) -> Self {
            MemoryLocal {
                records: Mutex::new(records),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl LocalStore for MemoryLocal {
        async fn get_records(&self) -> SyncResult<Vec<ApplicationRecord>> {
            if self.fail_reads {
                return Err(SyncError::DatabaseError("disk I/O error".into()));
            }
            Ok(self.records.lock().await.clone())
        }

        async fn add_record(&self, new: NewApplication) -> SyncResult<ApplicationRecord> {
            let record = ApplicationRecord::from_new(new);
            self.records.lock().await.push(record.clone());
            Ok(record)
        }

        async fn mark_synced(&self, id: &str, cloud_id: &str) -> SyncResult<()> {
            if self.fail_mark.contains(id) {
                return Err(SyncError::DatabaseError("database is locked".into()));
            }
            let mut records = self.records.lock().await;
            let record = records
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| SyncError::DatabaseError(format!("missing {}", id)))?;
            record.sync_status = RecordSyncStatus::Synced;
            record.cloud_id = Some(cloud_id.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeRemote {
        batches: AtomicUsize,
        reject: HashSet<String>,
        truncate_to: Option<usize>,
    }

    #[async_trait]
    impl RemoteStore for FakeRemote {
        async fn add_records_batch(
            &self,
            records: &[ApplicationRecord],
        ) -> Vec<Result<String, RefreshError>> {
            self.batches.fetch_add(1, Ordering::SeqCst);
            let mut results: Vec<_> = records
                .iter()
                .map(|r| {
                    if self.reject.contains(&r.company) {
                        Err(RefreshError::permission("permission denied"))
                    } else {
                        Ok(format!("cloud-{}", r.id))
                    }
                })
                .collect();
            if let Some(n) = self.truncate_to {
                results.truncate(n);
            }
            results
        }
    }

    fn record(company: &str) -> ApplicationRecord {
        ApplicationRecord::from_new(
            NewApplication::new(company, "Engineer", NaiveDate::from_ymd_opt(2026, 3, 2).unwrap())
                .with_status(ApplicationStatus::Applied),
        )
    }

    fn reconciler(local: Arc<MemoryLocal>, remote: Arc<FakeRemote>) -> SyncReconciler {
        SyncReconciler::new(
            local,
            remote,
            NotificationCenter::with_defaults(),
            Arc::new(NoOpEmitter),
        )
    }

    // -------------------------------------------------------------------------
    // Tests
    // -------------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_partial_rejection() {
        let local = Arc::new(MemoryLocal::with_records(vec![
            record("Acme"),
            record("Globex"),
            record("Initech"),
        ]));
        let remote = Arc::new(FakeRemote {
            reject: HashSet::from(["Globex".to_string()]),
            ..Default::default()
        });
        let reconciler = reconciler(local.clone(), remote);

        let report = reconciler.sync_pending().await;

        assert_eq!(report.success_count, 2);
        assert_eq!(report.error_count, 1);
        assert!(!report.skipped);

        let records = local.records.lock().await;
        for r in records.iter() {
            if r.company == "Globex" {
                assert_eq!(r.sync_status, RecordSyncStatus::Pending);
                assert!(r.cloud_id.is_none());
            } else {
                assert_eq!(r.sync_status, RecordSyncStatus::Synced);
                assert_eq!(r.cloud_id.as_deref(), Some(format!("cloud-{}", r.id).as_str()));
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_limits_batches() {
        let local = Arc::new(MemoryLocal::with_records(vec![record("Acme")]));
        let remote = Arc::new(FakeRemote::default());
        let reconciler = reconciler(local.clone(), remote.clone());

        reconciler.sync_pending().await;
        sleep(Duration::from_millis(2_000)).await;
        local
            .add_record(NewApplication::new(
                "Globex",
                "Analyst",
                NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(),
            ))
            .await
            .unwrap();

        let second = reconciler.sync_pending().await;
        assert!(second.skipped);
        assert_eq!(second.attempted(), 0);
        assert_eq!(remote.batches.load(Ordering::SeqCst), 1);

        sleep(Duration::from_millis(1_001)).await;
        let third = reconciler.sync_pending().await;
        assert_eq!(third.success_count, 1);
        assert_eq!(remote.batches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_pending_skips_remote() {
        let mut synced = record("Acme");
        synced.sync_status = RecordSyncStatus::Synced;
        synced.cloud_id = Some("c-1".into());

        let local = Arc::new(MemoryLocal::with_records(vec![synced]));
        let remote = Arc::new(FakeRemote::default());
        let reconciler = reconciler(local, remote.clone());

        let report = reconciler.sync_pending().await;
        assert_eq!(report, SyncReport::default());
        assert_eq!(remote.batches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_synced_without_cloud_id_is_retried() {
        let mut half = record("Acme");
        half.sync_status = RecordSyncStatus::Synced;

        let local = Arc::new(MemoryLocal::with_records(vec![half]));
        let remote = Arc::new(FakeRemote::default());
        let report = reconciler(local, remote).sync_pending().await;

        assert_eq!(report.success_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_failure_reports_zero() {
        let local = Arc::new(MemoryLocal {
            fail_reads: true,
            ..Default::default()
        });
        let remote = Arc::new(FakeRemote::default());

        let report = reconciler(local, remote.clone()).sync_pending().await;
        assert_eq!(report, SyncReport::default());
        assert_eq!(remote.batches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_failure_and_short_results_count_as_errors() {
        let acme = record("Acme");
        let local = Arc::new(MemoryLocal {
            records: Mutex::new(vec![acme.clone(), record("Globex"), record("Initech")]),
            fail_mark: HashSet::from([acme.id.clone()]),
            ..Default::default()
        });
        let remote = Arc::new(FakeRemote {
            truncate_to: Some(2),
            ..Default::default()
        });
        let reconciler = reconciler(local, remote);

        let report = reconciler.sync_pending().await;
        // Acme: mark failed; Globex: ok; Initech: no result.
        assert_eq!(report.success_count, 1);
        assert_eq!(report.error_count, 2);

        let toasts = reconciler.notifications.visible().await;
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Warning);
        assert_eq!(toasts[0].message, "Sync finished with 2 errors");
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_toast() {
        let local = Arc::new(MemoryLocal::with_records(vec![record("Acme"), record("Globex")]));
        let reconciler = reconciler(local, Arc::new(FakeRemote::default()));

        reconciler.sync_pending().await;

        let toasts = reconciler.notifications.visible().await;
        assert_eq!(toasts[0].kind, ToastKind::Success);
        assert_eq!(toasts[0].message, "Synced 2 applications");
    }
}
