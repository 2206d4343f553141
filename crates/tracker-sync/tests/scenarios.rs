//! End-to-end behaviour of the orchestration layer.
//!
//! Timing-sensitive cases run on a paused clock against in-memory fakes.
//! Cases that exercise the SQLite store run on real time; the pool's own
//! timers must not be auto-advanced.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracker_core::{
    ApplicationRecord, NewApplication, RecordSyncStatus, RefreshError, RefreshStatus, ToastKind,
};
use tracker_db::{Database, DbConfig};
use tracker_sync::{
    AutoRefreshScheduler, DegradingFetcher, LocalStore, MemoryPreferenceStore,
    NotificationCenter, NoOpEmitter, OperationsFactory, RefreshCoordinator, RefreshOperation,
    RemoteStore, StaticGates, SyncReconciler, SyncResult, Toast,
};

// =============================================================================
// Fakes
// =============================================================================

/// Remote that accepts everything except the listed companies.
#[derive(Default)]
struct CountingRemote {
    batches: AtomicUsize,
    reject: HashSet<String>,
}

#[async_trait]
impl RemoteStore for CountingRemote {
    async fn add_records_batch(
        &self,
        records: &[ApplicationRecord],
    ) -> Vec<Result<String, RefreshError>> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        records
            .iter()
            .map(|r| {
                if self.reject.contains(&r.company) {
                    Err(RefreshError::from_message("network unreachable"))
                } else {
                    Ok(format!("remote-{}", r.id))
                }
            })
            .collect()
    }
}

/// Vec-backed store for paused-clock tests.
#[derive(Default)]
struct VecStore {
    records: Mutex<Vec<ApplicationRecord>>,
}

#[async_trait]
impl LocalStore for VecStore {
    async fn get_records(&self) -> SyncResult<Vec<ApplicationRecord>> {
        Ok(self.records.lock().await.clone())
    }

    async fn add_record(&self, new: NewApplication) -> SyncResult<ApplicationRecord> {
        let record = ApplicationRecord::from_new(new);
        self.records.lock().await.push(record.clone());
        Ok(record)
    }

    async fn mark_synced(&self, id: &str, cloud_id: &str) -> SyncResult<()> {
        if let Some(r) = self.records.lock().await.iter_mut().find(|r| r.id == id) {
            r.sync_status = RecordSyncStatus::Synced;
            r.cloud_id = Some(cloud_id.to_string());
        }
        Ok(())
    }
}

fn application(company: &str, day: u32) -> NewApplication {
    NewApplication::new(
        company,
        "Software Engineer",
        NaiveDate::from_ymd_opt(2026, 5, day).unwrap(),
    )
}

fn counting_operations(calls: Arc<AtomicUsize>) -> OperationsFactory {
    Arc::new(move || {
        let calls = calls.clone();
        vec![RefreshOperation::new("Applications", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })]
    })
}

fn scheduler(gates: Arc<StaticGates>, calls: Arc<AtomicUsize>) -> AutoRefreshScheduler {
    AutoRefreshScheduler::new(
        RefreshCoordinator::with_defaults(NotificationCenter::with_defaults()),
        gates,
        Arc::new(MemoryPreferenceStore::default()),
        counting_operations(calls),
    )
}

fn reconciler(local: Arc<dyn LocalStore>, remote: Arc<CountingRemote>) -> SyncReconciler {
    SyncReconciler::new(
        local,
        remote,
        NotificationCenter::with_defaults(),
        Arc::new(NoOpEmitter),
    )
}

// =============================================================================
// Refresh Coordinator
// =============================================================================

#[tokio::test(start_paused = true)]
async fn partial_failure_is_aggregated_into_one_warning() {
    let notifications = NotificationCenter::with_defaults();
    let coordinator = RefreshCoordinator::with_defaults(notifications.clone());

    let summary = coordinator
        .run(vec![
            RefreshOperation::new("Applications", || async { Ok(()) }),
            RefreshOperation::new("Goals", || async { Ok(()) }),
            RefreshOperation::new("Feedback", || async {
                Err(RefreshError::from_message("network unreachable"))
            }),
        ])
        .await;

    let state = coordinator.state().await;
    assert_eq!(state.errors, vec!["Feedback: network unreachable (network)"]);
    assert_eq!(state.status, RefreshStatus::Error);
    assert!(!state.is_refreshing);
    assert_eq!(summary.error_count(), 1);

    let toasts = notifications.visible().await;
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Warning);
    assert!(toasts[0].message.contains("1 errors"));
}

#[tokio::test(start_paused = true)]
async fn k_of_n_failures_leave_a_consistent_state() {
    for n in 0..=4usize {
        for k in 0..=n {
            let coordinator = RefreshCoordinator::with_defaults(NotificationCenter::with_defaults());

            let operations = (0..n)
                .map(|i| {
                    let fail = i < k;
                    RefreshOperation::new(format!("op-{}", i), move || async move {
                        sleep(Duration::from_millis(10 * (n - i) as u64)).await;
                        if fail {
                            Err(RefreshError::timeout("Request timeout"))
                        } else {
                            Ok(())
                        }
                    })
                })
                .collect();

            coordinator.run(operations).await;

            let state = coordinator.state().await;
            assert!(!state.is_refreshing);
            assert_eq!(state.errors.len(), k, "n={} k={}", n, k);
            let expected = if k == 0 {
                RefreshStatus::Success
            } else {
                RefreshStatus::Error
            };
            assert_eq!(state.status, expected);
            assert!(state.last_refresh_timestamp.is_some());
        }
    }
}

// =============================================================================
// Auto-Refresh Scheduler
// =============================================================================

#[tokio::test(start_paused = true)]
async fn hidden_host_skips_the_tick() {
    let gates = Arc::new(StaticGates::default());
    gates.set_hidden(true);
    let calls = Arc::new(AtomicUsize::new(0));
    let scheduler = scheduler(gates, calls.clone());

    scheduler.enable(30).await.unwrap();
    sleep(Duration::from_millis(30_100)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(scheduler.stats().ticks, 1);
    assert_eq!(scheduler.stats().skipped, 1);
}

#[tokio::test(start_paused = true)]
async fn re_enable_keeps_a_single_timer() {
    let calls = Arc::new(AtomicUsize::new(0));
    let scheduler = scheduler(Arc::new(StaticGates::default()), calls.clone());

    scheduler.enable(10).await.unwrap();
    scheduler.enable(5).await.unwrap();
    assert_eq!(scheduler.active_period().await, Some(Duration::from_secs(5)));

    // Ticks at 5s and 10s from the 5s timer only.
    sleep(Duration::from_millis(10_500)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(scheduler.stats().ticks, 2);
}

#[tokio::test(start_paused = true)]
async fn disable_stops_future_runs() {
    let calls = Arc::new(AtomicUsize::new(0));
    let scheduler = scheduler(Arc::new(StaticGates::default()), calls.clone());

    scheduler.enable(5).await.unwrap();
    sleep(Duration::from_millis(5_500)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    scheduler.disable().await;
    sleep(Duration::from_secs(60)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!scheduler.is_active().await);
}

// =============================================================================
// Notification Center
// =============================================================================

#[tokio::test(start_paused = true)]
async fn identical_toasts_within_the_window_show_once() {
    let center = NotificationCenter::with_defaults();

    center.publish(Toast::success("Application saved")).await;
    sleep(Duration::from_millis(400)).await;
    center.publish(Toast::success("Application saved")).await;

    assert_eq!(center.visible().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn category_cooldown_spans_different_messages() {
    let center = NotificationCenter::with_defaults();

    assert!(center.publish(Toast::info("Sync started")).await.is_some());
    sleep(Duration::from_secs(3)).await;
    assert!(center.publish(Toast::success("Sync complete")).await.is_none());

    let visible = center.visible().await;
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].message, "Sync started");
}

#[tokio::test(start_paused = true)]
async fn visible_list_is_capped() {
    let center = NotificationCenter::with_defaults();

    for i in 0..8 {
        center.publish(Toast::info(format!("Saved draft {}", i))).await;
        assert!(center.visible().await.len() <= 3);
    }

    let messages: Vec<_> = center
        .visible()
        .await
        .into_iter()
        .map(|t| t.message)
        .collect();
    assert_eq!(messages, vec!["Saved draft 5", "Saved draft 6", "Saved draft 7"]);
}

// =============================================================================
// Degrading Fetcher
// =============================================================================

#[tokio::test(start_paused = true)]
async fn failing_primary_is_tried_three_times_then_falls_back() {
    let primary_calls = AtomicUsize::new(0);
    let fallback_calls = AtomicUsize::new(0);
    let fetcher = DegradingFetcher::default();

    let outcome = fetcher
        .fetch_with_retries(
            2,
            || async {
                primary_calls.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(RefreshError::network("network unreachable"))
            },
            || async {
                fallback_calls.fetch_add(1, Ordering::SeqCst);
                Ok(7)
            },
        )
        .await;

    assert_eq!(primary_calls.load(Ordering::SeqCst), 3);
    assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    assert!(outcome.degraded);
    assert_eq!(outcome.into_result().unwrap(), 7);
}

// =============================================================================
// Sync Reconciler
// =============================================================================

#[tokio::test(start_paused = true)]
async fn second_sync_inside_cooldown_does_not_upload() {
    let local = Arc::new(VecStore::default());
    local.add_record(application("Acme", 1)).await.unwrap();
    let remote = Arc::new(CountingRemote::default());
    let reconciler = reconciler(local, remote.clone());

    let started = Instant::now();
    let first = reconciler.sync_pending().await;
    let second = reconciler.sync_pending().await;
    assert!(started.elapsed() < Duration::from_millis(3_000));

    assert_eq!(first.success_count, 1);
    assert!(second.skipped);
    assert_eq!((second.success_count, second.error_count), (0, 0));
    assert_eq!(remote.batches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn one_rejected_record_stays_pending() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    for (i, company) in ["Acme", "Globex", "Initech"].iter().enumerate() {
        db.add_record(application(company, i as u32 + 1)).await.unwrap();
    }
    let remote = Arc::new(CountingRemote {
        reject: HashSet::from(["Globex".to_string()]),
        ..Default::default()
    });

    let report = reconciler(Arc::new(db.clone()), remote).sync_pending().await;
    assert_eq!((report.success_count, report.error_count), (2, 1));

    for record in db.get_records().await.unwrap() {
        if record.company == "Globex" {
            assert_eq!(record.sync_status, RecordSyncStatus::Pending);
            assert!(record.cloud_id.is_none());
        } else {
            assert_eq!(record.sync_status, RecordSyncStatus::Synced);
            assert!(record.cloud_id.is_some());
        }
    }
}

#[tokio::test]
async fn ten_unsynced_records_all_reach_the_remote() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    for day in 1..=10 {
        db.add_record(application("Acme", day)).await.unwrap();
    }

    let report = reconciler(Arc::new(db.clone()), Arc::new(CountingRemote::default()))
        .sync_pending()
        .await;
    assert_eq!((report.success_count, report.error_count), (10, 0));

    let records = db.get_records().await.unwrap();
    assert_eq!(records.len(), 10);
    assert!(records
        .iter()
        .all(|r| r.sync_status == RecordSyncStatus::Synced && !r.needs_sync()));
}

#[tokio::test]
async fn duplicate_applications_are_rejected_at_creation() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    db.add_record(application("Acme", 1)).await.unwrap();

    let again = db
        .add_record(NewApplication::new(
            "  acme ",
            "software   engineer",
            NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
        ))
        .await;

    assert!(again.is_err());
    assert_eq!(db.get_records().await.unwrap().len(), 1);
}
