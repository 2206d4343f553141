//! # Auto-Refresh Scheduler
//!
//! Periodic, gated driver of the [`RefreshCoordinator`].
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌──────────┐   enable(n)    ┌──────────┐                             │
//! │   │ disabled │ ─────────────▶ │ enabled  │ ◀──┐ enable(m): stop timer, │
//! │   └──────────┘                └────┬─────┘ ───┘ start a new one        │
//! │        ▲                           │                                    │
//! │        │        disable()          │ tick every n seconds              │
//! │        └───────────────────────────┤                                    │
//! │                                    ▼                                    │
//! │          visible ∧ ¬refreshing ∧ ¬hidden ∧ online ?                    │
//! │               │ yes                       │ no                          │
//! │               ▼                           ▼                             │
//! │     coordinator.run(ops())         skipped (counted, debug log)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Timer Ownership
//! At most one timer task is alive. Stopping a timer sends a oneshot
//! signal; a refresh already running inside the task is allowed to finish,
//! so `is_refreshing` is always cleared. The first tick fires one full
//! interval after `enable`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use tracker_core::{AutoRefreshPreference, ToastCategory};

use crate::coordinator::{OperationsFactory, RefreshCoordinator};
use crate::error::{SyncError, SyncResult};
use crate::notifications::Toast;
use crate::preferences::PreferenceStore;
use crate::stores::EnvironmentGates;

// =============================================================================
// Stats
// =============================================================================

/// Tick counters, cumulative across timers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Ticks observed.
    pub ticks: u64,
    /// Ticks that ran a refresh.
    pub runs: u64,
    /// Ticks dropped by the gate or by a refresh already in flight.
    pub skipped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    ticks: AtomicU64,
    runs: AtomicU64,
    skipped: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> SchedulerStats {
        SchedulerStats {
            ticks: self.ticks.load(Ordering::SeqCst),
            runs: self.runs.load(Ordering::SeqCst),
            skipped: self.skipped.load(Ordering::SeqCst),
        }
    }
}

// =============================================================================
// Scheduler
// =============================================================================

struct ActiveTimer {
    period: Duration,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Owns the (single) auto-refresh timer.
pub struct AutoRefreshScheduler {
    coordinator: RefreshCoordinator,
    gates: Arc<dyn EnvironmentGates>,
    preferences: Arc<dyn PreferenceStore>,
    operations: OperationsFactory,
    counters: Arc<Counters>,
    active: Mutex<Option<ActiveTimer>>,
}

impl AutoRefreshScheduler {
    pub fn new(
        coordinator: RefreshCoordinator,
        gates: Arc<dyn EnvironmentGates>,
        preferences: Arc<dyn PreferenceStore>,
        operations: OperationsFactory,
    ) -> Self {
        AutoRefreshScheduler {
            coordinator,
            gates,
            preferences,
            operations,
            counters: Arc::new(Counters::default()),
            active: Mutex::new(None),
        }
    }

    /// Applies the stored preference to the shared state.
    ///
    /// The interval is restored; auto-refresh stays disabled until
    /// [`enable`](Self::enable) is called explicitly.
    pub async fn restore(&self) -> AutoRefreshPreference {
        let preference = match self.preferences.load().await {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Failed to load auto-refresh preference, using defaults");
                AutoRefreshPreference::default()
            }
        };

        let mut state = self.coordinator.state_handle().write().await;
        state.auto_refresh_enabled = false;
        state.auto_refresh_interval_seconds = preference.interval_secs;
        self.coordinator.emitter().emit_refresh_state(&state);

        debug!(interval_secs = preference.interval_secs, "Auto-refresh preference restored");
        preference
    }

    /// Starts (or restarts) the timer at `interval_secs`.
    ///
    /// ## Errors
    /// * `SyncError::InvalidConfig` - interval of zero
    pub async fn enable(&self, interval_secs: u64) -> SyncResult<()> {
        if interval_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "auto-refresh interval must be greater than 0".into(),
            ));
        }

        let period = Duration::from_secs(interval_secs);

        {
            let mut active = self.active.lock().await;
            if let Some(previous) = active.take() {
                debug!(previous = ?previous.period, "Replacing auto-refresh timer");
                let _ = previous.shutdown_tx.send(());
            }
            *active = Some(self.spawn_timer(period));
        }

        let preference = {
            let mut state = self.coordinator.state_handle().write().await;
            state.auto_refresh_enabled = true;
            state.auto_refresh_interval_seconds = interval_secs;
            self.coordinator.emitter().emit_refresh_state(&state);
            state.preference()
        };
        self.persist(&preference).await;

        info!(interval_secs, "Auto-refresh enabled");
        self.coordinator
            .notifications()
            .publish(
                Toast::info(format!("Auto-refresh enabled (every {}s)", interval_secs))
                    .with_category(ToastCategory::Refresh),
            )
            .await;

        Ok(())
    }

    /// Stops the timer. A refresh already running completes normally.
    pub async fn disable(&self) {
        self.stop_timer().await;

        let preference = {
            let mut state = self.coordinator.state_handle().write().await;
            state.auto_refresh_enabled = false;
            self.coordinator.emitter().emit_refresh_state(&state);
            state.preference()
        };
        self.persist(&preference).await;

        info!("Auto-refresh disabled");
        self.coordinator
            .notifications()
            .publish(Toast::info("Auto-refresh disabled").with_category(ToastCategory::Refresh))
            .await;
    }

    /// Stops the timer and waits for its task to exit, without touching
    /// state or preferences. For host shutdown.
    pub async fn shutdown(&self) -> SyncResult<()> {
        let timer = self.active.lock().await.take();
        if let Some(timer) = timer {
            let _ = timer.shutdown_tx.send(());
            timer.handle.await?;
        }
        Ok(())
    }

    /// True while a timer is alive.
    pub async fn is_active(&self) -> bool {
        self.active.lock().await.is_some()
    }

    /// Period of the live timer, if any.
    pub async fn active_period(&self) -> Option<Duration> {
        self.active.lock().await.as_ref().map(|t| t.period)
    }

    pub fn stats(&self) -> SchedulerStats {
        self.counters.snapshot()
    }

    async fn stop_timer(&self) {
        if let Some(timer) = self.active.lock().await.take() {
            let _ = timer.shutdown_tx.send(());
        }
    }

    async fn persist(&self, preference: &AutoRefreshPreference) {
        if let Err(e) = self.preferences.save(preference).await {
            warn!(error = %e, "Failed to persist auto-refresh preference");
        }
    }

    fn spawn_timer(&self, period: Duration) -> ActiveTimer {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let ticker = Ticker {
            coordinator: self.coordinator.clone(),
            gates: self.gates.clone(),
            operations: self.operations.clone(),
            counters: self.counters.clone(),
        };
        let handle = tokio::spawn(ticker.run(period, shutdown_rx));

        ActiveTimer {
            period,
            shutdown_tx,
            handle,
        }
    }
}

impl Drop for AutoRefreshScheduler {
    fn drop(&mut self) {
        // The timer task must not outlive its scheduler.
        if let Some(timer) = self.active.get_mut().take() {
            let _ = timer.shutdown_tx.send(());
        }
    }
}

// =============================================================================
// Timer Task
// =============================================================================

struct Ticker {
    coordinator: RefreshCoordinator,
    gates: Arc<dyn EnvironmentGates>,
    operations: OperationsFactory,
    counters: Arc<Counters>,
}

impl Ticker {
    async fn run(self, period: Duration, mut shutdown_rx: oneshot::Receiver<()>) {
        debug!(?period, "Auto-refresh timer started");

        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown_rx => {
                    break;
                }

                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }

        debug!(?period, "Auto-refresh timer stopped");
    }

    async fn tick(&self) {
        self.counters.ticks.fetch_add(1, Ordering::SeqCst);

        let visible = self.gates.is_dashboard_visible();
        let hidden = self.gates.is_host_hidden();
        let online = self.gates.is_online();
        let refreshing = self.coordinator.is_refreshing().await;

        if !(visible && !refreshing && !hidden && online) {
            self.counters.skipped.fetch_add(1, Ordering::SeqCst);
            debug!(visible, hidden, online, refreshing, "Auto-refresh tick skipped");
            return;
        }

        let summary = self.coordinator.run((self.operations)()).await;
        if summary.skipped {
            self.counters.skipped.fetch_add(1, Ordering::SeqCst);
        } else {
            self.counters.runs.fetch_add(1, Ordering::SeqCst);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::RefreshOperation;
    use crate::notifications::NotificationCenter;
    use crate::preferences::MemoryPreferenceStore;
    use crate::stores::StaticGates;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::sleep;
    use tracker_core::ToastKind;

    struct Harness {
        scheduler: AutoRefreshScheduler,
        coordinator: RefreshCoordinator,
        gates: Arc<StaticGates>,
        preferences: Arc<MemoryPreferenceStore>,
        runs: Arc<AtomicUsize>,
    }

    fn harness_with(preferences: MemoryPreferenceStore) -> Harness {
        let coordinator = RefreshCoordinator::with_defaults(NotificationCenter::with_defaults());
        let gates = Arc::new(StaticGates::default());
        let preferences = Arc::new(preferences);
        let runs = Arc::new(AtomicUsize::new(0));

        let factory: OperationsFactory = {
            let runs = runs.clone();
            Arc::new(move || {
                let runs = runs.clone();
                vec![RefreshOperation::new("Applications", move || async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })]
            })
        };

        let scheduler = AutoRefreshScheduler::new(
            coordinator.clone(),
            gates.clone(),
            preferences.clone(),
            factory,
        );

        Harness {
            scheduler,
            coordinator,
            gates,
            preferences,
            runs,
        }
    }

    fn harness() -> Harness {
        harness_with(MemoryPreferenceStore::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_interval() {
        let h = harness();
        h.scheduler.enable(10).await.unwrap();

        sleep(Duration::from_millis(9_900)).await;
        assert_eq!(h.runs.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(200)).await;
        assert_eq!(h.runs.load(Ordering::SeqCst), 1);

        sleep(Duration::from_secs(20)).await;
        assert_eq!(h.runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reenable_replaces_timer() {
        let h = harness();
        h.scheduler.enable(10).await.unwrap();
        h.scheduler.enable(5).await.unwrap();

        assert_eq!(h.scheduler.active_period().await, Some(Duration::from_secs(5)));

        // 5s timer fires at 5, 10, 15, 20; the old 10s timer would add two more.
        sleep(Duration::from_millis(20_500)).await;
        assert_eq!(h.runs.load(Ordering::SeqCst), 4);
        assert_eq!(h.coordinator.state().await.auto_refresh_interval_seconds, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disable_stops_runs() {
        let h = harness();
        h.scheduler.enable(5).await.unwrap();

        sleep(Duration::from_millis(5_500)).await;
        assert_eq!(h.runs.load(Ordering::SeqCst), 1);

        h.scheduler.disable().await;
        assert!(!h.scheduler.is_active().await);

        sleep(Duration::from_secs(60)).await;
        assert_eq!(h.runs.load(Ordering::SeqCst), 1);

        let state = h.coordinator.state().await;
        assert!(!state.auto_refresh_enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hidden_host_skips_tick() {
        let h = harness();
        h.gates.set_hidden(true);
        h.scheduler.enable(30).await.unwrap();

        sleep(Duration::from_millis(30_500)).await;
        assert_eq!(h.runs.load(Ordering::SeqCst), 0);

        let stats = h.scheduler.stats();
        assert_eq!(stats.ticks, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.runs, 0);

        h.gates.set_hidden(false);
        sleep(Duration::from_secs(30)).await;
        assert_eq!(h.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_offline_and_invisible_skip() {
        let h = harness();
        h.gates.set_online(false);
        h.scheduler.enable(1).await.unwrap();
        sleep(Duration::from_millis(1_500)).await;

        h.gates.set_online(true);
        h.gates.set_visible(false);
        sleep(Duration::from_secs(1)).await;

        assert_eq!(h.runs.load(Ordering::SeqCst), 0);
        assert_eq!(h.scheduler.stats().skipped, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_skipped_while_refreshing() {
        let h = harness();
        h.coordinator.state_handle().write().await.is_refreshing = true;

        h.scheduler.enable(1).await.unwrap();
        sleep(Duration::from_millis(1_500)).await;

        assert_eq!(h.runs.load(Ordering::SeqCst), 0);
        assert_eq!(h.scheduler.stats().skipped, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_default_interval_reaches_enable() {
        let h = harness_with(MemoryPreferenceStore::with_default(AutoRefreshPreference {
            enabled: false,
            interval_secs: 90,
        }));

        let preference = h.scheduler.restore().await;
        assert_eq!(h.coordinator.state().await.auto_refresh_interval_seconds, 90);

        h.scheduler.enable(preference.interval_secs).await.unwrap();
        assert_eq!(h.scheduler.active_period().await, Some(Duration::from_secs(90)));

        sleep(Duration::from_millis(90_500)).await;
        assert_eq!(h.runs.load(Ordering::SeqCst), 1);
        assert_eq!(h.preferences.stored().await.map(|p| p.interval_secs), Some(90));
    }

    #[tokio::test(start_paused = true)]
    async fn test_enable_zero_rejected() {
        let h = harness();
        let err = h.scheduler.enable(0).await.unwrap_err();
        assert!(err.is_config_error());
        assert!(!h.scheduler.is_active().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enable_persists_and_notifies() {
        let h = harness();
        h.scheduler.enable(45).await.unwrap();

        let state = h.coordinator.state().await;
        assert!(state.auto_refresh_enabled);
        assert_eq!(state.auto_refresh_interval_seconds, 45);

        let stored = h.preferences.stored().await.unwrap();
        assert!(stored.enabled);
        assert_eq!(stored.interval_secs, 45);

        let toasts = h.coordinator.notifications().visible().await;
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Info);
        assert_eq!(toasts[0].message, "Auto-refresh enabled (every 45s)");

        // Refresh category cooldown is 5s.
        sleep(Duration::from_secs(6)).await;
        h.scheduler.disable().await;
        let toasts = h.coordinator.notifications().visible().await;
        assert_eq!(toasts.last().unwrap().message, "Auto-refresh disabled");
        assert!(!h.preferences.stored().await.unwrap().enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_keeps_interval_but_not_enabled() {
        let h = harness_with(MemoryPreferenceStore::with_stored(AutoRefreshPreference {
            enabled: true,
            interval_secs: 120,
        }));

        let restored = h.scheduler.restore().await;
        assert!(!restored.enabled);

        let state = h.coordinator.state().await;
        assert!(!state.auto_refresh_enabled);
        assert_eq!(state.auto_refresh_interval_seconds, 120);
        assert!(!h.scheduler.is_active().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_waits_for_task() {
        let h = harness();
        h.scheduler.enable(5).await.unwrap();
        h.scheduler.shutdown().await.unwrap();

        assert!(!h.scheduler.is_active().await);
        sleep(Duration::from_secs(30)).await;
        assert_eq!(h.runs.load(Ordering::SeqCst), 0);
        // Shutdown leaves the user's choice alone.
        assert!(h.coordinator.state().await.auto_refresh_enabled);
    }
}
