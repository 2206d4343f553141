//! # Host Wiring
//!
//! Builds the orchestration objects once per invocation.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              App                                        │
//! │                                                                         │
//! │  TrackerConfig ──▶ Database (tracker.db)                               │
//! │       │                                                                 │
//! │       ├──▶ NotificationCenter ──▶ ConsoleEmitter (prints toasts)       │
//! │       ├──▶ RefreshCoordinator (owns GlobalRefreshState)                │
//! │       └──▶ DegradingFetcher settings                                   │
//! │                                                                         │
//! │  Per command:                                                          │
//! │   operations(live) ─▶ [Applications, Pending uploads, Analytics]       │
//! │   reconciler(remote), scheduler(gates, live), triggers(remote, live)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use tracker_core::{GlobalRefreshState, RefreshError};
use tracker_db::{Database, DbConfig};
use tracker_sync::{
    AutoRefreshScheduler, DegradingFetcher, EnvironmentGates, LiveAnalyticsSource, LocalAnalytics,
    LocalStore, NotificationCenter, OperationsFactory, PreferenceStore, RefreshCoordinator,
    RefreshOperation, RefreshTriggers, RemoteStore, SyncReconciler, Toast, TomlPreferenceStore,
    TrackerConfig, UiEventEmitter,
};

use crate::args::RemoteArgs;
use crate::console::ConsoleEmitter;
use crate::error::{CliError, CliResult};
use crate::mirror::{MirrorStore, OfflineAnalytics};

pub struct App {
    pub config: TrackerConfig,
    pub db: Database,
    pub notifications: NotificationCenter,
    pub coordinator: RefreshCoordinator,
    emitter: Arc<dyn UiEventEmitter>,
}

impl App {
    /// Loads config and opens the local database.
    ///
    /// An explicit `--config` must load; the platform default falls back
    /// to built-in settings when it is unreadable.
    pub async fn open(config_path: Option<PathBuf>, db_path: Option<PathBuf>) -> CliResult<Self> {
        let config = match config_path {
            Some(path) => TrackerConfig::load(Some(path))?,
            None => TrackerConfig::load_or_default(None),
        };

        let db_path = db_path
            .or_else(|| config.database_path())
            .ok_or(CliError::NoDataDir)?;
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        info!(?db_path, "Opening local store");
        let db = Database::new(DbConfig::new(db_path)).await?;

        let emitter: Arc<dyn UiEventEmitter> = Arc::new(ConsoleEmitter::new());
        let notifications = NotificationCenter::new(config.notification_settings(), emitter.clone());
        let coordinator = RefreshCoordinator::new(
            Arc::new(RwLock::new(GlobalRefreshState::default())),
            notifications.clone(),
            emitter.clone(),
        );

        Ok(App {
            config,
            db,
            notifications,
            coordinator,
            emitter,
        })
    }

    pub fn preferences(&self) -> CliResult<Arc<dyn PreferenceStore>> {
        let path = self.config.preferences_path().ok_or(CliError::NoDataDir)?;
        Ok(Arc::new(
            TomlPreferenceStore::new(path).with_default(self.config.default_auto_refresh()),
        ))
    }

    /// Opens the mirror database, if one was given.
    pub async fn mirror(&self, args: &RemoteArgs) -> CliResult<Option<MirrorStore>> {
        match &args.mirror {
            Some(path) => {
                debug!(?path, "Opening mirror");
                let db = Database::new(DbConfig::new(path.clone())).await?;
                Ok(Some(MirrorStore::new(db)))
            }
            None => Ok(None),
        }
    }

    /// Live analytics: the mirror, else a source that is always offline.
    pub fn live_source(mirror: Option<&MirrorStore>) -> Arc<dyn LiveAnalyticsSource> {
        match mirror {
            Some(m) => Arc::new(m.clone()),
            None => Arc::new(OfflineAnalytics),
        }
    }

    /// The operations every refresh runs.
    pub fn operations(&self, live: Arc<dyn LiveAnalyticsSource>) -> OperationsFactory {
        let db = self.db.clone();
        let fetcher = DegradingFetcher::new(self.config.fetcher_settings());
        let notifications = self.notifications.clone();

        Arc::new(move || {
            let records_db = db.clone();
            let pending_db = db.clone();
            let analytics_db = db.clone();
            let fetcher = fetcher.clone();
            let live = live.clone();
            let notifications = notifications.clone();

            vec![
                RefreshOperation::new("Applications", move || async move {
                    let records = records_db.get_records().await?;
                    debug!(count = records.len(), "Applications loaded");
                    Ok::<(), RefreshError>(())
                }),
                RefreshOperation::new("Pending uploads", move || async move {
                    let pending = pending_db.applications().count_pending().await?;
                    debug!(pending, "Pending uploads counted");
                    Ok::<(), RefreshError>(())
                }),
                RefreshOperation::new("Analytics", move || async move {
                    let local = LocalAnalytics::from_store(&analytics_db).await?;
                    let outcome = fetcher.fetch_analytics(live.as_ref(), &local).await;

                    if outcome.degraded {
                        notifications
                            .publish(Toast::warning(
                                "Live analytics unavailable, showing local data",
                            ))
                            .await;
                    }

                    let analytics = outcome.into_result()?;
                    info!(
                        total = analytics.total,
                        response_rate = analytics.response_rate,
                        source = ?analytics.source,
                        "Analytics refreshed"
                    );
                    Ok::<(), RefreshError>(())
                }),
            ]
        })
    }

    pub fn reconciler(&self, remote: Arc<dyn RemoteStore>) -> Arc<SyncReconciler> {
        let local: Arc<dyn LocalStore> = Arc::new(self.db.clone());
        Arc::new(
            SyncReconciler::new(local, remote, self.notifications.clone(), self.emitter.clone())
                .with_cooldown(self.config.sync_cooldown()),
        )
    }

    pub fn triggers(&self, mirror: MirrorStore) -> RefreshTriggers {
        let live = Self::live_source(Some(&mirror));
        RefreshTriggers::new(
            self.reconciler(Arc::new(mirror)),
            self.coordinator.clone(),
            self.operations(live),
        )
    }

    pub fn scheduler(
        &self,
        gates: Arc<dyn EnvironmentGates>,
        live: Arc<dyn LiveAnalyticsSource>,
    ) -> CliResult<AutoRefreshScheduler> {
        Ok(AutoRefreshScheduler::new(
            self.coordinator.clone(),
            gates,
            self.preferences()?,
            self.operations(live),
        ))
    }
}
