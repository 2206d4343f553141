//! # Tracker Configuration
//!
//! Configuration management for the orchestration layer.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TRACKER_DB_PATH=/tmp/tracker.db                                    │
//! │     TRACKER_REFRESH_INTERVAL=60                                        │
//! │     TRACKER_SYNC_COOLDOWN_MS=3000                                      │
//! │     TRACKER_FETCH_RETRIES=2                                            │
//! │     TRACKER_BACKOFF=exponential                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/jobs/tracker.toml (Linux)                                │
//! │     ~/Library/Application Support/com.tracker.jobs/tracker.toml        │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [notifications]
//! dedup_window_ms = 2000
//! cleanup_threshold_secs = 30
//! max_visible = 3
//! default_duration_ms = 5000
//!
//! [refresh]
//! default_interval_secs = 30
//! fetch_max_retries = 2
//! backoff = "linear"       # linear | exponential
//! backoff_step_ms = 1000
//! backoff_max_ms = 30000
//!
//! [sync]
//! cooldown_ms = 3000
//!
//! [storage]
//! database_path = "/home/me/.local/share/jobs/tracker.db"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracker_core::AutoRefreshPreference;

use crate::error::{SyncError, SyncResult};
use crate::fetcher::{BackoffPolicy, FetcherSettings};
use crate::notifications::NotificationSettings;

// =============================================================================
// Backoff Kind
// =============================================================================

/// Shape of the delay between live-fetch retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffKind {
    /// `attempt × step`.
    #[default]
    Linear,

    /// Doubling from `step`, capped at `backoff_max_ms`.
    Exponential,
}

impl std::fmt::Display for BackoffKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackoffKind::Linear => write!(f, "linear"),
            BackoffKind::Exponential => write!(f, "exponential"),
        }
    }
}

impl std::str::FromStr for BackoffKind {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear" => Ok(BackoffKind::Linear),
            "exponential" | "exp" => Ok(BackoffKind::Exponential),
            other => Err(SyncError::InvalidConfig(format!(
                "Unknown backoff: '{}'. Valid options: linear, exponential",
                other
            ))),
        }
    }
}

// =============================================================================
// Notification Section
// =============================================================================

/// `[notifications]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSection {
    /// Identical (kind, message) pairs inside this window are dropped.
    #[serde(default = "default_dedup_window_ms")]
    pub dedup_window_ms: u64,

    /// Visible toasts older than this are pruned before a new one is added.
    #[serde(default = "default_cleanup_threshold_secs")]
    pub cleanup_threshold_secs: u64,

    /// Maximum toasts on screen at once.
    #[serde(default = "default_max_visible")]
    pub max_visible: usize,

    /// Auto-dismiss delay when the caller gives none. 0 = sticky.
    #[serde(default = "default_duration_ms")]
    pub default_duration_ms: u64,
}

fn default_dedup_window_ms() -> u64 {
    2000
}
fn default_cleanup_threshold_secs() -> u64 {
    30
}
fn default_max_visible() -> usize {
    tracker_core::MAX_VISIBLE_TOASTS
}
fn default_duration_ms() -> u64 {
    5000
}

impl Default for NotificationSection {
    fn default() -> Self {
        NotificationSection {
            dedup_window_ms: default_dedup_window_ms(),
            cleanup_threshold_secs: default_cleanup_threshold_secs(),
            max_visible: default_max_visible(),
            default_duration_ms: default_duration_ms(),
        }
    }
}

// =============================================================================
// Refresh Section
// =============================================================================

/// `[refresh]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshSection {
    /// Interval offered when auto-refresh is enabled without one.
    #[serde(default = "default_interval_secs")]
    pub default_interval_secs: u64,

    /// Retries of the live source before falling back (total calls = n + 1).
    #[serde(default = "default_fetch_max_retries")]
    pub fetch_max_retries: u32,

    /// Retry delay shape.
    #[serde(default)]
    pub backoff: BackoffKind,

    /// Linear step, or the first exponential delay.
    #[serde(default = "default_backoff_step_ms")]
    pub backoff_step_ms: u64,

    /// Upper bound for exponential delays.
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
}

fn default_interval_secs() -> u64 {
    tracker_core::DEFAULT_AUTO_REFRESH_INTERVAL_SECS
}
fn default_fetch_max_retries() -> u32 {
    2
}
fn default_backoff_step_ms() -> u64 {
    1000
}
fn default_backoff_max_ms() -> u64 {
    30_000
}

impl Default for RefreshSection {
    fn default() -> Self {
        RefreshSection {
            default_interval_secs: default_interval_secs(),
            fetch_max_retries: default_fetch_max_retries(),
            backoff: BackoffKind::default(),
            backoff_step_ms: default_backoff_step_ms(),
            backoff_max_ms: default_backoff_max_ms(),
        }
    }
}

// =============================================================================
// Sync & Storage Sections
// =============================================================================

/// `[sync]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSection {
    /// Minimum time between two reconciliation attempts.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
}

fn default_cooldown_ms() -> u64 {
    3000
}

impl Default for SyncSection {
    fn default() -> Self {
        SyncSection {
            cooldown_ms: default_cooldown_ms(),
        }
    }
}

/// `[storage]` section. Unset paths resolve under the platform directories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub preferences_path: Option<PathBuf>,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete tracker configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub notifications: NotificationSection,

    #[serde(default)]
    pub refresh: RefreshSection,

    #[serde(default)]
    pub sync: SyncSection,

    #[serde(default)]
    pub storage: StorageSection,
}

impl TrackerConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (tracker.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading tracker config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load tracker config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Tracker config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        if self.refresh.default_interval_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "default_interval_secs must be greater than 0".into(),
            ));
        }

        let max_visible = self.notifications.max_visible;
        if max_visible == 0 || max_visible > tracker_core::MAX_VISIBLE_TOASTS {
            return Err(SyncError::InvalidConfig(format!(
                "max_visible must be between 1 and {}",
                tracker_core::MAX_VISIBLE_TOASTS
            )));
        }

        if self.refresh.backoff == BackoffKind::Exponential
            && self.refresh.backoff_max_ms < self.refresh.backoff_step_ms
        {
            return Err(SyncError::InvalidConfig(format!(
                "backoff_max_ms ({}) must be at least backoff_step_ms ({})",
                self.refresh.backoff_max_ms, self.refresh.backoff_step_ms
            )));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("TRACKER_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Ok(interval) = std::env::var("TRACKER_REFRESH_INTERVAL") {
            match interval.parse::<u64>() {
                Ok(secs) => self.refresh.default_interval_secs = secs,
                Err(_) => warn!(value = %interval, "Ignoring invalid TRACKER_REFRESH_INTERVAL"),
            }
        }

        if let Ok(cooldown) = std::env::var("TRACKER_SYNC_COOLDOWN_MS") {
            match cooldown.parse::<u64>() {
                Ok(ms) => self.sync.cooldown_ms = ms,
                Err(_) => warn!(value = %cooldown, "Ignoring invalid TRACKER_SYNC_COOLDOWN_MS"),
            }
        }

        if let Ok(retries) = std::env::var("TRACKER_FETCH_RETRIES") {
            match retries.parse::<u32>() {
                Ok(n) => self.refresh.fetch_max_retries = n,
                Err(_) => warn!(value = %retries, "Ignoring invalid TRACKER_FETCH_RETRIES"),
            }
        }

        if let Ok(backoff) = std::env::var("TRACKER_BACKOFF") {
            match backoff.parse() {
                Ok(kind) => self.refresh.backoff = kind,
                Err(e) => warn!(error = %e, "Ignoring TRACKER_BACKOFF"),
            }
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "tracker", "jobs")
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("tracker.toml"))
    }

    // =========================================================================
    // Derived Settings
    // =========================================================================

    /// Database file: configured path, else `<data_dir>/tracker.db`.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.storage.database_path.clone().or_else(|| {
            Self::project_dirs().map(|dirs| dirs.data_dir().join("tracker.db"))
        })
    }

    /// Preference file: configured path, else `<config_dir>/preferences.toml`.
    pub fn preferences_path(&self) -> Option<PathBuf> {
        self.storage.preferences_path.clone().or_else(|| {
            Self::project_dirs().map(|dirs| dirs.config_dir().join("preferences.toml"))
        })
    }

    /// Settings for the notification center.
    pub fn notification_settings(&self) -> NotificationSettings {
        NotificationSettings {
            dedup_window: Duration::from_millis(self.notifications.dedup_window_ms),
            cleanup_threshold: Duration::from_secs(self.notifications.cleanup_threshold_secs),
            max_visible: self.notifications.max_visible,
            default_duration: Duration::from_millis(self.notifications.default_duration_ms),
            ..NotificationSettings::default()
        }
    }

    /// Settings for the degrading fetcher.
    pub fn fetcher_settings(&self) -> FetcherSettings {
        let step = Duration::from_millis(self.refresh.backoff_step_ms);
        let backoff = match self.refresh.backoff {
            BackoffKind::Linear => BackoffPolicy::Linear { step },
            BackoffKind::Exponential => BackoffPolicy::Exponential {
                initial: step,
                max: Duration::from_millis(self.refresh.backoff_max_ms),
            },
        };

        FetcherSettings {
            max_retries: self.refresh.fetch_max_retries,
            backoff,
        }
    }

    /// Cooldown between reconciliation attempts.
    pub fn sync_cooldown(&self) -> Duration {
        Duration::from_millis(self.sync.cooldown_ms)
    }

    /// Auto-refresh preference used before the user has stored one.
    pub fn default_auto_refresh(&self) -> AutoRefreshPreference {
        AutoRefreshPreference {
            enabled: false,
            interval_secs: self.refresh.default_interval_secs,
        }
    }
}
