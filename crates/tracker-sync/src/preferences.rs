//! # Auto-Refresh Preference Storage
//!
//! Durable storage for the two auto-refresh fields of the refresh state.
//!
//! Loading always yields `enabled = false`: a restart never resumes polling
//! on its own, only the chosen interval survives. Before anything has been
//! stored, loading yields the store's default (the configured interval).
//!
//! ## File Format
//! ```toml
//! [auto_refresh]
//! enabled = true
//! intervalSecs = 45
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};
use tracker_core::AutoRefreshPreference;

use crate::error::{SyncError, SyncResult};

/// Host-provided durable key/value storage for the preference.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Loads the preference with `enabled` forced to false.
    async fn load(&self) -> SyncResult<AutoRefreshPreference>;

    /// Persists the preference as given.
    async fn save(&self, preference: &AutoRefreshPreference) -> SyncResult<()>;
}

// =============================================================================
// TOML File Store
// =============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct PreferencesFile {
    #[serde(default)]
    auto_refresh: Option<AutoRefreshPreference>,
}

/// Preference stored in a TOML file.
#[derive(Debug, Clone)]
pub struct TomlPreferenceStore {
    path: PathBuf,
    fallback: AutoRefreshPreference,
}

impl TomlPreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TomlPreferenceStore {
            path: path.into(),
            fallback: AutoRefreshPreference::default(),
        }
    }

    /// Preference returned while nothing is stored.
    pub fn with_default(mut self, preference: AutoRefreshPreference) -> Self {
        self.fallback = preference.restored();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PreferenceStore for TomlPreferenceStore {
    async fn load(&self) -> SyncResult<AutoRefreshPreference> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?self.path, "No stored preference, using defaults");
                return Ok(self.fallback);
            }
            Err(e) => return Err(SyncError::PreferencesFailed(e.to_string())),
        };

        let file: PreferencesFile = toml::from_str(&contents)
            .map_err(|e| SyncError::PreferencesFailed(e.to_string()))?;

        Ok(file.auto_refresh.unwrap_or(self.fallback).restored())
    }

    async fn save(&self, preference: &AutoRefreshPreference) -> SyncResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SyncError::PreferencesFailed(e.to_string()))?;
        }

        let file = PreferencesFile {
            auto_refresh: Some(*preference),
        };
        let contents = toml::to_string_pretty(&file)?;
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|e| SyncError::PreferencesFailed(e.to_string()))?;

        info!(
            path = ?self.path,
            enabled = preference.enabled,
            interval_secs = preference.interval_secs,
            "Auto-refresh preference saved"
        );
        Ok(())
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Preference kept in memory (tests, ephemeral hosts).
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    stored: Mutex<Option<AutoRefreshPreference>>,
    fallback: AutoRefreshPreference,
}

impl MemoryPreferenceStore {
    /// Starts with a stored value, as if written by a previous session.
    pub fn with_stored(preference: AutoRefreshPreference) -> Self {
        MemoryPreferenceStore {
            stored: Mutex::new(Some(preference)),
            fallback: AutoRefreshPreference::default(),
        }
    }

    /// Starts empty; loads yield `preference` until something is saved.
    pub fn with_default(preference: AutoRefreshPreference) -> Self {
        MemoryPreferenceStore {
            stored: Mutex::new(None),
            fallback: preference.restored(),
        }
    }

    /// The raw stored value, without the load-time reset.
    pub async fn stored(&self) -> Option<AutoRefreshPreference> {
        *self.stored.lock().await
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn load(&self) -> SyncResult<AutoRefreshPreference> {
        Ok(self.stored.lock().await.unwrap_or(self.fallback).restored())
    }

    async fn save(&self, preference: &AutoRefreshPreference) -> SyncResult<()> {
        *self.stored.lock().await = Some(*preference);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled(interval_secs: u64) -> AutoRefreshPreference {
        AutoRefreshPreference {
            enabled: true,
            interval_secs,
        }
    }

    #[tokio::test]
    async fn test_memory_store_forces_disabled_on_load() {
        let store = MemoryPreferenceStore::with_stored(enabled(45));

        let loaded = store.load().await.unwrap();
        assert!(!loaded.enabled);
        assert_eq!(loaded.interval_secs, 45);

        assert_eq!(store.stored().await, Some(enabled(45)));
    }

    #[tokio::test]
    async fn test_toml_store_round_trip() {
        let dir = std::env::temp_dir().join(format!("tracker-prefs-{}", uuid::Uuid::new_v4()));
        let store = TomlPreferenceStore::new(dir.join("preferences.toml"));

        assert_eq!(store.load().await.unwrap(), AutoRefreshPreference::default());

        store.save(&enabled(90)).await.unwrap();
        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert!(contents.contains("[auto_refresh]"));
        assert!(contents.contains("intervalSecs = 90"));

        let loaded = store.load().await.unwrap();
        assert!(!loaded.enabled);
        assert_eq!(loaded.interval_secs, 90);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_default_interval_until_saved() {
        let configured = AutoRefreshPreference {
            enabled: false,
            interval_secs: 90,
        };

        let memory = MemoryPreferenceStore::with_default(configured);
        assert_eq!(memory.load().await.unwrap().interval_secs, 90);
        memory.save(&enabled(15)).await.unwrap();
        assert_eq!(memory.load().await.unwrap().interval_secs, 15);

        let dir = std::env::temp_dir().join(format!("tracker-prefs-{}", uuid::Uuid::new_v4()));
        let toml_store = TomlPreferenceStore::new(dir.join("preferences.toml")).with_default(configured);
        assert_eq!(toml_store.load().await.unwrap(), configured);

        // A file without the section still falls back to the configured interval.
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(toml_store.path(), "").unwrap();
        assert_eq!(toml_store.load().await.unwrap(), configured);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_toml_store_rejects_garbage() {
        let dir = std::env::temp_dir().join(format!("tracker-prefs-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("preferences.toml");
        std::fs::write(&path, "auto_refresh = [").unwrap();

        let err = TomlPreferenceStore::new(&path).load().await.unwrap_err();
        assert!(err.is_config_error());

        let _ = std::fs::remove_dir_all(dir);
    }
}
