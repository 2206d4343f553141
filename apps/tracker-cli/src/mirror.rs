//! # Mirror Remote
//!
//! A second SQLite file standing in for the remote backing store and the
//! live analytics service.
//!
//! ```text
//! tracker.db ──sync──▶ MirrorStore::add_records_batch ──▶ mirror.db
//!                         (assigns cloud ids)
//!
//! refresh ──▶ MirrorStore::fetch_safe ──▶ Analytics { source: live }
//!        └──▶ OfflineAnalytics (no --mirror) ──▶ network error ──▶ local fallback
//! ```

use async_trait::async_trait;
use tracing::debug;
use tracker_core::{
    Analytics, AnalyticsSource, ApplicationRecord, RecordSyncStatus, RefreshError,
};
use tracker_db::Database;
use tracker_sync::{LiveAnalyticsSource, RemoteStore};
use uuid::Uuid;

/// Remote store and live analytics over a mirror database.
#[derive(Clone)]
pub struct MirrorStore {
    db: Database,
}

impl MirrorStore {
    pub fn new(db: Database) -> Self {
        MirrorStore { db }
    }
}

#[async_trait]
impl RemoteStore for MirrorStore {
    async fn add_records_batch(
        &self,
        records: &[ApplicationRecord],
    ) -> Vec<Result<String, RefreshError>> {
        let repo = self.db.applications();
        let mut results = Vec::with_capacity(records.len());

        for record in records {
            let cloud_id = record
                .cloud_id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string());

            let mut uploaded = record.clone();
            uploaded.sync_status = RecordSyncStatus::Synced;
            uploaded.cloud_id = Some(cloud_id.clone());

            let result = repo
                .import(&uploaded)
                .await
                .map(|()| cloud_id)
                .map_err(RefreshError::from);
            results.push(result);
        }

        debug!(count = records.len(), "Batch written to mirror");
        results
    }
}

#[async_trait]
impl LiveAnalyticsSource for MirrorStore {
    async fn fetch_safe(&self) -> Result<Analytics, RefreshError> {
        let records = self
            .db
            .applications()
            .list()
            .await
            .map_err(RefreshError::from)?;

        let mut analytics = Analytics::compute(&records);
        analytics.source = AnalyticsSource::Live;
        Ok(analytics)
    }
}

/// Live analytics when no mirror is configured: always unreachable.
pub struct OfflineAnalytics;

#[async_trait]
impl LiveAnalyticsSource for OfflineAnalytics {
    async fn fetch_safe(&self) -> Result<Analytics, RefreshError> {
        Err(RefreshError::network("analytics service unreachable"))
    }
}
