//! # Application Repository
//!
//! Database operations for tracked job applications.
//!
//! ## Key Operations
//! - Listing records in creation order
//! - Duplicate-checked inserts
//! - Flipping a record to synced once the remote store accepted it
//! - Upserting records received from elsewhere (mirror imports)
//!
//! ## Duplicate Key
//! ```text
//! "Acme  Corp" / "Backend Engineer" / 2026-02-01
//!        │
//!        ▼  DuplicateKey::new (trim, collapse, lowercase)
//! "acme corp|backend engineer|2026-02-01"  → applications.dedup_key (UNIQUE)
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use tracker_core::{ApplicationRecord, DuplicateKey, NewApplication, RecordSyncStatus};

const SELECT_COLUMNS: &str = r#"
    SELECT
        id,
        company,
        position,
        applied_on,
        status,
        sync_status,
        cloud_id,
        created_at,
        updated_at
    FROM applications
"#;

/// Repository for application records.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ApplicationRepository::new(pool);
///
/// let record = repo.insert(NewApplication::new("Acme", "Engineer", day)).await?;
/// repo.mark_synced(&record.id, "cloud-17").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ApplicationRepository {
    pool: SqlitePool,
}

impl ApplicationRepository {
    /// Creates a new ApplicationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ApplicationRepository { pool }
    }

    /// Lists every record, oldest first.
    pub async fn list(&self) -> DbResult<Vec<ApplicationRecord>> {
        let sql = format!("{} ORDER BY created_at, id", SELECT_COLUMNS);

        let records = sqlx::query_as::<_, ApplicationRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = records.len(), "Listed applications");
        Ok(records)
    }

    /// Gets a record by its local ID.
    ///
    /// ## Returns
    /// * `Ok(Some(record))` - Record found
    /// * `Ok(None)` - No such record
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ApplicationRecord>> {
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);

        let record = sqlx::query_as::<_, ApplicationRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Validates and inserts a new application.
    ///
    /// ## Errors
    /// * `DbError::Invalid` - empty or over-long company/position
    /// * `DbError::UniqueViolation` - same company, position and date already tracked
    pub async fn insert(&self, new: NewApplication) -> DbResult<ApplicationRecord> {
        new.validate()?;

        let key = storage_key(&new.duplicate_key());

        let existing: Option<String> =
            sqlx::query_scalar("SELECT id FROM applications WHERE dedup_key = ?1")
                .bind(&key)
                .fetch_optional(&self.pool)
                .await?;

        if existing.is_some() {
            return Err(DbError::duplicate("application", key));
        }

        let record = ApplicationRecord::from_new(new);
        self.write(&record, &key).await?;

        info!(
            id = %record.id,
            company = %record.company,
            position = %record.position,
            "Application added"
        );

        Ok(record)
    }

    /// Records a successful upload: status `synced` plus the remote id.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no record with this id
    pub async fn mark_synced(&self, id: &str, cloud_id: &str) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET sync_status = ?1, cloud_id = ?2, updated_at = ?3
            WHERE id = ?4
            "#,
        )
        .bind(RecordSyncStatus::Synced)
        .bind(cloud_id)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Application", id));
        }

        debug!(id = %id, cloud_id = %cloud_id, "Application marked synced");
        Ok(())
    }

    /// Inserts or replaces a record by id, keeping its fields as given.
    ///
    /// Used when another store hands over records it already owns; no
    /// validation or duplicate check is applied beyond the UNIQUE index.
    pub async fn import(&self, record: &ApplicationRecord) -> DbResult<()> {
        let key = storage_key(&record.duplicate_key());
        self.write(record, &key).await
    }

    /// Number of records that still need an upload.
    pub async fn count_pending(&self) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM applications
            WHERE sync_status != ?1 OR cloud_id IS NULL
            "#,
        )
        .bind(RecordSyncStatus::Synced)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }

    async fn write(&self, record: &ApplicationRecord, key: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO applications (
                id, company, position, applied_on, status,
                sync_status, cloud_id, created_at, updated_at, dedup_key
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                company = excluded.company,
                position = excluded.position,
                applied_on = excluded.applied_on,
                status = excluded.status,
                sync_status = excluded.sync_status,
                cloud_id = excluded.cloud_id,
                updated_at = excluded.updated_at,
                dedup_key = excluded.dedup_key
            "#,
        )
        .bind(&record.id)
        .bind(&record.company)
        .bind(&record.position)
        .bind(record.applied_on)
        .bind(record.status)
        .bind(record.sync_status)
        .bind(&record.cloud_id)
        .bind(record.created_at)
        .bind(record.updated_at)
        .bind(key)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn storage_key(key: &DuplicateKey) -> String {
    format!("{}|{}|{}", key.company, key.position, key.applied_on)
}

// =============================================================================
// Unit Tests
// =============================================================================
