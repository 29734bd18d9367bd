//! SQLite-backed store implementations.
//!
//! Metadata lives as one row per `(blob_name, key)` pair so a merge
//! only ever touches the keys it carries. Certificates are plain
//! inserts into a `(vessel_id, certificate_id)`-keyed table — duplicate
//! keys are rejected, never overwritten. The downstream queue is a
//! local append table drained by the external transfer process.
//!
//! Each store creates its table lazily on first use; the same schema is
//! also shipped in `migrations/0001_init.sql` for the `--migrate` path.

use crate::models::certificate::AuditCertificate;
use crate::stores::{
    CertificateStore, ObjectMetadataStore, StoreError, StoreResult, ValidationQueue,
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;

const METADATA_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS blob_metadata (
    blob_name TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (blob_name, key)
)";

const CERTIFICATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS audit_certificates (
    vessel_id TEXT NOT NULL,
    certificate_id TEXT NOT NULL,
    generation_timestamp TEXT NOT NULL,
    blob_name TEXT NOT NULL,
    original_timestamp TEXT NOT NULL,
    validation_timestamp TEXT NOT NULL,
    transfer_timestamp TEXT NOT NULL,
    s3_destination TEXT NOT NULL,
    deletion_timestamp TEXT NOT NULL,
    issued_by TEXT NOT NULL,
    PRIMARY KEY (vessel_id, certificate_id)
)";

const QUEUE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS validation_queue (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    body TEXT NOT NULL,
    enqueued_at TEXT NOT NULL
)";

/// Blob metadata as `(blob_name, key, value)` rows in SQLite.
#[derive(Clone)]
pub struct SqliteMetadataStore {
    db: Arc<SqlitePool>,
}

impl SqliteMetadataStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    async fn ensure_table(&self) -> StoreResult<()> {
        sqlx::query(METADATA_TABLE_SQL).execute(&*self.db).await?;
        Ok(())
    }
}

#[async_trait]
impl ObjectMetadataStore for SqliteMetadataStore {
    async fn get_metadata(&self, blob_name: &str) -> StoreResult<HashMap<String, String>> {
        self.ensure_table().await?;
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM blob_metadata WHERE blob_name = ?")
                .bind(blob_name)
                .fetch_all(&*self.db)
                .await?;
        Ok(rows.into_iter().collect())
    }

    async fn merge_metadata(
        &self,
        blob_name: &str,
        updates: &HashMap<String, String>,
    ) -> StoreResult<()> {
        self.ensure_table().await?;
        let mut tx = self.db.begin().await?;
        for (key, value) in updates {
            sqlx::query(
                "INSERT INTO blob_metadata (blob_name, key, value) VALUES (?, ?, ?)
                 ON CONFLICT(blob_name, key) DO UPDATE SET value = excluded.value",
            )
            .bind(blob_name)
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

/// Durable audit-certificate store partitioned by vessel.
#[derive(Clone)]
pub struct SqliteCertificateStore {
    db: Arc<SqlitePool>,
}

impl SqliteCertificateStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    async fn ensure_table(&self) -> StoreResult<()> {
        sqlx::query(CERTIFICATE_TABLE_SQL).execute(&*self.db).await?;
        Ok(())
    }
}

#[async_trait]
impl CertificateStore for SqliteCertificateStore {
    async fn put(&self, certificate: &AuditCertificate) -> StoreResult<()> {
        self.ensure_table().await?;
        let result = sqlx::query(
            "INSERT INTO audit_certificates (
                vessel_id, certificate_id, generation_timestamp, blob_name,
                original_timestamp, validation_timestamp, transfer_timestamp,
                s3_destination, deletion_timestamp, issued_by
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&certificate.vessel_id)
        .bind(certificate.certificate_id)
        .bind(&certificate.generation_timestamp)
        .bind(&certificate.blob_name)
        .bind(&certificate.original_timestamp)
        .bind(&certificate.validation_timestamp)
        .bind(&certificate.transfer_timestamp)
        .bind(&certificate.s3_destination)
        .bind(&certificate.deletion_timestamp)
        .bind(&certificate.issued_by)
        .execute(&*self.db)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(StoreError::DuplicateCertificate {
                vessel_id: certificate.vessel_id.clone(),
                certificate_id: certificate.certificate_id.to_string(),
            }),
            Err(err) => Err(StoreError::Sqlx(err)),
        }
    }

    async fn list_by_vessel(&self, vessel_id: &str) -> StoreResult<Vec<AuditCertificate>> {
        self.ensure_table().await?;
        let certificates = sqlx::query_as::<_, AuditCertificate>(
            "SELECT certificate_id, generation_timestamp, blob_name, vessel_id,
                    original_timestamp, validation_timestamp, transfer_timestamp,
                    s3_destination, deletion_timestamp, issued_by
             FROM audit_certificates
             WHERE vessel_id = ?
             ORDER BY generation_timestamp ASC",
        )
        .bind(vessel_id)
        .fetch_all(&*self.db)
        .await?;
        Ok(certificates)
    }
}

/// Downstream processing queue backed by a SQLite append table.
#[derive(Clone)]
pub struct SqliteValidationQueue {
    db: Arc<SqlitePool>,
}

impl SqliteValidationQueue {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    async fn ensure_table(&self) -> StoreResult<()> {
        sqlx::query(QUEUE_TABLE_SQL).execute(&*self.db).await?;
        Ok(())
    }
}

#[async_trait]
impl ValidationQueue for SqliteValidationQueue {
    async fn enqueue(&self, message: &str) -> StoreResult<()> {
        self.ensure_table().await?;
        sqlx::query("INSERT INTO validation_queue (body, enqueued_at) VALUES (?, ?)")
            .bind(message)
            .bind(Utc::now().to_rfc3339())
            .execute(&*self.db)
            .await?;
        Ok(())
    }
}

/// Return true if SQLx error indicates a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}
