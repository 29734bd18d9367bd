//! Capability interfaces for the external stores the pipeline depends on.
//!
//! The core services only ever see these traits, never a concrete
//! backend, so they can be exercised against the in-memory fakes in
//! tests and against the SQLite-backed implementations in the running
//! service.

use crate::models::certificate::AuditCertificate;
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

pub mod sqlite;

#[cfg(test)]
pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("certificate `{certificate_id}` already exists for vessel `{vessel_id}`")]
    DuplicateCertificate {
        vessel_id: String,
        certificate_id: String,
    },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read/modify/write access to the string metadata attached to a blob.
#[async_trait]
pub trait ObjectMetadataStore: Send + Sync {
    /// Fetch the full metadata mapping for a blob. A blob with no
    /// recorded metadata yields an empty map.
    async fn get_metadata(&self, blob_name: &str) -> StoreResult<HashMap<String, String>>;

    /// Merge `updates` into the blob's metadata: union of existing keys
    /// and `updates`, with `updates` winning on collision. Unrelated
    /// keys are never removed.
    async fn merge_metadata(
        &self,
        blob_name: &str,
        updates: &HashMap<String, String>,
    ) -> StoreResult<()>;
}

/// Append-only durable record store for audit certificates, partitioned
/// by vessel for efficient per-vessel compliance queries.
#[async_trait]
pub trait CertificateStore: Send + Sync {
    /// Insert a certificate keyed by `(vessel_id, certificate_id)`.
    /// Insert, not upsert: a duplicate key within a partition fails
    /// with [`StoreError::DuplicateCertificate`].
    async fn put(&self, certificate: &AuditCertificate) -> StoreResult<()>;

    /// All certificates issued for one vessel, oldest first.
    async fn list_by_vessel(&self, vessel_id: &str) -> StoreResult<Vec<AuditCertificate>>;
}

/// Downstream queue that hands validated files to the transfer process.
#[async_trait]
pub trait ValidationQueue: Send + Sync {
    /// Append one serialized validation-result message.
    async fn enqueue(&self, message: &str) -> StoreResult<()>;
}
