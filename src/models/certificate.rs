//! Deletion-audit certificate records and the request that produces them.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

/// Immutable compliance record asserting that a blob was validated,
/// transferred to archival storage, and deleted from hot storage.
///
/// Persisted partitioned by `vessel_id` and keyed within the partition
/// by `certificate_id`; never mutated or deleted once stored. Timestamp
/// fields other than the generation/deletion pair are carried as opaque
/// strings because they originate from upstream metadata and may be the
/// literal `"unknown"`.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuditCertificate {
    /// Globally unique id, freshly generated per certificate. Never reused.
    pub certificate_id: Uuid,

    /// When this audit record was created (UTC, RFC 3339).
    pub generation_timestamp: String,

    /// Blob the certificate describes.
    pub blob_name: String,

    /// Partition key for per-vessel audit queries.
    pub vessel_id: String,

    /// Capture timestamp from the blob's original upload metadata.
    pub original_timestamp: String,

    /// When the blob passed checksum validation.
    pub validation_timestamp: String,

    /// When the blob was transferred to archival storage.
    pub transfer_timestamp: String,

    /// Archival destination the blob was transferred to.
    pub s3_destination: String,

    /// When the hot-storage copy was deleted. Stamped at certificate
    /// creation; no separate deletion-time source exists at this boundary.
    pub deletion_timestamp: String,

    /// Constant identifying the issuing system.
    pub issued_by: String,
}

/// Body of `POST /v1/certificates`, sent by the external transfer
/// orchestrator after it has archived and deleted a blob.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRequest {
    /// Absent fields deserialize as empty and are rejected by the
    /// issuer with a 400, matching the wire contract for missing
    /// required parameters.
    #[serde(default)]
    pub blob_name: String,

    /// Blob metadata snapshot taken before deletion. Missing keys fall
    /// back to `"unknown"` in the issued certificate.
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    #[serde(default)]
    pub transfer_timestamp: String,

    #[serde(default)]
    pub s3_destination: String,
}
