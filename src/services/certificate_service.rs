//! Deletion-audit certificate issuance.
//!
//! Once the external transfer process has archived a blob and deleted
//! the hot-storage copy, it reports the transfer facts here and
//! receives an immutable audit certificate in return.

use crate::models::certificate::{AuditCertificate, CertificateRequest};
use crate::stores::{CertificateStore, StoreError};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

/// Constant identifying the issuing system on every certificate.
pub const ISSUED_BY: &str = "Elysium Data Pipeline";

const UNKNOWN: &str = "unknown";

#[derive(Debug, Error)]
pub enum CertificateError {
    /// Caller-facing and non-retryable; maps to HTTP 400.
    #[error("missing required field `{0}` for certificate generation")]
    InvalidRequest(&'static str),
}

/// Builds and persists audit certificates for completed deletions.
///
/// Persistence is deliberately soft-fail: the issuing workflow must
/// never block on the audit store being reachable, so a failed put is
/// logged as an operational incident and the freshly built certificate
/// is returned anyway.
#[derive(Clone)]
pub struct CertificateService {
    store: Arc<dyn CertificateStore>,
}

impl CertificateService {
    pub fn new(store: Arc<dyn CertificateStore>) -> Self {
        Self { store }
    }

    /// Issue a certificate for one deletion event.
    ///
    /// `blobName`, `transferTimestamp` and `s3Destination` must be
    /// non-empty. Vessel and upstream timestamps come from the optional
    /// metadata snapshot, defaulting to `"unknown"`. The certificate id
    /// is a fresh UUID v4, so duplicate requests yield distinct
    /// certificates; generation and deletion timestamps are both
    /// stamped now.
    pub async fn issue(
        &self,
        request: &CertificateRequest,
    ) -> Result<AuditCertificate, CertificateError> {
        if request.blob_name.is_empty() {
            return Err(CertificateError::InvalidRequest("blobName"));
        }
        if request.transfer_timestamp.is_empty() {
            return Err(CertificateError::InvalidRequest("transferTimestamp"));
        }
        if request.s3_destination.is_empty() {
            return Err(CertificateError::InvalidRequest("s3Destination"));
        }

        let now = Utc::now().to_rfc3339();
        let metadata_or_unknown = |key: &str| {
            request
                .metadata
                .get(key)
                .cloned()
                .unwrap_or_else(|| UNKNOWN.to_string())
        };

        let certificate = AuditCertificate {
            certificate_id: Uuid::new_v4(),
            generation_timestamp: now.clone(),
            blob_name: request.blob_name.clone(),
            vessel_id: metadata_or_unknown("vesselId"),
            original_timestamp: metadata_or_unknown("timestamp"),
            validation_timestamp: metadata_or_unknown("validationTimestamp"),
            transfer_timestamp: request.transfer_timestamp.clone(),
            s3_destination: request.s3_destination.clone(),
            deletion_timestamp: now,
            issued_by: ISSUED_BY.to_string(),
        };

        match self.store.put(&certificate).await {
            Ok(()) => info!(
                certificate_id = %certificate.certificate_id,
                vessel_id = %certificate.vessel_id,
                blob_name = %certificate.blob_name,
                "audit certificate stored"
            ),
            // Losing the durable record is an operational incident to
            // detect via logs, not a reason to fail the caller.
            Err(err) => error!(
                certificate_id = %certificate.certificate_id,
                vessel_id = %certificate.vessel_id,
                %err,
                "failed to store audit certificate"
            ),
        }

        Ok(certificate)
    }

    /// All certificates issued for one vessel partition.
    ///
    /// Unlike `put`, reads are hard-fail: an unreachable store surfaces
    /// to the caller.
    pub async fn list_for_vessel(
        &self,
        vessel_id: &str,
    ) -> Result<Vec<AuditCertificate>, StoreError> {
        self.store.list_by_vessel(vessel_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::memory::MemoryCertificateStore;
    use std::collections::HashMap;

    fn request() -> CertificateRequest {
        CertificateRequest {
            blob_name: "usvdata/vesselA/2024-01-01.bin".into(),
            metadata: HashMap::from([
                ("vesselId".to_string(), "vesselA".to_string()),
                ("timestamp".to_string(), "2024-01-01T00:00:00Z".to_string()),
                (
                    "validationTimestamp".to_string(),
                    "2024-01-01T01:00:00Z".to_string(),
                ),
            ]),
            transfer_timestamp: "2024-01-02T00:00:00Z".into(),
            s3_destination: "s3://archive/vesselA/2024-01-01.bin".into(),
        }
    }

    #[tokio::test]
    async fn issues_and_persists_a_full_certificate() {
        let store = Arc::new(MemoryCertificateStore::new());
        let service = CertificateService::new(store.clone());

        let certificate = service.issue(&request()).await.unwrap();
        assert_eq!(certificate.vessel_id, "vesselA");
        assert_eq!(certificate.original_timestamp, "2024-01-01T00:00:00Z");
        assert_eq!(certificate.validation_timestamp, "2024-01-01T01:00:00Z");
        assert_eq!(certificate.issued_by, "Elysium Data Pipeline");
        assert_eq!(certificate.generation_timestamp, certificate.deletion_timestamp);

        let stored = store.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].certificate_id, certificate.certificate_id);
    }

    #[tokio::test]
    async fn missing_required_fields_are_rejected_without_persisting() {
        let store = Arc::new(MemoryCertificateStore::new());
        let service = CertificateService::new(store.clone());

        let mut req = request();
        req.blob_name.clear();
        let err = service.issue(&req).await.unwrap_err();
        assert!(matches!(err, CertificateError::InvalidRequest("blobName")));

        let mut req = request();
        req.transfer_timestamp.clear();
        assert!(service.issue(&req).await.is_err());

        let mut req = request();
        req.s3_destination.clear();
        assert!(service.issue(&req).await.is_err());

        assert!(store.stored().is_empty());
    }

    #[tokio::test]
    async fn absent_metadata_defaults_to_unknown() {
        let service = CertificateService::new(Arc::new(MemoryCertificateStore::new()));
        let mut req = request();
        req.metadata = HashMap::from([("vesselId".to_string(), "vesselA".to_string())]);

        let certificate = service.issue(&req).await.unwrap();
        assert_eq!(certificate.vessel_id, "vesselA");
        assert_eq!(certificate.original_timestamp, "unknown");
        assert_eq!(certificate.validation_timestamp, "unknown");
    }

    #[tokio::test]
    async fn no_metadata_at_all_defaults_every_field() {
        let service = CertificateService::new(Arc::new(MemoryCertificateStore::new()));
        let mut req = request();
        req.metadata.clear();

        let certificate = service.issue(&req).await.unwrap();
        assert_eq!(certificate.vessel_id, "unknown");
        assert_eq!(certificate.original_timestamp, "unknown");
    }

    #[tokio::test]
    async fn list_for_vessel_returns_only_that_partition() {
        let store = Arc::new(MemoryCertificateStore::new());
        let service = CertificateService::new(store);
        service.issue(&request()).await.unwrap();

        let mut other = request();
        other.metadata.insert("vesselId".to_string(), "vesselB".to_string());
        service.issue(&other).await.unwrap();

        let vessel_a = service.list_for_vessel("vesselA").await.unwrap();
        assert_eq!(vessel_a.len(), 1);
        assert_eq!(vessel_a[0].vessel_id, "vesselA");
    }

    #[tokio::test]
    async fn identical_requests_get_distinct_certificate_ids() {
        let service = CertificateService::new(Arc::new(MemoryCertificateStore::new()));
        let first = service.issue(&request()).await.unwrap();
        let second = service.issue(&request()).await.unwrap();
        assert_ne!(first.certificate_id, second.certificate_id);
    }

    #[tokio::test]
    async fn store_failure_still_returns_the_certificate() {
        let store = Arc::new(MemoryCertificateStore::new());
        store.fail_puts();
        let service = CertificateService::new(store.clone());

        let first = service.issue(&request()).await.unwrap();
        let second = service.issue(&request()).await.unwrap();
        assert_eq!(first.vessel_id, "vesselA");
        assert_ne!(first.certificate_id, second.certificate_id);
        assert!(store.stored().is_empty());
    }
}
