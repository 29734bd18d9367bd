//! In-memory fakes for the store traits, with switches to simulate
//! store unavailability. Test-only.

use crate::models::certificate::AuditCertificate;
use crate::stores::{
    CertificateStore, ObjectMetadataStore, StoreError, StoreResult, ValidationQueue,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
pub struct MemoryMetadataStore {
    blobs: Mutex<HashMap<String, HashMap<String, String>>>,
    fail_merge: AtomicBool,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, blob_name: &str, metadata: HashMap<String, String>) {
        self.blobs
            .lock()
            .unwrap()
            .insert(blob_name.to_string(), metadata);
    }

    /// Make every subsequent merge fail as if the store were down.
    pub fn fail_merges(&self) {
        self.fail_merge.store(true, Ordering::SeqCst);
    }

    pub fn metadata_for(&self, blob_name: &str) -> HashMap<String, String> {
        self.blobs
            .lock()
            .unwrap()
            .get(blob_name)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ObjectMetadataStore for MemoryMetadataStore {
    async fn get_metadata(&self, blob_name: &str) -> StoreResult<HashMap<String, String>> {
        Ok(self.metadata_for(blob_name))
    }

    async fn merge_metadata(
        &self,
        blob_name: &str,
        updates: &HashMap<String, String>,
    ) -> StoreResult<()> {
        if self.fail_merge.load(Ordering::SeqCst) {
            return Err(StoreError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        let mut blobs = self.blobs.lock().unwrap();
        let entry = blobs.entry(blob_name.to_string()).or_default();
        for (key, value) in updates {
            entry.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCertificateStore {
    certificates: Mutex<Vec<AuditCertificate>>,
    fail_put: AtomicBool,
}

impl MemoryCertificateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent put fail as if the store were down.
    pub fn fail_puts(&self) {
        self.fail_put.store(true, Ordering::SeqCst);
    }

    pub fn stored(&self) -> Vec<AuditCertificate> {
        self.certificates.lock().unwrap().clone()
    }
}

#[async_trait]
impl CertificateStore for MemoryCertificateStore {
    async fn put(&self, certificate: &AuditCertificate) -> StoreResult<()> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(StoreError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        let mut certificates = self.certificates.lock().unwrap();
        if certificates.iter().any(|c| {
            c.vessel_id == certificate.vessel_id && c.certificate_id == certificate.certificate_id
        }) {
            return Err(StoreError::DuplicateCertificate {
                vessel_id: certificate.vessel_id.clone(),
                certificate_id: certificate.certificate_id.to_string(),
            });
        }
        certificates.push(certificate.clone());
        Ok(())
    }

    async fn list_by_vessel(&self, vessel_id: &str) -> StoreResult<Vec<AuditCertificate>> {
        Ok(self
            .certificates
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.vessel_id == vessel_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryValidationQueue {
    messages: Mutex<Vec<String>>,
    fail_enqueue: AtomicBool,
}

impl MemoryValidationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent enqueue fail as if the queue were down.
    pub fn fail_enqueues(&self) {
        self.fail_enqueue.store(true, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ValidationQueue for MemoryValidationQueue {
    async fn enqueue(&self, message: &str) -> StoreResult<()> {
        if self.fail_enqueue.load(Ordering::SeqCst) {
            return Err(StoreError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}
