//! Shared application state handed to every handler.

use crate::services::certificate_service::CertificateService;
use crate::services::validation_service::ValidationService;
use crate::stores::ObjectMetadataStore;
use crate::stores::sqlite::{SqliteCertificateStore, SqliteMetadataStore, SqliteValidationQueue};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;

/// Router state: the two core services plus what the health and
/// validation handlers need directly (pool for the readiness probe,
/// spool directory for request-body spill files, metadata store for
/// the trigger's metadata lookup).
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SqlitePool>,
    pub spool_dir: PathBuf,
    pub metadata_store: Arc<dyn ObjectMetadataStore>,
    pub validation: ValidationService,
    pub certificates: CertificateService,
}

impl AppState {
    /// Wire the services against the SQLite-backed stores.
    pub fn new(db: Arc<SqlitePool>, spool_dir: impl Into<PathBuf>) -> Self {
        let metadata_store: Arc<dyn ObjectMetadataStore> =
            Arc::new(SqliteMetadataStore::new(db.clone()));
        let queue = Arc::new(SqliteValidationQueue::new(db.clone()));
        let certificate_store = Arc::new(SqliteCertificateStore::new(db.clone()));

        Self {
            db,
            spool_dir: spool_dir.into(),
            metadata_store: metadata_store.clone(),
            validation: ValidationService::new(metadata_store, queue),
            certificates: CertificateService::new(certificate_store),
        }
    }
}
