//! Checksum validation of uploaded survey-data files.
//!
//! Orchestrates the digest computation, the metadata status transition,
//! and the hand-off of valid files to the downstream processing queue.

use crate::models::validation::ValidationResult;
use crate::services::checksum::{self, ChecksumAlgorithm};
use crate::stores::{ObjectMetadataStore, StoreError, ValidationQueue};
use chrono::Utc;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncSeek};
use tracing::{error, info, warn};

/// Metadata keys the uploader must set for validation to be possible.
const REQUIRED_METADATA_KEYS: [&str; 3] = ["vesselId", "timestamp", "checksum"];

const CHECKSUM_FAILED_MESSAGE: &str = "Checksum verification failed";

#[derive(Debug, Error)]
pub enum ValidationError {
    /// Terminal for this invocation: the blob can never validate without
    /// a re-upload carrying the missing key.
    #[error("required metadata key `{0}` is missing")]
    MissingMetadata(&'static str),
    #[error("unsupported checksum algorithm `{0}`")]
    UnsupportedAlgorithm(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("failed to enqueue validation result: {0}")]
    Queue(StoreError),
}

pub type ValidationServiceResult<T> = Result<T, ValidationError>;

/// Validates uploaded blobs against their declared checksums and routes
/// the outcome: status metadata back onto the blob (best effort) and a
/// queue message downstream when the file is valid.
///
/// Stateless per invocation; collaborators are injected so the service
/// runs identically against real stores and in-memory fakes.
#[derive(Clone)]
pub struct ValidationService {
    metadata_store: Arc<dyn ObjectMetadataStore>,
    queue: Arc<dyn ValidationQueue>,
}

impl ValidationService {
    pub fn new(metadata_store: Arc<dyn ObjectMetadataStore>, queue: Arc<dyn ValidationQueue>) -> Self {
        Self {
            metadata_store,
            queue,
        }
    }

    /// Validate one blob's content against its declared checksum.
    ///
    /// The declared digest and optional algorithm come from `metadata`;
    /// the actual digest is recomputed over `stream` in bounded chunks,
    /// leaving the stream positioned back at the start. The resulting
    /// status is merged into the blob's metadata best-effort: a failed
    /// merge is logged but never changes the verdict. Valid results are
    /// enqueued for the downstream transfer process; invalid results
    /// are only logged (quarantine is an external concern).
    ///
    /// Re-running on unchanged content and metadata yields the same
    /// verdict and overwrites, rather than duplicates, the status keys.
    pub async fn validate<R>(
        &self,
        blob_name: &str,
        metadata: &HashMap<String, String>,
        stream: &mut R,
    ) -> ValidationServiceResult<ValidationResult>
    where
        R: AsyncRead + AsyncSeek + Unpin,
    {
        for key in REQUIRED_METADATA_KEYS {
            if metadata.get(key).map(String::as_str).unwrap_or("").is_empty() {
                return Err(ValidationError::MissingMetadata(key));
            }
        }
        let vessel_id = &metadata["vesselId"];
        let timestamp = &metadata["timestamp"];
        let declared_checksum = &metadata["checksum"];

        let algorithm = match metadata.get("checksumAlgorithm") {
            Some(name) => name
                .parse::<ChecksumAlgorithm>()
                .map_err(|err| ValidationError::UnsupportedAlgorithm(err.0))?,
            None => ChecksumAlgorithm::default(),
        };

        let actual_checksum = checksum::digest_stream(stream, algorithm).await?;
        let is_valid = declared_checksum.eq_ignore_ascii_case(&actual_checksum);

        let result = ValidationResult {
            blob_name: blob_name.to_string(),
            vessel_id: vessel_id.clone(),
            timestamp: timestamp.clone(),
            is_valid,
            validation_timestamp: Utc::now(),
            error_message: (!is_valid).then(|| CHECKSUM_FAILED_MESSAGE.to_string()),
        };

        // Best-effort status transition; the computed result stays
        // authoritative even if the metadata store is unavailable.
        let status_updates = HashMap::from([
            (
                "validationStatus".to_string(),
                if is_valid { "valid" } else { "invalid" }.to_string(),
            ),
            (
                "validationTimestamp".to_string(),
                result.validation_timestamp.to_rfc3339(),
            ),
        ]);
        if let Err(err) = self
            .metadata_store
            .merge_metadata(blob_name, &status_updates)
            .await
        {
            warn!(blob_name, %vessel_id, %err, "failed to update blob metadata");
        }

        if is_valid {
            info!(blob_name, %vessel_id, "blob passed validation, enqueueing for processing");
            let message = serde_json::to_string(&result).map_err(io::Error::other)?;
            self.queue
                .enqueue(&message)
                .await
                .map_err(ValidationError::Queue)?;
        } else {
            error!(
                blob_name,
                %vessel_id,
                expected = %declared_checksum,
                actual = %actual_checksum,
                %algorithm,
                "blob failed checksum validation"
            );
        }

        Ok(result)
    }
}
