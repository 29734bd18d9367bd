//! Validation outcome for a single uploaded survey-data object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of one checksum-validation attempt on an uploaded blob.
///
/// Produced exactly once per validation invocation. Instances with
/// `is_valid = true` are the only ones forwarded to the downstream
/// processing queue; invalid results are logged and dropped here.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Full hierarchical name of the validated blob (`{vesselId}/{path}`).
    pub blob_name: String,

    /// Vessel that produced the data, from the blob's upload metadata.
    pub vessel_id: String,

    /// Capture timestamp declared by the uploader (ISO-8601).
    pub timestamp: String,

    /// Whether the recomputed digest matched the declared checksum.
    pub is_valid: bool,

    /// When this validation attempt ran (UTC).
    pub validation_timestamp: DateTime<Utc>,

    /// Populated only when validation failed.
    pub error_message: Option<String>,
}
