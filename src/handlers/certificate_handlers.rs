//! HTTP handlers for deletion-audit certificates.

use crate::{
    errors::AppError,
    models::certificate::{AuditCertificate, CertificateRequest},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
};
use tracing::info;

/// POST `/v1/certificates` — issue a deletion-audit certificate.
///
/// Called by the external transfer orchestrator after archiving and
/// deleting a blob. 200 with the full certificate on success, 400 when
/// required fields are missing. A failed write to the audit store is
/// logged inside the service and still answered 200 — issuance must
/// never block on audit-store availability.
pub async fn generate_certificate(
    State(state): State<AppState>,
    Json(request): Json<CertificateRequest>,
) -> Result<Json<AuditCertificate>, AppError> {
    info!(blob_name = %request.blob_name, "certificate generation requested");
    let certificate = state.certificates.issue(&request).await?;
    Ok(Json(certificate))
}

/// GET `/v1/certificates/{vessel_id}` — per-vessel audit query.
pub async fn list_certificates(
    State(state): State<AppState>,
    Path(vessel_id): Path<String>,
) -> Result<Json<Vec<AuditCertificate>>, AppError> {
    let certificates = state.certificates.list_for_vessel(&vessel_id).await?;
    Ok(Json(certificates))
}
