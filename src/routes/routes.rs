//! Defines routes for the validation and audit-certificate pipeline.
//!
//! ## Structure
//! - **Validation trigger**
//!   - `POST   /v1/validate/{*blob_name}` — validate an uploaded blob (body = object bytes)
//!
//! - **Audit certificates**
//!   - `POST   /v1/certificates` — issue a deletion-audit certificate
//!   - `GET    /v1/certificates/{vessel_id}` — list certificates for one vessel
//!
//! The wildcard `*blob_name` allows hierarchical names like
//! `usvdata/vesselA/2024-01-01.bin`.

use crate::{
    handlers::{
        certificate_handlers::{generate_certificate, list_certificates},
        health_handlers::{healthz, readyz},
        validation_handlers::validate_blob,
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build and return the router for the full pipeline surface.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // validation trigger
        .route("/v1/validate/{*blob_name}", post(validate_blob))
        // audit certificates
        .route("/v1/certificates", post(generate_certificate))
        .route("/v1/certificates/{vessel_id}", get(list_certificates))
}
