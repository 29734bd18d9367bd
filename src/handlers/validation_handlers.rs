//! HTTP trigger for survey-data validation.
//!
//! The request body is the object's byte stream. It is spooled to a
//! temp file under the configured spool directory so hashing stays
//! memory-bounded and the stream is seekable, then the blob's metadata
//! is fetched and the validation service runs.

use crate::{
    errors::AppError, services::validation_service::ValidationError, state::AppState,
};
use axum::{
    body::Body,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use std::io;
use std::path::PathBuf;
use tokio::{
    fs::{self, OpenOptions},
    io::AsyncWriteExt,
};
use tracing::{error, info};
use uuid::Uuid;

/// POST `/v1/validate/{*blob_name}` — validate one uploaded blob.
///
/// Responses mirror the original trigger contract: the validation
/// attempt itself carries no payload, so a completed attempt (either
/// verdict) is 204. Missing or malformed required metadata is a 400;
/// the blob can never validate without a corrected re-upload. Failures
/// after the byte stream is captured are logged with blob context and
/// still end the invocation quietly.
pub async fn validate_blob(
    State(state): State<AppState>,
    Path(blob_name): Path<String>,
    body: Body,
) -> Result<Response, AppError> {
    info!(%blob_name, "validation triggered");

    let spool_path = spool_body(&state.spool_dir, body).await;
    let (spool_path, mut file) = match spool_path {
        Ok(pair) => pair,
        Err(err) => {
            return Err(AppError::internal(format!(
                "failed to capture request body: {err}"
            )));
        }
    };

    let outcome = async {
        let metadata = state
            .metadata_store
            .get_metadata(&blob_name)
            .await
            .map_err(|err| ValidationError::Io(io::Error::other(err)))?;
        state.validation.validate(&blob_name, &metadata, &mut file).await
    }
    .await;

    drop(file);
    if let Err(err) = fs::remove_file(&spool_path).await {
        error!(path = %spool_path.display(), %err, "failed to remove spool file");
    }

    match outcome {
        Ok(_) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(err @ ValidationError::MissingMetadata(_))
        | Err(err @ ValidationError::UnsupportedAlgorithm(_)) => {
            Err(AppError::bad_request(err.to_string()))
        }
        Err(err) => {
            // Unexpected failures end the invocation without propagating;
            // the log line is the operational signal.
            error!(%blob_name, %err, "error validating blob");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
    }
}

/// Stream the request body into a fresh spool file opened read+write,
/// returning the path and a handle positioned at end-of-file.
async fn spool_body(
    spool_dir: &std::path::Path,
    body: Body,
) -> io::Result<(PathBuf, tokio::fs::File)> {
    fs::create_dir_all(spool_dir).await?;
    let path = spool_dir.join(format!(".spool-{}", Uuid::new_v4()));
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(&path)
        .await?;

    let mut stream = body.into_data_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => {
                let _ = fs::remove_file(&path).await;
                return Err(io::Error::other(err));
            }
        };
        if let Err(err) = file.write_all(&chunk).await {
            let _ = fs::remove_file(&path).await;
            return Err(err);
        }
    }
    if let Err(err) = file.flush().await {
        let _ = fs::remove_file(&path).await;
        return Err(err);
    }

    Ok((path, file))
}
