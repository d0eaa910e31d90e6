//! Butterfly identification endpoint
//!
//! POST /predict, multipart form with the photo in field `file`.
//!
//! | Outcome                                         | Status |
//! |-------------------------------------------------|--------|
//! | Identified                                      | 200    |
//! | No `file` part, empty filename, bad extension   | 400    |
//! | Undecodable image or malformed multipart        | 400    |
//! | Unknown species or label/metadata mismatch      | 404    |
//! | Upload above the body limit                     | 413    |
//! | Identifier failed to start                      | 503    |

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    routing::post,
    Json, Router,
};
use tracing::{debug, info};

use crate::services::{allowed_file, ButterflyReport, Identification, ScratchFile};
use crate::{ApiError, ApiResult, AppState};

const FILE_FIELD: &str = "file";

const NOT_IDENTIFIED: &str = "Could not identify butterfly or retrieve its details. \
     This could be due to low prediction confidence, mismatch in names, or missing data.";

struct Upload {
    filename: String,
    bytes: Vec<u8>,
}

/// Pull the `file` part out of the form, validating its filename
async fn read_upload(multipart: &mut Multipart) -> ApiResult<Upload> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(ApiError::BadRequest("No selected file".to_string()));
        }
        if !allowed_file(&filename) {
            return Err(ApiError::BadRequest(
                "File type not allowed. Allowed types: png, jpg, jpeg, gif.".to_string(),
            ));
        }

        let bytes = field.bytes().await?.to_vec();
        return Ok(Upload { filename, bytes });
    }

    Err(ApiError::BadRequest("No file part in the request".to_string()))
}

/// POST /predict
pub async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ButterflyReport>> {
    // Unavailability is reported before anything about the request itself
    let identifier = state.identifier()?;
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let upload = read_upload(&mut multipart).await?;
    debug!("Received upload '{}' ({} bytes)", upload.filename, upload.bytes.len());

    let scratch = ScratchFile::create(&state.uploads_dir, &upload.filename, &upload.bytes).await?;
    let path = scratch.path().to_path_buf();

    let outcome = tokio::task::spawn_blocking(move || identifier.identify_path(&path))
        .await
        .map_err(|e| ApiError::Internal(format!("Identification task failed: {}", e)))??;

    // Removed here on success; `?` above drops it on every other path
    drop(scratch);

    match outcome {
        Identification::Identified(report) => Ok(Json(report)),
        Identification::Unidentified(reason) => {
            info!("Upload '{}' not identified: {}", upload.filename, reason);
            Err(ApiError::NotFound(NOT_IDENTIFIED.to_string()))
        }
    }
}

pub fn predict_routes() -> Router<AppState> {
    Router::new().route("/predict", post(predict))
}

