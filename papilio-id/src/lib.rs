//! papilio-id library interface
//!
//! Butterfly species identification: image classification cross-checked
//! against a species metadata table, served over HTTP.

pub mod api;
pub mod cli;
pub mod classifier;
pub mod config;
pub mod error;
pub mod services;
pub mod species;

pub use crate::error::{ApiError, ApiResult, StartupError};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use classifier::{ImageClassifier, LabelMap, OnnxModel, Preprocessor};
use config::Settings;
use services::{check_alignment, Identifier, SpeciesImages};
use species::SpeciesStore;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Whether the identifier came up at startup
#[derive(Clone)]
pub enum ServiceStatus {
    Ready(Arc<Identifier>),
    /// Startup failed; carries the reason for diagnostics
    Unavailable(String),
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: ServiceStatus,
    /// Scratch directory for uploads
    pub uploads_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(service: ServiceStatus, uploads_dir: PathBuf, max_upload_bytes: usize) -> Self {
        Self {
            service,
            uploads_dir,
            max_upload_bytes,
            startup_time: Utc::now(),
        }
    }

    /// State for a service that failed to start
    pub fn unavailable(reason: impl Into<String>, uploads_dir: PathBuf) -> Self {
        Self::new(
            ServiceStatus::Unavailable(reason.into()),
            uploads_dir,
            config::DEFAULT_MAX_UPLOAD_BYTES,
        )
    }

    /// The identifier, or 503 if startup failed
    pub fn identifier(&self) -> ApiResult<Arc<Identifier>> {
        match &self.service {
            ServiceStatus::Ready(identifier) => Ok(Arc::clone(identifier)),
            ServiceStatus::Unavailable(_) => Err(ApiError::ServiceUnavailable(
                "Prediction service not initialized. Server might be misconfigured.".to_string(),
            )),
        }
    }
}

/// Load label mapping, model, metadata and image location; check alignment
///
/// Any failure here is fatal for identification.
pub fn load_identifier(settings: &Settings) -> Result<Identifier, StartupError> {
    let labels = LabelMap::load(&settings.model.labels_path)?;
    let preprocessor = Preprocessor::new(
        settings.model.input_width,
        settings.model.input_height,
        settings.model.layout,
    );
    let model = OnnxModel::load(&settings.model.path, preprocessor.input_shape())?;
    let store = SpeciesStore::load(&settings.data.metadata_path)?;

    check_alignment(&labels, &store).log();

    let classifier = ImageClassifier::new(
        Box::new(model),
        labels,
        preprocessor,
        settings.model.activation,
    );
    let images = SpeciesImages::new(&settings.data.images_dir, &settings.data.image_extension);
    info!("Species images: {}", images.dir().display());

    Ok(Identifier::new(classifier, store, images))
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .merge(api::root_routes())
        .merge(api::predict_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
