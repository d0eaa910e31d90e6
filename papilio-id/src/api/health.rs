//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::{AppState, ServiceStatus};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" or "unavailable"
    pub status: String,
    /// Module name ("papilio-id")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Species records loaded
    pub species: usize,
    /// Class labels known to the classifier
    pub classes: usize,
    /// Startup failure, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;

    let (status, species, classes, last_error) = match &state.service {
        ServiceStatus::Ready(identifier) => (
            "ok",
            identifier.store().len(),
            identifier.classifier().labels().len(),
            None,
        ),
        ServiceStatus::Unavailable(reason) => ("unavailable", 0, 0, Some(reason.clone())),
    };

    Json(HealthResponse {
        status: status.to_string(),
        module: crate::config::MODULE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        species,
        classes,
        last_error,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
