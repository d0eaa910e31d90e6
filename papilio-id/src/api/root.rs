//! Service banner

use axum::{routing::get, Router};

use crate::AppState;

pub const BANNER: &str =
    "Butterfly Prediction API. Send a POST request to /predict with an image file.";

/// GET /
pub async fn index() -> &'static str {
    BANNER
}

pub fn root_routes() -> Router<AppState> {
    Router::new().route("/", get(index))
}
