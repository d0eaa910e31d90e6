//! HTTP API handlers for papilio-id

pub mod health;
pub mod predict;
pub mod root;

pub use health::health_routes;
pub use predict::predict_routes;
pub use root::root_routes;
