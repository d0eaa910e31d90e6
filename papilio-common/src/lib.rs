//! # Papilio Common Library
//!
//! Shared code for the Papilio services:
//! - Error and result types
//! - Root folder resolution and TOML loading
//! - Tracing subscriber setup

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
