//! Species metadata: record type and the in-memory store

pub mod record;
pub mod store;

pub use record::{SpeciesId, SpeciesRecord, Wingspan, NOT_AVAILABLE};
pub use store::{SpeciesStore, StoreError};
