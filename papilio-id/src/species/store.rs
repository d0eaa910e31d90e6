//! In-memory species metadata store
//!
//! Loaded once from CSV at startup; read-only afterwards, so it can be shared
//! across request handlers without locking.

use super::record::{SpeciesId, SpeciesRecord, SpeciesRow};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while loading the metadata table
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read species metadata: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid species row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("Duplicate species id {0}")]
    DuplicateId(SpeciesId),
}

/// Point lookups of [`SpeciesRecord`] by id
#[derive(Debug, Clone, Default)]
pub struct SpeciesStore {
    records: HashMap<SpeciesId, SpeciesRecord>,
}

impl SpeciesStore {
    /// Load the metadata table from a CSV file with a header row
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;
        let store = Self::from_csv(reader)?;
        info!("Loaded {} species records from {}", store.len(), path.display());
        Ok(store)
    }

    /// Load from any CSV source (header row required)
    pub fn from_reader<R: Read>(source: R) -> Result<Self, StoreError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self::from_csv(reader)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, StoreError> {
        let mut records = Vec::new();
        for (index, row) in reader.deserialize::<SpeciesRow>().enumerate() {
            // Data rows are numbered from 1, after the header
            let row_number = index + 1;
            let record = row?
                .into_record()
                .map_err(|reason| StoreError::InvalidRow {
                    row: row_number,
                    reason,
                })?;
            records.push(record);
        }
        Self::from_records(records)
    }

    /// Build a store from already-parsed records
    pub fn from_records(
        records: impl IntoIterator<Item = SpeciesRecord>,
    ) -> Result<Self, StoreError> {
        let mut map = HashMap::new();
        for record in records {
            let id = record.id;
            if map.insert(id, record).is_some() {
                return Err(StoreError::DuplicateId(id));
            }
        }
        Ok(Self { records: map })
    }

    /// Record for `id`, or `None` when the id is not in the table
    pub fn lookup(&self, id: SpeciesId) -> Option<&SpeciesRecord> {
        let record = self.records.get(&id);
        if record.is_none() {
            debug!("Species id {} not found", id);
        }
        record
    }

    /// Lookup by classifier output index; out-of-range indices are not found
    pub fn lookup_index(&self, index: usize) -> Option<&SpeciesRecord> {
        SpeciesId::try_from(index).ok().and_then(|id| self.lookup(id))
    }

    /// Lookup by textual id; unparseable input is not found
    pub fn lookup_str(&self, id: &str) -> Option<&SpeciesRecord> {
        id.trim()
            .parse::<SpeciesId>()
            .ok()
            .and_then(|id| self.lookup(id))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &SpeciesRecord> {
        self.records.values()
    }
}
