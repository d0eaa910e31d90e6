//! Label mapping between class names and model output indices
//!
//! Persisted as a JSON object `{"ADONIS": 0, "AFRICAN GIANT SWALLOWTAIL": 1, ...}`
//! (the `class_indices` dictionary written at training time). Loaded once
//! and inverted so both directions are cheap.

use super::ClassifierError;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::info;

/// Bidirectional class label mapping
#[derive(Debug, Clone, Default)]
pub struct LabelMap {
    by_index: BTreeMap<usize, String>,
    by_label: HashMap<String, usize>,
}

impl LabelMap {
    /// Load the mapping from a JSON file
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let fail = |reason: String| ClassifierError::Labels {
            path: path.to_path_buf(),
            reason,
        };
        let content = std::fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
        let labels = Self::from_json_str(&content).map_err(fail)?;
        info!("Loaded {} class labels from {}", labels.len(), path.display());
        Ok(labels)
    }

    /// Parse a `{label: index}` JSON object
    pub fn from_json_str(json: &str) -> Result<Self, String> {
        let raw: HashMap<String, usize> =
            serde_json::from_str(json).map_err(|e| format!("invalid label mapping: {}", e))?;
        Self::from_pairs(raw)
    }

    /// Build from `(label, index)` pairs; two labels on one index is an error
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, usize)>) -> Result<Self, String> {
        let mut by_index = BTreeMap::new();
        let mut by_label = HashMap::new();
        for (label, index) in pairs {
            if let Some(existing) = by_index.get(&index) {
                return Err(format!(
                    "index {} assigned to both '{}' and '{}'",
                    index, existing, label
                ));
            }
            if by_label.contains_key(&label) {
                return Err(format!("label '{}' listed twice", label));
            }
            by_index.insert(index, label.clone());
            by_label.insert(label, index);
        }
        if by_index.is_empty() {
            return Err("label mapping is empty".to_string());
        }
        Ok(Self { by_index, by_label })
    }

    /// Label at a model output index
    pub fn label(&self, index: usize) -> Option<&str> {
        self.by_index.get(&index).map(String::as_str)
    }

    /// Output index of a label (exact match)
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.by_label.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    /// `(index, label)` in ascending index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.by_index.iter().map(|(i, l)| (*i, l.as_str()))
    }
}
