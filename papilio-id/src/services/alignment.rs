//! Startup check that the classifier's label space lines up with the metadata
//!
//! Label index N must point at metadata row N with the same name (ignoring
//! case). Drift here means every request for the affected species will come
//! back unidentified, so it is reported loudly at startup. It does not stop
//! the service. Metadata rows no label points at are only noted.

use crate::classifier::LabelMap;
use crate::species::{SpeciesId, SpeciesStore};
use tracing::{info, warn};

/// A label whose metadata row carries a different name
#[derive(Debug, Clone, PartialEq)]
pub struct LabelConflict {
    pub class_index: usize,
    pub label: String,
    pub record_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct AlignmentReport {
    /// Number of labels checked
    pub checked: usize,
    /// Labels with no metadata row, as `(index, label)`
    pub missing: Vec<(usize, String)>,
    pub conflicts: Vec<LabelConflict>,
    /// Metadata rows with no class label, as `(id, name)`, sorted by id
    pub unlabelled: Vec<(SpeciesId, String)>,
}

impl AlignmentReport {
    pub fn is_aligned(&self) -> bool {
        self.missing.is_empty() && self.conflicts.is_empty()
    }

    pub fn log(&self) {
        for (id, name) in &self.unlabelled {
            info!("Species '{}' (id {}) has no class label and can never be predicted", name, id);
        }
        if self.is_aligned() {
            info!("✓ All {} class labels match species metadata", self.checked);
            return;
        }
        for (index, label) in &self.missing {
            warn!("Label '{}' (index {}) has no species metadata", label, index);
        }
        for conflict in &self.conflicts {
            warn!(
                "Label '{}' (index {}) does not match metadata name '{}'",
                conflict.label, conflict.class_index, conflict.record_name
            );
        }
        warn!(
            "{} of {} class labels are misaligned with species metadata",
            self.missing.len() + self.conflicts.len(),
            self.checked
        );
    }
}

pub fn check_alignment(labels: &LabelMap, store: &SpeciesStore) -> AlignmentReport {
    let mut report = AlignmentReport::default();

    for (index, label) in labels.iter() {
        report.checked += 1;
        match store.lookup_index(index) {
            None => report.missing.push((index, label.to_string())),
            Some(record) if !record.name_matches(label) => {
                report.conflicts.push(LabelConflict {
                    class_index: index,
                    label: label.to_string(),
                    record_name: record.name.clone(),
                })
            }
            Some(_) => {}
        }
    }

    report.unlabelled = store
        .iter()
        .filter(|record| labels.label(record.id as usize).is_none())
        .map(|record| (record.id, record.name.clone()))
        .collect();
    report.unlabelled.sort_by_key(|(id, _)| *id);

    report
}
