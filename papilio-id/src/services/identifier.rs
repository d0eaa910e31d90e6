//! Prediction orchestrator
//!
//! 1. Classify the image
//! 2. Look up species metadata at the predicted index
//! 3. Cross-check the predicted label against the metadata name
//! 4. Embed the species reference image
//! 5. Assemble the [`ButterflyReport`]
//!
//! A missing metadata row and a label/name mismatch both come back as
//! [`Identification::Unidentified`]; callers that only care about the
//! report can use [`Identification::into_report`]. Decoding and inference
//! failures are errors.

use crate::classifier::{ClassifierError, ImageClassifier, Prediction};
use crate::services::species_images::SpeciesImages;
use crate::species::{SpeciesRecord, SpeciesStore};
use image::DynamicImage;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Identification result returned to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButterflyReport {
    #[serde(flatten)]
    pub species: SpeciesRecord,
    /// Classifier confidence, percent
    pub confidence: f64,
    /// Species reference image as a data URI; `null` when the asset is missing
    pub image: Option<String>,
}

/// Why no report was produced
#[derive(Debug, Clone, PartialEq)]
pub enum Unidentified {
    /// No metadata row at the predicted index
    UnknownSpecies { prediction: Prediction },
    /// Metadata row exists but names a different species
    LabelMismatch {
        prediction: Prediction,
        record_name: String,
    },
}

impl std::fmt::Display for Unidentified {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unidentified::UnknownSpecies { prediction } => write!(
                f,
                "no species metadata for predicted index {} ('{}')",
                prediction.class_index, prediction.label
            ),
            Unidentified::LabelMismatch {
                prediction,
                record_name,
            } => write!(
                f,
                "predicted label '{}' does not match metadata name '{}' for index {}",
                prediction.label, record_name, prediction.class_index
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Identification {
    Identified(ButterflyReport),
    Unidentified(Unidentified),
}

impl Identification {
    pub fn into_report(self) -> Option<ButterflyReport> {
        match self {
            Identification::Identified(report) => Some(report),
            Identification::Unidentified(_) => None,
        }
    }
}

/// Classifier, metadata and image assets, built once and shared read-only
pub struct Identifier {
    classifier: ImageClassifier,
    store: SpeciesStore,
    images: SpeciesImages,
}

impl Identifier {
    pub fn new(classifier: ImageClassifier, store: SpeciesStore, images: SpeciesImages) -> Self {
        Self {
            classifier,
            store,
            images,
        }
    }

    pub fn classifier(&self) -> &ImageClassifier {
        &self.classifier
    }

    pub fn store(&self) -> &SpeciesStore {
        &self.store
    }

    /// Identify the image stored at `path`
    pub fn identify_path(&self, path: &Path) -> Result<Identification, ClassifierError> {
        let prediction = self.classifier.classify_path(path)?;
        Ok(self.resolve(prediction))
    }

    pub fn identify(&self, image: &DynamicImage) -> Result<Identification, ClassifierError> {
        let prediction = self.classifier.classify(image)?;
        Ok(self.resolve(prediction))
    }

    fn resolve(&self, prediction: Prediction) -> Identification {
        let record = match self.store.lookup_index(prediction.class_index) {
            Some(record) => record,
            None => {
                let reason = Unidentified::UnknownSpecies { prediction };
                warn!("Could not identify: {}", reason);
                return Identification::Unidentified(reason);
            }
        };

        if !record.name_matches(&prediction.label) {
            let reason = Unidentified::LabelMismatch {
                record_name: record.name.clone(),
                prediction,
            };
            warn!("Could not identify: {}", reason);
            return Identification::Unidentified(reason);
        }

        info!(
            "Identified {} (id {}) with {:.2}% confidence",
            record.name, record.id, prediction.confidence
        );

        Identification::Identified(ButterflyReport {
            species: record.clone(),
            confidence: prediction.confidence,
            image: self.images.data_uri(record.id),
        })
    }
}
