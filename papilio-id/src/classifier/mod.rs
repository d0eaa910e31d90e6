//! Image classifier
//!
//! Turns an image into a [`Prediction`]: preprocess, run the model, take the
//! arg-max of the probability vector and map it to a label.
//!
//! The model itself sits behind [`ClassifierModel`] so the decision logic
//! is independent of the inference backend. Production uses [`OnnxModel`].

pub mod labels;
pub mod onnx;
pub mod preprocess;

pub use labels::LabelMap;
pub use onnx::OnnxModel;
pub use preprocess::{open_image, ImageTensor, Preprocessor, TensorLayout};

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load label mapping {path}: {reason}")]
    Labels { path: PathBuf, reason: String },

    #[error("Model error: {0}")]
    Model(String),

    #[error("Model produced no scores")]
    EmptyOutput,

    #[error("Model output index {0} has no label")]
    UnknownClass(usize),
}

/// Inference backend: one preprocessed batch in, one score per class out
pub trait ClassifierModel: Send + Sync {
    fn scores(&self, input: ImageTensor) -> Result<Vec<f32>, ClassifierError>;

    /// Number of classes the model emits, when known ahead of time
    fn output_classes(&self) -> Option<usize> {
        None
    }
}

/// How to read the model's raw output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputActivation {
    /// Output already ends in softmax
    #[default]
    Probabilities,
    /// Unnormalised scores; softmax applied here
    Logits,
}

/// Top-1 classification of one image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub class_index: usize,
    pub label: String,
    /// Top-1 probability as a percentage in [0, 100]
    pub confidence: f64,
}

/// Index and value of the largest score; the first one wins ties, NaN never wins
pub fn arg_max(scores: &[f32]) -> Option<(usize, f32)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .fold(None, |best, (i, v)| match best {
            Some((_, top)) if v <= top => best,
            _ => Some((i, v)),
        })
}

/// Numerically stable softmax
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum == 0.0 || !sum.is_finite() {
        return exps;
    }
    exps.into_iter().map(|v| v / sum).collect()
}

pub struct ImageClassifier {
    model: Box<dyn ClassifierModel>,
    labels: LabelMap,
    preprocessor: Preprocessor,
    activation: OutputActivation,
}

impl ImageClassifier {
    pub fn new(
        model: Box<dyn ClassifierModel>,
        labels: LabelMap,
        preprocessor: Preprocessor,
        activation: OutputActivation,
    ) -> Self {
        if let Some(classes) = model.output_classes() {
            if classes != labels.len() {
                warn!(
                    "Model emits {} classes but label mapping has {} entries",
                    classes,
                    labels.len()
                );
            }
        }
        Self {
            model,
            labels,
            preprocessor,
            activation,
        }
    }

    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    /// Decode the file at `path` and classify it
    pub fn classify_path(&self, path: &Path) -> Result<Prediction, ClassifierError> {
        let image = open_image(path)?;
        self.classify(&image)
    }

    pub fn classify(&self, image: &DynamicImage) -> Result<Prediction, ClassifierError> {
        let input = self.preprocessor.prepare(image);
        let raw = self.model.scores(input)?;
        let probabilities = match self.activation {
            OutputActivation::Probabilities => raw,
            OutputActivation::Logits => softmax(&raw),
        };

        let (class_index, top) = arg_max(&probabilities).ok_or(ClassifierError::EmptyOutput)?;
        let label = self
            .labels
            .label(class_index)
            .ok_or(ClassifierError::UnknownClass(class_index))?
            .to_string();
        let confidence = (f64::from(top) * 100.0).clamp(0.0, 100.0);

        debug!(
            "Classified as '{}' (index {}) with {:.2}% confidence",
            label, class_index, confidence
        );

        Ok(Prediction {
            class_index,
            label,
            confidence,
        })
    }
}
