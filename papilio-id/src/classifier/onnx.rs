//! ONNX model backend executed with tract

use super::preprocess::ImageTensor;
use super::{ClassifierError, ClassifierModel};
use std::path::Path;
use tracing::info;
use tract_onnx::prelude::*;

type Plan = TypedRunnableModel<TypedModel>;

fn model_error(context: &str, err: impl std::fmt::Display) -> ClassifierError {
    ClassifierError::Model(format!("{}: {}", context, err))
}

/// Optimised, runnable ONNX graph with a fixed input shape
pub struct OnnxModel {
    plan: Plan,
    output_classes: Option<usize>,
}

impl OnnxModel {
    /// Load and optimise the model, pinning input 0 to `input_shape` (f32)
    pub fn load(path: &Path, input_shape: [usize; 4]) -> Result<Self, ClassifierError> {
        let shape: TVec<usize> = input_shape.iter().copied().collect();

        let model = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(|e| model_error(&format!("loading {}", path.display()), e))?
            .with_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), shape))
            .map_err(|e| model_error("setting input shape", e))?
            .into_optimized()
            .map_err(|e| model_error("optimising model", e))?;

        let output_classes = model
            .output_fact(0)
            .ok()
            .and_then(|fact| fact.shape.as_concrete().and_then(|dims| dims.last().copied()));

        let plan = model
            .into_runnable()
            .map_err(|e| model_error("building plan", e))?;

        info!(
            "Loaded ONNX model {} (input {:?}, {} output classes)",
            path.display(),
            input_shape,
            output_classes.map_or_else(|| "unknown".to_string(), |n| n.to_string())
        );

        Ok(Self {
            plan,
            output_classes,
        })
    }
}

impl ClassifierModel for OnnxModel {
    fn scores(&self, input: ImageTensor) -> Result<Vec<f32>, ClassifierError> {
        let outputs = self
            .plan
            .run(tvec!(input.into_tensor().into()))
            .map_err(|e| model_error("inference", e))?;
        let first = outputs.first().ok_or(ClassifierError::EmptyOutput)?;
        let view = first
            .to_array_view::<f32>()
            .map_err(|e| model_error("reading output", e))?;
        Ok(view.iter().copied().collect())
    }

    fn output_classes(&self) -> Option<usize> {
        self.output_classes
    }
}
