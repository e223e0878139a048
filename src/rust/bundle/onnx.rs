use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2};
use ort::session::Session;
use ort::value::Tensor;
use serde::{Deserialize, Serialize};

use super::error::{BundleError, PredictionError};
use super::model::{ClassModel, Posterior};
use crate::runtime::{load_session, RuntimeConfig};

/// Manifest entry pointing at a converted classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnnxSpec {
    pub path: PathBuf,
    pub n_classes: usize,
}

/// A classifier exported to ONNX and executed with ONNX Runtime.
///
/// The graph is expected to take one float tensor `[1, n_features]` and to
/// produce a label output plus a `[1, n_classes]` probability tensor (the
/// export must not wrap probabilities in a zipmap).
#[derive(Debug)]
pub struct OnnxClassifier {
    model_path: PathBuf,
    session: Session,
    input_name: String,
    probability_output: usize,
    n_classes: usize,
}

impl OnnxClassifier {
    /// Loads the graph and locates its input and probability output.
    pub fn load(path: &Path, n_classes: usize, config: &RuntimeConfig) -> Result<Self, BundleError> {
        if !path.exists() {
            return Err(BundleError::Validation(format!("ONNX model not found: {}", path.display())));
        }

        let session = load_session(path, config)?;
        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| BundleError::Validation("ONNX model has no inputs".into()))?;
        if session.outputs.is_empty() {
            return Err(BundleError::Validation("ONNX model has no outputs".into()));
        }
        let probability_output = session
            .outputs
            .iter()
            .position(|output| output.name.contains("probab"))
            .unwrap_or(session.outputs.len() - 1);

        log::info!(
            "Loaded ONNX classifier from {:?} (input '{}', probabilities at output {})",
            path,
            input_name,
            probability_output
        );

        Ok(Self {
            model_path: path.to_path_buf(),
            session,
            input_name,
            probability_output,
            n_classes,
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl ClassModel for OnnxClassifier {
    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn n_features(&self) -> Option<usize> {
        None
    }

    fn predict_with_proba(&self, row: &[f32]) -> Result<Posterior, PredictionError> {
        let input_array = Array2::from_shape_vec((1, row.len()), row.to_vec())
            .map_err(|e| PredictionError::ModelError(format!("Failed to create input array: {}", e)))?;
        let input_dyn = input_array.into_dyn();
        let input = input_dyn.as_standard_layout();

        let mut input_tensors = HashMap::new();
        input_tensors.insert(
            self.input_name.as_str(),
            Tensor::from_array(&input)
                .map_err(|e| PredictionError::ModelError(format!("Failed to create input tensor: {}", e)))?,
        );

        let outputs = self
            .session
            .run(input_tensors)
            .map_err(|e| PredictionError::ModelError(format!("Failed to run model: {}", e)))?;
        let proba = outputs[self.probability_output]
            .try_extract_tensor::<f32>()
            .map_err(|e| PredictionError::ModelError(format!("Failed to extract probabilities: {}", e)))?;

        let probabilities = Array1::from_iter(proba.iter().copied());
        if probabilities.len() != self.n_classes {
            return Err(PredictionError::ModelError(format!(
                "Expected {} class probabilities, model returned {}",
                self.n_classes,
                probabilities.len()
            )));
        }

        Posterior::from_probabilities(probabilities)
    }
}
