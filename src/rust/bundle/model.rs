use std::fmt::Debug;

use ndarray::Array1;

use super::error::PredictionError;

/// The outcome of one classifier call: the predicted class index together
/// with the full posterior distribution it was taken from.
#[derive(Debug, Clone, PartialEq)]
pub struct Posterior {
    pub class_index: usize,
    pub probabilities: Array1<f32>,
}

impl Posterior {
    /// Builds a posterior whose class is the argmax of `probabilities`.
    ///
    /// Ties go to the lowest class index. Non-finite entries are rejected.
    pub fn from_probabilities(probabilities: Array1<f32>) -> Result<Self, PredictionError> {
        if let Some(i) = probabilities.iter().position(|p| !p.is_finite()) {
            return Err(PredictionError::ModelError(format!(
                "Probability for class {} is not finite: {}",
                i, probabilities[i]
            )));
        }
        let class_index = argmax(&probabilities)
            .ok_or_else(|| PredictionError::ModelError("Empty probability vector".into()))?;
        Ok(Self { class_index, probabilities })
    }

    /// The largest class probability
    pub fn max_probability(&self) -> f32 {
        self.probabilities.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }
}

/// A pre-trained classifier over label-encoded categorical features.
///
/// Implementations are loaded once and only read afterwards, so they must be
/// `Send + Sync` to sit behind the shared bundle.
pub trait ClassModel: Debug + Send + Sync {
    /// Number of classes the model distinguishes
    fn n_classes(&self) -> usize;

    /// Number of input features the model was trained on, when known
    fn n_features(&self) -> Option<usize>;

    /// Runs predict and predict_proba for a single encoded row in one call.
    ///
    /// `row` holds the encoded feature values in the bundle's feature order.
    fn predict_with_proba(&self, row: &[f32]) -> Result<Posterior, PredictionError>;

    /// Class probabilities for a single encoded row.
    fn predict_proba(&self, row: &[f32]) -> Result<Array1<f32>, PredictionError> {
        self.predict_with_proba(row).map(|posterior| posterior.probabilities)
    }

    /// Predicted class index for a single encoded row.
    fn predict(&self, row: &[f32]) -> Result<usize, PredictionError> {
        self.predict_with_proba(row).map(|posterior| posterior.class_index)
    }
}

pub(crate) fn argmax(values: &Array1<f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
