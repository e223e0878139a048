//! The inference form service: resolves a selection against the bundle's
//! vocabularies, runs the classifier once and turns the result into a
//! localized verdict.

use std::sync::Arc;

use log::{debug, error, info, warn};
use serde::Serialize;

use crate::bundle::{ModelBundle, PredictionError};
use crate::form::{allows_unspecified, fill, parse_option, render_form, FormSpec, Locale, Selection};

/// Class label the target encoder uses for edible mushrooms
pub const EDIBLE_LABEL: &str = "e";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Edible,
    Poisonous,
}

impl Verdict {
    /// Any label other than the edible one is treated as poisonous.
    pub fn from_label(label: &str) -> Self {
        if label == EDIBLE_LABEL {
            Verdict::Edible
        } else {
            Verdict::Poisonous
        }
    }
}

/// A feature value after fallback substitution and encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedFeature {
    pub feature: String,
    pub code: String,
    pub index: usize,
    /// True when "not specified" was replaced by the first vocabulary entry
    pub defaulted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub verdict: Verdict,
    /// Decoded class label
    pub label: String,
    /// 100 × the largest class probability
    pub confidence: f32,
    pub probabilities: Vec<f32>,
    pub inputs: Vec<ResolvedFeature>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// A message block ready to be shown to the observer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub severity: Severity,
    pub title: String,
    pub detail: String,
}

impl Prediction {
    /// Edible renders as a success block, poisonous as an error block.
    pub fn message(&self, locale: Locale) -> Outcome {
        let text = locale.text();
        let (severity, title, icon) = match self.verdict {
            Verdict::Edible => (Severity::Success, text.edible, "💡"),
            Verdict::Poisonous => (Severity::Error, text.poisonous, "⚠️"),
        };
        Outcome {
            severity,
            title: title.to_string(),
            detail: format!("{} {}: {:.1}%", icon, text.confidence, self.confidence),
        }
    }
}

impl PredictionError {
    /// Localized, non-fatal warning for a failed prediction
    pub fn message(&self, locale: Locale) -> Outcome {
        let text = locale.text();
        let detail = match self {
            PredictionError::UnknownValue { feature, value } => {
                fill(text.unknown_value, &[("value", value.as_str()), ("feature", feature.as_str())])
            }
            PredictionError::MissingValue { feature } => fill(text.missing_value, &[("feature", feature.as_str())]),
            PredictionError::ModelError(msg) => fill(text.model_failure, &[("detail", msg.as_str())]),
        };
        Outcome {
            severity: Severity::Warning,
            title: text.prediction_failed.to_string(),
            detail,
        }
    }
}

/// Stateless request handling over a shared, read-only bundle.
///
/// Cloning is cheap; every clone points at the same bundle.
#[derive(Debug, Clone)]
pub struct InferenceService {
    bundle: Arc<ModelBundle>,
}

impl InferenceService {
    pub fn new(bundle: Arc<ModelBundle>) -> Self {
        Self { bundle }
    }

    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    /// Selectors for every bundle feature, options taken from the encoders
    pub fn render_form(&self, locale: Locale) -> FormSpec {
        render_form(&self.bundle, locale)
    }

    /// Resolves every bundle feature, in bundle order, to a vocabulary code.
    ///
    /// # Errors
    /// - `MissingValue` if a feature without a fallback was not selected
    /// - `UnknownValue` if a code is not in the feature's vocabulary
    pub fn resolve(&self, selection: &Selection) -> Result<Vec<ResolvedFeature>, PredictionError> {
        for extra in selection.features().filter(|f| !self.bundle.features().iter().any(|b| b == f)) {
            debug!("Ignoring selection for unknown feature '{}'", extra);
        }

        self.bundle
            .features()
            .iter()
            .map(|feature| {
                let encoder = self.bundle.encoder(feature).ok_or_else(|| {
                    PredictionError::ModelError(format!("No encoder for feature '{}'", feature))
                })?;

                let (code, defaulted) = match selection.get(feature).flatten() {
                    Some(value) => (parse_option(value).to_string(), false),
                    None if allows_unspecified(feature) => (encoder.first().to_string(), true),
                    None => {
                        return Err(PredictionError::MissingValue {
                            feature: feature.clone(),
                        })
                    }
                };

                let index = encoder.transform(&code).ok_or_else(|| PredictionError::UnknownValue {
                    feature: feature.clone(),
                    value: code.clone(),
                })?;

                Ok(ResolvedFeature {
                    feature: feature.clone(),
                    code,
                    index,
                    defaulted,
                })
            })
            .collect()
    }

    /// Runs the classifier on a selection and decodes its verdict.
    ///
    /// # Example
    /// ```
    /// # use std::sync::Arc;
    /// # use mushroom_form::{InferenceService, LabelEncoder, ModelBundle, Selection, TreeEnsemble, TreeNode, Verdict};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let bundle = ModelBundle::builder()
    ///     .with_features(vec!["odor"])
    ///     .add_encoder("odor", LabelEncoder::new(vec!["a", "f", "n"])?)?
    ///     .add_encoder("class", LabelEncoder::new(vec!["e", "p"])?)?
    ///     .with_classifier(TreeEnsemble::new(2, vec![TreeNode::split(
    ///         0, 0.5,
    ///         TreeNode::leaf(vec![9.0, 1.0]),
    ///         TreeNode::leaf(vec![0.0, 1.0]),
    ///     )]))
    ///     .build()?;
    /// let service = InferenceService::new(Arc::new(bundle));
    ///
    /// let prediction = service.predict(&Selection::new().with("odor", "a"))?;
    /// assert_eq!(prediction.verdict, Verdict::Edible);
    /// assert!((prediction.confidence - 90.0).abs() < 1e-3);
    /// # Ok(())
    /// # }
    /// ```
    pub fn predict(&self, selection: &Selection) -> Result<Prediction, PredictionError> {
        let inputs = self.resolve(selection)?;
        let row: Vec<f32> = inputs.iter().map(|r| r.index as f32).collect();
        debug!("Encoded feature vector: {:?}", row);

        let posterior = self.bundle.classifier().predict_with_proba(&row)?;
        let label = self
            .bundle
            .target_encoder()
            .inverse_transform(posterior.class_index)
            .ok_or_else(|| {
                PredictionError::ModelError(format!("Predicted class {} has no label", posterior.class_index))
            })?
            .to_string();
        let confidence = posterior.max_probability() * 100.0;
        if !confidence.is_finite() {
            return Err(PredictionError::ModelError("Classifier returned non-finite probabilities".into()));
        }

        let verdict = Verdict::from_label(&label);
        info!("Predicted '{}' ({:?}) with confidence {:.1}%", label, verdict, confidence);

        Ok(Prediction {
            verdict,
            label,
            confidence,
            probabilities: posterior.probabilities.to_vec(),
            inputs,
        })
    }

    /// Handles one form submission end to end. Failures become a warning
    /// block instead of an error, so the caller can keep serving.
    pub fn submit(&self, selection: &Selection, locale: Locale) -> Outcome {
        match self.predict(selection) {
            Ok(prediction) => prediction.message(locale),
            Err(e @ PredictionError::ModelError(_)) => {
                error!("Classifier failed: {}", e);
                e.message(locale)
            }
            Err(e) => {
                warn!("Prediction failed: {}", e);
                e.message(locale)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{LabelEncoder, TreeEnsemble, TreeNode};

    fn service() -> InferenceService {
        // odor 'p' is poisonous; otherwise the spore print decides
        let tree = TreeNode::split(
            0,
            0.5,
            TreeNode::split(1, 0.5, TreeNode::leaf(vec![3.0, 1.0]), TreeNode::leaf(vec![19.0, 1.0])),
            TreeNode::leaf(vec![0.0, 10.0]),
        );
        let bundle = ModelBundle::builder()
            .with_features(vec!["odor", "spore-print-color"])
            .add_encoder("odor", LabelEncoder::new(vec!["n", "p"]).unwrap())
            .unwrap()
            .add_encoder("spore-print-color", LabelEncoder::new(vec!["k", "w"]).unwrap())
            .unwrap()
            .add_encoder("class", LabelEncoder::new(vec!["e", "p"]).unwrap())
            .unwrap()
            .with_classifier(TreeEnsemble::new(2, vec![tree]))
            .build()
            .unwrap();
        InferenceService::new(Arc::new(bundle))
    }

    #[test]
    fn test_predict_edible() {
        let selection = Selection::new().with("odor", "n").with("spore-print-color", "w");
        let prediction = service().predict(&selection).unwrap();
        assert_eq!(prediction.verdict, Verdict::Edible);
        assert_eq!(prediction.label, "e");
        assert!((prediction.confidence - 95.0).abs() < 1e-3);
    }

    #[test]
    fn test_predict_poisonous_message() {
        let selection = Selection::new().with("odor", "p").with("spore-print-color", "k");
        let service = service();
        let prediction = service.predict(&selection).unwrap();
        assert_eq!(prediction.verdict, Verdict::Poisonous);

        let outcome = prediction.message(Locale::Ru);
        assert_eq!(outcome.severity, Severity::Error);
        assert_eq!(outcome.title, "☠️ Гриб ядовитый!");
        assert_eq!(outcome.detail, "⚠️ Уверенность модели: 100.0%");
    }

    #[test]
    fn test_unspecified_spore_print_uses_first_code() {
        let selection = Selection::new().with("odor", "n").with_unspecified("spore-print-color");
        let prediction = service().predict(&selection).unwrap();
        let spore = &prediction.inputs[1];
        assert_eq!(spore.code, "k");
        assert_eq!(spore.index, 0);
        assert!(spore.defaulted);
        assert!((prediction.confidence - 75.0).abs() < 1e-3);
    }

    #[test]
    fn test_omitted_spore_print_is_unspecified() {
        let prediction = service().predict(&Selection::new().with("odor", "n")).unwrap();
        assert!(prediction.inputs[1].defaulted);
    }

    #[test]
    fn test_unknown_value() {
        let selection = Selection::new().with("odor", "z").with("spore-print-color", "w");
        let err = service().predict(&selection).unwrap_err();
        assert_eq!(
            err,
            PredictionError::UnknownValue {
                feature: "odor".into(),
                value: "z".into()
            }
        );
        let outcome = err.message(Locale::En);
        assert_eq!(outcome.severity, Severity::Warning);
        assert_eq!(outcome.detail, "Unknown value 'z' for feature odor");
    }

    #[test]
    fn test_required_feature_cannot_be_unspecified() {
        let selection = Selection::new().with_unspecified("odor");
        assert!(matches!(
            service().predict(&selection),
            Err(PredictionError::MissingValue { .. })
        ));
    }

    #[test]
    fn test_submit_never_fails() {
        let outcome = service().submit(&Selection::new(), Locale::Ru);
        assert_eq!(outcome.severity, Severity::Warning);
        assert_eq!(outcome.title, "⚠️ Ошибка предсказания");
    }
}
