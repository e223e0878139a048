use std::collections::HashMap;

use log::info;

use super::encoder::LabelEncoder;
use super::error::BundleError;
use super::model::ClassModel;
use super::{ModelBundle, TARGET_ENCODER};

/// A builder for assembling a [`ModelBundle`] with a fluent interface.
///
/// `build` checks that the pieces agree with each other: every feature has an
/// encoder, the target encoder exists and matches the classifier's class count.
#[derive(Default, Debug)]
pub struct BundleBuilder {
    features: Vec<String>,
    encoders: HashMap<String, LabelEncoder>,
    classifier: Option<Box<dyn ClassModel>>,
}

impl BundleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ordered feature list the classifier was trained with
    ///
    /// # Example
    /// ```
    /// use mushroom_form::BundleBuilder;
    ///
    /// let builder = BundleBuilder::new()
    ///     .with_features(vec!["odor", "gill-size"]);
    /// ```
    pub fn with_features(mut self, features: Vec<impl Into<String>>) -> Self {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    /// Registers the fitted encoder for a feature (or for the `class` target).
    ///
    /// # Errors
    /// `BundleError::Validation` if the name is empty or already registered.
    pub fn add_encoder(mut self, name: impl Into<String>, encoder: LabelEncoder) -> Result<Self, BundleError> {
        let name = name.into();
        if name.is_empty() {
            return Err(BundleError::Validation("Encoder name cannot be empty".into()));
        }
        if self.encoders.contains_key(&name) {
            return Err(BundleError::Validation(format!("Duplicate encoder for '{}'", name)));
        }
        self.encoders.insert(name, encoder);
        Ok(self)
    }

    pub fn with_classifier(mut self, classifier: impl ClassModel + 'static) -> Self {
        self.classifier = Some(Box::new(classifier));
        self
    }

    pub fn build(self) -> Result<ModelBundle, BundleError> {
        let classifier = self
            .classifier
            .ok_or_else(|| BundleError::Validation("No classifier set".into()))?;

        if self.features.is_empty() {
            return Err(BundleError::Validation("At least one feature must be listed".into()));
        }
        if let Some(pos) = self.features.iter().position(|f| f == TARGET_ENCODER) {
            return Err(BundleError::Validation(format!(
                "Feature {} is named '{}', which is reserved for the target encoder",
                pos + 1,
                TARGET_ENCODER
            )));
        }
        for (i, feature) in self.features.iter().enumerate() {
            if self.features[..i].contains(feature) {
                return Err(BundleError::Validation(format!("Feature '{}' is listed twice", feature)));
            }
            if !self.encoders.contains_key(feature) {
                return Err(BundleError::Validation(format!("No encoder for feature '{}'", feature)));
            }
        }

        for (name, encoder) in &self.encoders {
            encoder
                .validate()
                .map_err(|e| BundleError::Validation(format!("Encoder '{}': {}", name, e)))?;
        }

        let target = self
            .encoders
            .get(TARGET_ENCODER)
            .ok_or_else(|| BundleError::Validation(format!("Missing '{}' target encoder", TARGET_ENCODER)))?;
        if target.len() != classifier.n_classes() {
            return Err(BundleError::Validation(format!(
                "Classifier predicts {} classes but the target encoder has {}",
                classifier.n_classes(),
                target.len()
            )));
        }
        if let Some(n) = classifier.n_features() {
            if n != self.features.len() {
                return Err(BundleError::Validation(format!(
                    "Classifier expects {} features but {} are listed",
                    n,
                    self.features.len()
                )));
            }
        }

        info!(
            "Model bundle ready: {} features, {} classes",
            self.features.len(),
            target.len()
        );

        Ok(ModelBundle {
            classifier,
            encoders: self.encoders,
            features: self.features,
            source: None,
        })
    }
}
