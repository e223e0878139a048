//! The model bundle: a classifier, its fitted label encoders and the feature
//! order it was trained with.

use std::collections::HashMap;
use std::path::PathBuf;

mod builder;
mod encoder;
mod error;
mod forest;
mod manifest;
mod model;
#[cfg(feature = "onnx")]
mod onnx;

pub use builder::BundleBuilder;
pub use encoder::LabelEncoder;
pub use error::{BundleError, PredictionError};
pub use forest::{LeafNode, SplitNode, TreeEnsemble, TreeNode};
pub use manifest::{ClassifierSpec, LoadOptions, Manifest};
pub use model::{ClassModel, Posterior};
#[cfg(feature = "onnx")]
pub use onnx::{OnnxClassifier, OnnxSpec};

/// Name of the encoder that maps class indices back to class labels
pub const TARGET_ENCODER: &str = "class";

/// Summary of a loaded bundle
#[derive(Debug, Clone)]
pub struct BundleInfo {
    /// Manifest the bundle was loaded from, if any
    pub source: Option<PathBuf>,
    /// Features in the order the classifier expects them
    pub features: Vec<String>,
    /// Vocabulary size per feature, in feature order
    pub vocabulary_sizes: Vec<usize>,
    pub num_classes: usize,
    pub class_labels: Vec<String>,
}

/// A loaded classifier together with its encoders and feature order.
///
/// Built once at startup and only read afterwards; share it with `Arc`.
#[derive(Debug)]
pub struct ModelBundle {
    classifier: Box<dyn ClassModel>,
    encoders: HashMap<String, LabelEncoder>,
    features: Vec<String>,
    source: Option<PathBuf>,
}

// The bundle is shared across request handlers without locking
const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ModelBundle>();
};

impl ModelBundle {
    pub fn builder() -> BundleBuilder {
        BundleBuilder::new()
    }

    /// Features in the order the classifier expects them
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Fitted encoder for a feature, or for [`TARGET_ENCODER`]
    pub fn encoder(&self, name: &str) -> Option<&LabelEncoder> {
        self.encoders.get(name)
    }

    pub fn target_encoder(&self) -> &LabelEncoder {
        // presence is checked by BundleBuilder::build
        &self.encoders[TARGET_ENCODER]
    }

    pub fn classifier(&self) -> &dyn ClassModel {
        self.classifier.as_ref()
    }

    pub fn info(&self) -> BundleInfo {
        BundleInfo {
            source: self.source.clone(),
            features: self.features.clone(),
            vocabulary_sizes: self
                .features
                .iter()
                .map(|f| self.encoders.get(f).map_or(0, LabelEncoder::len))
                .collect(),
            num_classes: self.target_encoder().len(),
            class_labels: self.target_encoder().classes().to_vec(),
        }
    }

    pub(crate) fn with_source(mut self, source: PathBuf) -> Self {
        self.source = Some(source);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_bundle_is_shared_across_threads() {
        let bundle = ModelBundle::builder()
            .with_features(vec!["odor"])
            .add_encoder("odor", LabelEncoder::new(vec!["a", "n"]).unwrap())
            .and_then(|b| b.add_encoder(TARGET_ENCODER, LabelEncoder::new(vec!["e", "p"]).unwrap()))
            .and_then(|b| {
                b.with_classifier(TreeEnsemble::new(
                    2,
                    vec![TreeNode::split(0, 0.5, TreeNode::leaf(vec![1.0, 0.0]), TreeNode::leaf(vec![0.0, 1.0]))],
                ))
                .build()
            })
            .unwrap();
        let bundle = Arc::new(bundle);

        let handle = {
            let bundle = Arc::clone(&bundle);
            std::thread::spawn(move || bundle.classifier().predict(&[1.0]))
        };
        assert_eq!(handle.join().unwrap().unwrap(), 1);
        assert_eq!(bundle.info().num_classes, 2);
    }
}
