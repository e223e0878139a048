use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::builder::BundleBuilder;
use super::encoder::LabelEncoder;
use super::error::BundleError;
use super::forest::TreeEnsemble;
use super::ModelBundle;
#[cfg(feature = "onnx")]
use super::onnx::{OnnxClassifier, OnnxSpec};
#[cfg(feature = "onnx")]
use crate::runtime::RuntimeConfig;

/// Classifier section of the manifest, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassifierSpec {
    Forest(TreeEnsemble),
    #[cfg(feature = "onnx")]
    Onnx(OnnxSpec),
}

/// On-disk form of a model bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub features: Vec<String>,
    pub encoders: BTreeMap<String, LabelEncoder>,
    pub classifier: ClassifierSpec,
}

/// Options applied while loading a manifest from disk.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Expected SHA-256 of the manifest file, lowercase hex
    pub expected_sha256: Option<String>,
    #[cfg(feature = "onnx")]
    pub runtime: RuntimeConfig,
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn verify_digest(path: &Path, bytes: &[u8], expected: &str) -> Result<(), BundleError> {
    let actual = sha256_hex(bytes);
    log::debug!("Manifest digest: {} (expected {})", actual, expected);
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(BundleError::HashMismatch {
            path: path.display().to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

impl Manifest {
    /// Reads and parses a manifest, verifying its digest first when pinned.
    pub fn read(path: &Path, expected_sha256: Option<&str>) -> Result<Self, BundleError> {
        log::info!("Reading model manifest from {:?}", path);
        let bytes = fs::read(path)?;
        if let Some(expected) = expected_sha256 {
            verify_digest(path, &bytes, expected)?;
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Turns the parsed manifest into a validated bundle.
    ///
    /// `base_dir` resolves relative paths inside the manifest.
    #[cfg_attr(not(feature = "onnx"), allow(unused_variables))]
    pub fn into_bundle(self, base_dir: &Path, options: &LoadOptions) -> Result<ModelBundle, BundleError> {
        let n_features = self.features.len();
        let mut builder = BundleBuilder::new().with_features(self.features);
        for (name, encoder) in self.encoders {
            builder = builder.add_encoder(name, encoder)?;
        }

        builder = match self.classifier {
            ClassifierSpec::Forest(forest) => {
                forest.validate(n_features)?;
                log::info!("Using tree ensemble with {} trees", forest.trees.len());
                builder.with_classifier(forest)
            }
            #[cfg(feature = "onnx")]
            ClassifierSpec::Onnx(spec) => {
                let path = if spec.path.is_absolute() {
                    spec.path.clone()
                } else {
                    base_dir.join(&spec.path)
                };
                builder.with_classifier(OnnxClassifier::load(&path, spec.n_classes, &options.runtime)?)
            }
        };

        builder.build()
    }
}

impl ModelBundle {
    /// Loads a bundle from a JSON manifest on disk.
    ///
    /// # Example
    /// ```no_run
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use mushroom_form::{LoadOptions, ModelBundle};
    ///
    /// let bundle = ModelBundle::load("model.json", &LoadOptions::default())?;
    /// println!("{:?}", bundle.features());
    /// # Ok(())
    /// # }
    /// ```
    pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self, BundleError> {
        let path = path.as_ref();
        let manifest = Manifest::read(path, options.expected_sha256.as_deref())?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let bundle = manifest.into_bundle(base_dir, options)?;
        Ok(bundle.with_source(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MANIFEST: &str = r#"{
        "features": ["odor", "gill-size"],
        "encoders": {
            "odor": ["a", "f", "n"],
            "gill-size": ["b", "n"],
            "class": ["e", "p"]
        },
        "classifier": {
            "type": "forest",
            "n_classes": 2,
            "trees": [
                { "node": { "feature": 0, "threshold": 0.5,
                    "left": { "leaf": { "value": [10.0, 0.0] } },
                    "right": { "leaf": { "value": [1.0, 9.0] } } } }
            ]
        }
    }"#;

    fn write_manifest(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_forest_manifest() {
        let file = write_manifest(MANIFEST);
        let bundle = ModelBundle::load(file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(bundle.features().len(), 2);
        assert_eq!(bundle.encoder("odor").unwrap().len(), 3);
        assert_eq!(bundle.info().source.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_pinned_digest() {
        let file = write_manifest(MANIFEST);
        let digest = sha256_hex(MANIFEST.as_bytes());

        let options = LoadOptions {
            expected_sha256: Some(digest.to_uppercase()),
            ..LoadOptions::default()
        };
        assert!(ModelBundle::load(file.path(), &options).is_ok());

        let options = LoadOptions {
            expected_sha256: Some("0".repeat(64)),
            ..LoadOptions::default()
        };
        assert!(matches!(
            ModelBundle::load(file.path(), &options),
            Err(BundleError::HashMismatch { .. })
        ));
    }

    #[test]
    fn test_tree_referencing_missing_feature() {
        let file = write_manifest(&MANIFEST.replace("\"feature\": 0", "\"feature\": 7"));
        assert!(matches!(
            ModelBundle::load(file.path(), &LoadOptions::default()),
            Err(BundleError::Validation(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        let file = write_manifest("{ not json");
        assert!(matches!(
            ModelBundle::load(file.path(), &LoadOptions::default()),
            Err(BundleError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ModelBundle::load("/nonexistent/model.json", &LoadOptions::default()),
            Err(BundleError::Io(_))
        ));
    }
}
