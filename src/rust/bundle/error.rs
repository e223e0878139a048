use std::fmt;
use std::io;

/// Errors raised while loading and validating a model bundle.
///
/// Any of these is fatal at startup: a form cannot be generated without a
/// consistent bundle.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Manifest parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Hash mismatch: expected {expected}, got {actual} for {path}")]
    HashMismatch {
        path: String,
        expected: String,
        actual: String,
    },
    #[error("Invalid bundle: {0}")]
    Validation(String),
    #[error("Runtime error: {0}")]
    Runtime(String),
}

#[cfg(feature = "onnx")]
impl From<ort::Error> for BundleError {
    fn from(err: ort::Error) -> Self {
        BundleError::Runtime(err.to_string())
    }
}

/// Represents the failures a single prediction request can run into.
///
/// None of them is fatal: callers surface the message as a warning and keep
/// accepting input.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionError {
    /// A resolved code is not part of the feature's fitted vocabulary
    UnknownValue { feature: String, value: String },
    /// A feature that does not accept "not specified" had no selection
    MissingValue { feature: String },
    /// The classifier failed or returned an unusable probability vector
    ModelError(String),
}

impl fmt::Display for PredictionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownValue { feature, value } => {
                write!(f, "Unknown value '{}' for feature {}", value, feature)
            }
            Self::MissingValue { feature } => write!(f, "No value selected for feature {}", feature),
            Self::ModelError(msg) => write!(f, "Model error: {}", msg),
        }
    }
}

impl std::error::Error for PredictionError {}

#[cfg(feature = "onnx")]
impl From<ort::Error> for PredictionError {
    fn from(err: ort::Error) -> Self {
        PredictionError::ModelError(err.to_string())
    }
}
