//! A bilingual mushroom edibility form backed by a pre-trained classifier.
//!
//! The crate loads a model bundle (classifier, fitted label encoders and the
//! feature order), generates one selector per feature straight from the
//! encoder vocabularies, and turns a submitted selection into an
//! edible/poisonous verdict with a confidence score.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use mushroom_form::{InferenceService, LabelEncoder, Locale, ModelBundle, Selection, TreeEnsemble, TreeNode};
//!
//! let bundle = ModelBundle::builder()
//!     .with_features(vec!["odor", "spore-print-color"])
//!     .add_encoder("odor", LabelEncoder::new(vec!["a", "f", "n"])?)?
//!     .add_encoder("spore-print-color", LabelEncoder::new(vec!["k", "w"])?)?
//!     .add_encoder("class", LabelEncoder::new(vec!["e", "p"])?)?
//!     .with_classifier(TreeEnsemble::new(2, vec![TreeNode::split(
//!         0,
//!         0.5,
//!         TreeNode::leaf(vec![40.0, 0.0]),
//!         TreeNode::leaf(vec![1.0, 9.0]),
//!     )]))
//!     .build()?;
//!
//! let service = InferenceService::new(Arc::new(bundle));
//! let form = service.render_form(Locale::En);
//! assert_eq!(form.fields.len(), 2);
//!
//! let selection = Selection::new().with("odor", "a").with_unspecified("spore-print-color");
//! let outcome = service.submit(&selection, Locale::En);
//! println!("{}\n{}", outcome.title, outcome.detail);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The bundle is immutable once built and `Send + Sync`; one `Arc<ModelBundle>`
//! serves every request without locking.

pub mod bundle;
pub mod config;
pub mod form;
#[cfg(feature = "onnx")]
pub mod runtime;
pub mod server;
pub mod service;

pub use bundle::{
    BundleBuilder, BundleError, BundleInfo, ClassModel, LabelEncoder, LoadOptions, ModelBundle, Posterior,
    PredictionError, TreeEnsemble, TreeNode, TARGET_ENCODER,
};
pub use config::{AppConfig, ServerConfig, DEFAULT_BIND};
pub use form::{guide_markdown, render_form, FormSpec, Locale, Selection};
pub use service::{InferenceService, Outcome, Prediction, Severity, Verdict};
#[cfg(feature = "onnx")]
pub use runtime::{OptimizationLevel, RuntimeConfig};

/// Installs the `env_logger` backend; `RUST_LOG` overrides the default `info`
/// level. Later calls are no-ops.
pub fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
}
