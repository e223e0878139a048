//! ONNX Runtime environment and session setup for converted classifiers.

use std::path::Path;
use std::sync::Once;

use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;
use ort::Result as OrtResult;

static INIT: Once = Once::new();

/// Graph optimization applied when a classifier session is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizationLevel {
    Disable,
    Basic,
    Extended,
    #[default]
    All,
}

impl From<OptimizationLevel> for GraphOptimizationLevel {
    fn from(level: OptimizationLevel) -> Self {
        match level {
            OptimizationLevel::Disable => GraphOptimizationLevel::Disable,
            OptimizationLevel::Basic => GraphOptimizationLevel::Level1,
            OptimizationLevel::Extended => GraphOptimizationLevel::Level2,
            OptimizationLevel::All => GraphOptimizationLevel::Level3,
        }
    }
}

/// Session settings for ONNX classifiers. Zero thread counts let ONNX Runtime decide.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub inter_threads: usize,
    pub intra_threads: usize,
    pub optimization_level: OptimizationLevel,
}

fn init_onnx_environment() -> OrtResult<()> {
    ort::init()
        .with_name("mushroom-form")
        .commit()?;
    Ok(())
}

pub fn ensure_initialized() -> OrtResult<()> {
    let mut result = Ok(());
    INIT.call_once(|| {
        result = init_onnx_environment();
        if let Err(e) = &result {
            log::error!("Failed to initialize ONNX Runtime environment: {}", e);
        }
    });
    result
}

pub fn create_session_builder(config: &RuntimeConfig) -> OrtResult<SessionBuilder> {
    ensure_initialized()?;
    let mut builder = Session::builder()?;

    if config.inter_threads > 0 {
        builder = builder.with_inter_threads(config.inter_threads)?;
    }
    if config.intra_threads > 0 {
        builder = builder.with_intra_threads(config.intra_threads)?;
    }
    builder = builder.with_optimization_level(config.optimization_level.into())?;

    Ok(builder)
}

/// Creates a ready-to-run session from a model file.
pub fn load_session(path: &Path, config: &RuntimeConfig) -> OrtResult<Session> {
    create_session_builder(config)?.commit_from_file(path)
}
