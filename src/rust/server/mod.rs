//! HTTP surface of the form: server-rendered page plus a small JSON API.
//!
//! # Example
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use std::sync::Arc;
//! use mushroom_form::{server, AppConfig, InferenceService, ModelBundle, ServerConfig};
//!
//! let config = AppConfig::default();
//! let bundle = ModelBundle::load(&config.model_path, &config.load_options())?;
//! let state = server::AppState::new(InferenceService::new(Arc::new(bundle)), &config);
//! server::serve(state, &ServerConfig::default()).await?;
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use axum::routing::{get, post};
use axum::Router;
use thiserror::Error;

pub mod handlers;
mod html;

pub use handlers::{FormResponse, HealthResponse, LangQuery, PredictResponse};
pub use html::render_page;

use crate::config::{AppConfig, ServerConfig};
use crate::form::Locale;
use crate::service::InferenceService;

/// Server errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Bind error: {0}")]
    Bind(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// State shared by all handlers; the bundle inside is read-only.
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: InferenceService,
    pub images_dir: PathBuf,
    pub locale: Locale,
}

impl AppState {
    pub fn new(service: InferenceService, config: &AppConfig) -> Self {
        Self {
            service,
            images_dir: config.images_dir.clone(),
            locale: config.locale,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/predict", post(handlers::submit))
        .route("/images/:name", get(handlers::image))
        .route("/api/form", get(handlers::api_form))
        .route("/api/predict", post(handlers::api_predict))
        .route("/health", get(handlers::health))
        .with_state(state)
}

/// Binds and serves until Ctrl+C.
pub async fn serve(state: AppState, config: &ServerConfig) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| ServerError::Bind(format!("{}: {}", config.bind, e)))?;

    log::info!("Serving form on http://{}", config.bind);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
}
