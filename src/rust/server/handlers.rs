//! HTTP request handlers
//!
//! Every request is handled from scratch against the shared bundle; nothing
//! is kept between interactions.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};

use super::html::render_page;
use super::{AppState, ServerError};
use crate::bundle::PredictionError;
use crate::form::{guide, FormSpec, GuideBlock, Locale, Selection, GUIDE_IMAGES};
use crate::service::{Outcome, Prediction};

/// `?lang=` query parameter
#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

impl AppState {
    fn locale_for(&self, query: &LangQuery) -> Locale {
        match query.lang.as_deref().map(str::parse::<Locale>) {
            Some(Ok(locale)) => locale,
            Some(Err(e)) => {
                log::debug!("{}, using {}", e, self.locale);
                self.locale
            }
            None => self.locale,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub features: Vec<String>,
    pub classes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub form: FormSpec,
    pub guide: Vec<GuideBlock>,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Prediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub outcome: Outcome,
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let info = state.service.bundle().info();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        features: info.features,
        classes: info.class_labels,
    })
}

fn page_response(page: Result<String, ServerError>) -> (StatusCode, Html<String>) {
    match page {
        Ok(page) => (StatusCode::OK, Html(page)),
        Err(e) => {
            log::error!("Failed to render page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Html(e.to_string()))
        }
    }
}

/// Renders the empty form
pub async fn index(State(state): State<AppState>, Query(query): Query<LangQuery>) -> (StatusCode, Html<String>) {
    let locale = state.locale_for(&query);
    let form = state.service.render_form(locale);
    page_response(render_page(&form, &Selection::new(), None))
}

/// Handles a form submit and re-renders the page with the verdict.
///
/// Validation failures are shown as a warning block with status 200; the
/// form stays usable.
pub async fn submit(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
    Form(fields): Form<HashMap<String, String>>,
) -> (StatusCode, Html<String>) {
    let locale = state.locale_for(&query);
    let selection = Selection::from_pairs(fields);
    let outcome = state.service.submit(&selection, locale);
    let form = state.service.render_form(locale);
    page_response(render_page(&form, &selection, Some(&outcome)))
}

/// Selectors and guide as JSON
pub async fn api_form(State(state): State<AppState>, Query(query): Query<LangQuery>) -> Json<FormResponse> {
    let locale = state.locale_for(&query);
    Json(FormResponse {
        form: state.service.render_form(locale),
        guide: guide(locale),
    })
}

/// JSON prediction. Unknown or missing values answer 422, classifier
/// failures 500; both carry the localized warning.
pub async fn api_predict(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
    Json(selection): Json<Selection>,
) -> (StatusCode, Json<PredictResponse>) {
    let locale = state.locale_for(&query);
    match state.service.predict(&selection) {
        Ok(prediction) => {
            let outcome = prediction.message(locale);
            (
                StatusCode::OK,
                Json(PredictResponse {
                    prediction: Some(prediction),
                    error: None,
                    outcome,
                }),
            )
        }
        Err(e) => {
            log::warn!("Prediction failed: {}", e);
            let status = match e {
                PredictionError::ModelError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            };
            (
                status,
                Json(PredictResponse {
                    prediction: None,
                    error: Some(e.to_string()),
                    outcome: e.message(locale),
                }),
            )
        }
    }
}

/// Serves one of the fixed guide images from the images directory
pub async fn image(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    if !GUIDE_IMAGES.contains(&name.as_str()) {
        return StatusCode::NOT_FOUND.into_response();
    }
    let path = state.images_dir.join(&name);
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response(),
        Err(e) => {
            log::warn!("Guide image {:?} unavailable: {}", path, e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
