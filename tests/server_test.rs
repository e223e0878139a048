use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::{Form, Json};
use mushroom_form::server::{handlers, AppState, LangQuery};
use mushroom_form::{AppConfig, InferenceService, LoadOptions, Locale, ModelBundle, Selection, Severity, Verdict};

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn setup_state(images_dir: PathBuf) -> AppState {
    let bundle = ModelBundle::load(fixture_dir().join("model.json"), &LoadOptions::default())
        .expect("Failed to load fixture bundle");
    let config = AppConfig {
        images_dir,
        ..AppConfig::default()
    };
    AppState::new(InferenceService::new(Arc::new(bundle)), &config)
}

fn lang(code: &str) -> Query<LangQuery> {
    Query(LangQuery {
        lang: Some(code.to_string()),
    })
}

fn form_fields(pairs: &[(&str, &str)]) -> Form<HashMap<String, String>> {
    Form(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
}

#[tokio::test]
async fn test_index_renders_vocabulary_options() {
    let state = setup_state(fixture_dir());
    let (status, Html(page)) = handlers::index(State(state), Query(LangQuery::default())).await;
    assert_eq!(status, StatusCode::OK);

    assert!(page.contains("Цвет спорового отпечатка"));
    assert!(page.contains("<option value=\"n\">n — без запаха</option>"));
    assert!(page.contains("<option value=\"\">❌ Не указывать</option>"));
    assert!(!page.contains("class=\"block"));
}

#[tokio::test]
async fn test_submit_renders_verdict_and_keeps_selection() {
    let state = setup_state(fixture_dir());
    let fields = form_fields(&[
        ("odor", "n"),
        ("gill-size", "b"),
        ("spore-print-color", "w"),
        ("gill-color", "w"),
        ("ring-type", "p"),
        ("population", "s"),
    ]);
    let (status, Html(page)) = handlers::submit(State(state), lang("en"), fields).await;

    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("class=\"block success\""));
    assert!(page.contains("✅ The mushroom is edible!"));
    assert!(page.contains("Model confidence: 82.0%"));
    assert!(page.contains("<option value=\"w\" selected>w — white</option>"));
}

#[tokio::test]
async fn test_submit_with_unknown_value_shows_warning() {
    let state = setup_state(fixture_dir());
    let fields = form_fields(&[
        ("odor", "z"),
        ("gill-size", "b"),
        ("spore-print-color", ""),
        ("gill-color", "w"),
        ("ring-type", "p"),
        ("population", "s"),
    ]);
    let (status, Html(page)) = handlers::submit(State(state), lang("en"), fields).await;

    // validation failures keep the page usable
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("class=\"block warning\""));
    assert!(page.contains("Unknown value &#x27;z&#x27; for feature odor"));
}

#[tokio::test]
async fn test_api_predict() {
    let state = setup_state(fixture_dir());
    let selection = Selection::new()
        .with("odor", "n")
        .with("gill-size", "b")
        .with_unspecified("spore-print-color")
        .with("gill-color", "w")
        .with("ring-type", "p")
        .with("population", "s");

    let (status, Json(body)) = handlers::api_predict(State(state), lang("en"), Json(selection)).await;
    assert_eq!(status, StatusCode::OK);
    let prediction = body.prediction.expect("prediction");
    assert_eq!(prediction.verdict, Verdict::Edible);
    assert_eq!(body.outcome.severity, Severity::Success);
}

#[tokio::test]
async fn test_api_predict_accepts_option_texts() {
    for spore in ["❌ Not specified", "❌ Не указывать", ""] {
        let state = setup_state(fixture_dir());
        let body = serde_json::json!({
            "odor": "n — no odor",
            "gill-size": "b",
            "spore-print-color": spore,
            "gill-color": "w",
            "ring-type": "p",
            "population": "s",
        });
        let selection: Selection = serde_json::from_value(body).unwrap();

        let (status, Json(body)) = handlers::api_predict(State(state), lang("en"), Json(selection)).await;
        assert_eq!(status, StatusCode::OK, "spore-print-color = {:?}", spore);
        let prediction = body.prediction.expect("prediction");
        assert_eq!(prediction.verdict, Verdict::Edible);
        let resolved = prediction
            .inputs
            .iter()
            .find(|r| r.feature == "spore-print-color")
            .unwrap();
        assert!(resolved.defaulted);
    }
}

#[tokio::test]
async fn test_api_predict_rejects_unknown_value() {
    let state = setup_state(fixture_dir());
    let selection = Selection::new().with("odor", "z");

    let (status, Json(body)) = handlers::api_predict(State(state), lang("ru"), Json(selection)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.prediction.is_none());
    assert_eq!(body.outcome.severity, Severity::Warning);
}

#[tokio::test]
async fn test_api_form_matches_bundle() {
    let state = setup_state(fixture_dir());
    let features = state.service.bundle().features().to_vec();
    let Json(body) = handlers::api_form(State(state), lang("en")).await;

    assert_eq!(body.form.locale, Locale::En);
    let names: Vec<_> = body.form.fields.iter().map(|f| f.feature.clone()).collect();
    assert_eq!(names, features);
    assert!(!body.guide.is_empty());
}

#[tokio::test]
async fn test_invalid_lang_falls_back_to_default() {
    let state = setup_state(fixture_dir());
    let (_, Html(page)) = handlers::index(State(state), lang("de")).await;
    assert!(page.contains("<html lang=\"ru\">"));
}

#[tokio::test]
async fn test_images() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("gill_wide.jpg"), b"jpeg-bytes").unwrap();
    let state = setup_state(dir.path().to_path_buf());

    let response = handlers::image(State(state.clone()), Path("gill_wide.jpg".to_string()))
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/jpeg");

    // listed but not deployed
    let response = handlers::image(State(state.clone()), Path("ring_type.jpg".to_string())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // not part of the guide
    let response = handlers::image(State(state), Path("../model.json".to_string())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let state = setup_state(fixture_dir());
    let Json(body) = handlers::health(State(state)).await;
    assert_eq!(body.status, "healthy");
    assert_eq!(body.classes, vec!["e".to_string(), "p".to_string()]);
    assert_eq!(body.features.len(), 6);
}
