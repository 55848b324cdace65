//! HTTP surface: `POST /analyze`, `GET /recommend`, `GET /health`.
//!
//! Every failure is rendered as a JSON body with an `error` field and HTTP
//! 200, so clients always inspect the body.

pub mod response;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::classifier::Classifier;
use crate::consts::{MSG_RECOMMEND_INFO, UPLOAD_FIELD, display_label, round_confidence};
use crate::recommend::Recommender;

pub use response::{Analysis, AnalyzeError, AnalyzeResponse, ErrorBody};

/// Shared, read-only request state.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<dyn Classifier>,
    pub recommender: Arc<Recommender>,
}

impl AppState {
    pub fn new(classifier: Arc<dyn Classifier>, recommender: Recommender) -> Self {
        Self {
            classifier,
            recommender: Arc::new(recommender),
        }
    }
}

/// Build the application router with permissive CORS and request tracing.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/analyze", post(analyze))
        .route("/recommend", get(recommend_info))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Json<AnalyzeResponse> {
    let response = match run_analysis(&state, multipart).await {
        Ok(analysis) => {
            info!(
                label = %analysis.label,
                confidence = analysis.confidence,
                "analysis complete"
            );
            AnalyzeResponse::Success(analysis)
        }
        Err(e) => {
            match &e {
                AnalyzeError::Internal(details) => error!(%details, "analysis failed"),
                other => warn!(error = %other, "analysis rejected"),
            }
            AnalyzeResponse::Failure(e.into())
        }
    };
    Json(response)
}

/// Classify the uploaded image and attach advice for the top label.
pub async fn run_analysis(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Analysis, AnalyzeError> {
    if !state.classifier.is_configured() {
        return Err(AnalyzeError::Configuration);
    }

    let multipart = multipart.map_err(|e| AnalyzeError::Internal(e.body_text()))?;
    let image = read_upload(multipart).await?.ok_or(AnalyzeError::NoUpload)?;

    debug!(bytes = image.len(), "received upload");
    let prediction = state.classifier.classify(&image).await?;

    // Database lookups use the raw label; display formatting comes after.
    let recommendation = state
        .recommender
        .recommend(&prediction.label, prediction.confidence);

    Ok(Analysis {
        label: display_label(&prediction.label),
        confidence: round_confidence(prediction.confidence),
        recommendation,
    })
}

/// Pull the image bytes out of the form. Prefers the `image` field, else the
/// first field that carries a file name.
async fn read_upload(mut multipart: Multipart) -> Result<Option<Bytes>, AnalyzeError> {
    let mut fallback = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AnalyzeError::Internal(e.body_text()))?
    {
        let is_image = field.name() == Some(UPLOAD_FIELD);
        let is_file = field.file_name().is_some();
        if !is_image && (!is_file || fallback.is_some()) {
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AnalyzeError::Internal(e.body_text()))?;
        if is_image {
            return Ok(Some(bytes));
        }
        fallback = Some(bytes);
    }

    Ok(fallback)
}

async fn recommend_info() -> Json<Value> {
    Json(json!({ "info": MSG_RECOMMEND_INFO }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
