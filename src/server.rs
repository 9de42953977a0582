use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use chrono::Utc;
use metrics::counter;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::detector::{self, CheckOutcome};
use crate::types::{CheckRequest, CheckResponse};

#[derive(Debug, Clone)]
pub struct CheckSettings {
    pub model_path: PathBuf,
    pub error_log: PathBuf,
}

impl From<&ServerConfig> for CheckSettings {
    fn from(config: &ServerConfig) -> Self {
        Self {
            model_path: config.model_path.clone(),
            error_log: config.error_log.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    settings: Arc<CheckSettings>,
}

impl AppState {
    pub fn new(settings: CheckSettings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }
}

/// Routes for the check endpoint. Metrics are layered on by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/check", post(check_handler))
        .route("/health", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tracing::instrument(skip(state, request), fields(path = ?request.path))]
async fn check_handler(
    State(state): State<AppState>,
    Json(request): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, StatusCode> {
    counter!("nsfw_checks_total").increment(1);

    // Model load and inference are blocking; every request loads its own model.
    let settings = state.settings.clone();
    let image_path = request.path.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        detector::run_check(&settings.model_path, &image_path, &settings.error_log)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Check task did not complete");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    if outcome.is_nsfw() {
        counter!("nsfw_flagged_total").increment(1);
    }
    if outcome.error().is_some() {
        counter!("nsfw_check_failures_total").increment(1);
    }

    Ok(Json(check_response(&request, &outcome)))
}

fn check_response(request: &CheckRequest, outcome: &CheckOutcome) -> CheckResponse {
    let prediction = outcome.prediction();

    CheckResponse {
        id: format!("nsfw-{}", Uuid::new_v4().simple()),
        object: "nsfw.check".to_string(),
        created: Utc::now().timestamp(),
        path: request.path.display().to_string(),
        is_nsfw: outcome.is_nsfw(),
        probs: prediction.map(|p| p.probs().to_vec()),
        flagged_class: prediction.and_then(|p| p.flagged_class()),
        error: outcome.error().map(|e| format!("{e:#}")),
    }
}
