//! HTTP service exposing the content pipeline.

#![warn(missing_docs)]

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ekalavya_ai::{Pipeline, PipelineError};
use ekalavya_core::{ContentSet, ErrorKind, PipelineResult, ReviewVerdict, RunId, Time};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Service settings.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Socket address to bind
    pub listen: SocketAddr,

    /// How long a request waits for its pipeline run
    pub request_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 5000)),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pipeline: Pipeline,
    request_timeout: Duration,
}

impl AppState {
    /// Create handler state.
    pub fn new(pipeline: Pipeline, config: &ServiceConfig) -> Self {
        Self {
            pipeline,
            request_timeout: config.request_timeout,
        }
    }
}

/// Build the service router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/generate", post(generate))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    /// Grade 1-12
    pub grade: Option<i64>,

    /// Topic to teach
    pub topic: Option<String>,
}

/// Successful response of `POST /api/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Run identifier
    pub run_id: RunId,

    /// First generated content
    pub generator_output: ContentSet,

    /// Verdict on the first content
    pub reviewer_feedback: ReviewVerdict,

    /// Content to show
    pub final_output: ContentSet,

    /// Whether the first content was replaced
    pub refinement_occurred: bool,

    /// When the run finished
    pub completed_at: Time,
}

impl From<PipelineResult> for GenerateResponse {
    fn from(result: PipelineResult) -> Self {
        Self {
            run_id: result.run_id,
            generator_output: result.initial_content,
            reviewer_feedback: result.verdict,
            final_output: result.final_content,
            refinement_occurred: result.refined,
            completed_at: result.completed_at,
        }
    }
}

/// Errors returned by handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body could not be used
    #[error("Invalid input: {0}")]
    InvalidBody(String),

    /// The pipeline run failed
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl ApiError {
    /// Classified kind of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::InvalidBody(_) => ErrorKind::Input,
            ApiError::Pipeline(err) => err.kind(),
        }
    }

    fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Input => StatusCode::BAD_REQUEST,
            ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::Validation | ErrorKind::MalformedResponse | ErrorKind::Capability => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        let message = match &self {
            ApiError::Pipeline(PipelineError::Input(err)) => format!("Invalid input: {}", err),
            ApiError::Pipeline(err) => format!("Server error: {}", err),
            ApiError::InvalidBody(_) => self.to_string(),
        };

        if status.is_server_error() {
            error!(%kind, "{}", message);
        }

        (
            status,
            Json(serde_json::json!({ "error": message, "kind": kind })),
        )
            .into_response()
    }
}

#[derive(Debug, Clone, Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidBody(e.body_text()))?;

    let grade = request
        .grade
        .ok_or_else(|| ApiError::InvalidBody("grade: field required".to_string()))?;
    let topic = request
        .topic
        .ok_or_else(|| ApiError::InvalidBody("topic: field required".to_string()))?;

    info!(grade, topic = %topic, "Received generation request");

    let result = state
        .pipeline
        .run_with_deadline(grade, &topic, state.request_timeout)
        .await?;

    Ok(Json(result.into()))
}
