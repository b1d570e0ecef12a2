use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use uuid::Uuid;

use breast_assessment_core::{
    DiagnosisRequest, DiagnosisResult, INVALID_IMAGE_MARKER, InvalidImageReport, validate_request,
};

use crate::{
    backend::{BackendError, CompletionBackend, OpenRouterBackend},
    config::ServiceConfig,
    normalize::{ReplyOutcome, normalize_reply},
    prompt::build_prompt,
};

type ApiError = (StatusCode, Json<Value>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "message": message })))
}

fn quota_error() -> ApiError {
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({ "message": "API quota exceeded. Please try again later." })),
    )
}

fn auth_error() -> ApiError {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Invalid API configuration. Please contact support." })),
    )
}

fn internal_error() -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(
            json!({ "message": "An error occurred while processing your request. Please try again." }),
        ),
    )
}

fn invalid_image_error(report: &InvalidImageReport) -> ApiError {
    let body = serde_json::to_value(report).unwrap_or_else(|_| {
        json!({ "error": INVALID_IMAGE_MARKER, "message": report.message.clone() })
    });
    (StatusCode::BAD_REQUEST, Json(body))
}

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn CompletionBackend>,
}

pub fn create_app(config: ServiceConfig) -> Router {
    let state = AppState {
        backend: Arc::new(OpenRouterBackend::new(config)),
    };
    build_router(state)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/diagnosis", post(run_diagnosis))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Breast Assessment Service",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "AI-assisted breast health risk assessment from patient-reported symptoms",
        "endpoints": {
            "POST /api/diagnosis": "Submit symptoms and an optional medical image for assessment",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn run_diagnosis(
    State(state): State<AppState>,
    Json(request): Json<DiagnosisRequest>,
) -> ApiResult<DiagnosisResult> {
    let request_id = Uuid::new_v4();
    info!(
        %request_id,
        patient_age = request.patient.age,
        has_image = request.has_image(),
        "starting diagnosis request"
    );

    if let Err(errors) = validate_request(&request) {
        info!(%request_id, ?errors, "request rejected by validation");
        return Err(bad_request_error(&errors.join("; ")));
    }

    let prompt = build_prompt(&request);

    let raw = state.backend.complete(&prompt).await.map_err(|err| {
        error!(%request_id, error = %err, "model call failed");
        match err {
            BackendError::Auth => auth_error(),
            BackendError::Quota => quota_error(),
            BackendError::Provider(_) | BackendError::Transport(_) => internal_error(),
        }
    })?;

    match normalize_reply(&raw, &request) {
        ReplyOutcome::Result(result) => {
            info!(
                %request_id,
                risk_level = %result.risk_level,
                method = ?result.analysis_method,
                "assessment produced"
            );
            Ok(Json(result))
        }
        ReplyOutcome::InvalidImage(report) => {
            info!(%request_id, image_type = ?report.image_type, "image rejected by model");
            Err(invalid_image_error(&report))
        }
    }
}
