//! HTTP surface for the evaluation pipeline.
//!
//! Two routes: `POST /evaluate-exam` runs the full pipeline for one
//! submission URL, `GET /health` reports liveness. Successful evaluations
//! come back as `{"status": "success", "data": {...}}`; every failure is a
//! `{"detail": "..."}` payload whose status code is derived from the
//! [`EvalError`] variant, never from string matching.
//!
//! CORS is locked to the single configured origin, with credentials. The
//! allowed methods and headers mirror the request, which is what tower-http
//! requires once credentials are on (wildcards are rejected).

use crate::config::EvaluationConfig;
use crate::error::EvalError;
use crate::evaluate::Evaluator;
use crate::output::EvaluationResult;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    evaluator: Arc<Evaluator>,
    started_at: Instant,
}

impl AppState {
    pub fn new(evaluator: Arc<Evaluator>) -> Self {
        Self {
            evaluator,
            started_at: Instant::now(),
        }
    }
}

/// Body of `POST /evaluate-exam`.
#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluateRequest {
    /// URL of the exam submission PDF.
    pub pdf_url: String,
}

/// Successful response envelope: `{"status": "success", "data": {...}}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub status: String,
    pub data: EvaluationResult,
}

/// Failure payload, matching the `{"detail": ...}` convention clients expect.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

/// Map a pipeline error to the HTTP status and client-visible message.
///
/// Upstream failures (fetch, completion service) are 502; problems with the
/// submission itself (unreadable PDF, nothing extracted, unparseable reply)
/// are 422; a malformed URL is 400. Internal errors return a generic message
/// so backtraces and paths never leak to the client.
fn error_response(err: &EvalError) -> (StatusCode, String) {
    match err {
        EvalError::InvalidUrl { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        EvalError::FetchFailed { .. } | EvalError::LlmApi { .. } => {
            (StatusCode::BAD_GATEWAY, err.to_string())
        }
        EvalError::DecodeFailed { .. } | EvalError::EmptyExtraction | EvalError::EmptyReply => {
            (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        EvalError::ProviderNotConfigured { .. }
        | EvalError::InvalidConfig(_)
        | EvalError::Internal(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "An internal error occurred during evaluation".to_string(),
        ),
    }
}

async fn evaluate_exam(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> Response {
    info!("Received evaluation request for: {}", request.pdf_url);

    match state.evaluator.evaluate_url(&request.pdf_url).await {
        Ok(output) => {
            let body = EvaluateResponse {
                status: "success".to_string(),
                data: output.result,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => {
            error!("Evaluation failed: {}", err);
            let (status, detail) = error_response(&err);
            (status, Json(ErrorDetail { detail })).into_response()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

/// Build the application router with CORS and request tracing.
pub fn build_router(state: AppState, config: &EvaluationConfig) -> Result<Router, EvalError> {
    let origin: HeaderValue = config.allowed_origin.parse().map_err(|_| {
        EvalError::InvalidConfig(format!(
            "allowed_origin is not a valid header value: '{}'",
            config.allowed_origin
        ))
    })?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Ok(Router::new()
        .route("/evaluate-exam", post(evaluate_exam))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: EvaluationConfig) -> Result<(), EvalError> {
    let bind_addr = config.bind_addr.clone();
    let evaluator = Arc::new(Evaluator::new(config.clone())?);
    let state = AppState::new(evaluator);
    let app = build_router(state, &config)?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| EvalError::Internal(format!("failed to bind {}: {}", bind_addr, e)))?;

    info!("Listening on {}", bind_addr);
    axum::serve(listener, app)
        .await
        .map_err(|e| EvalError::Internal(format!("server error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_deserializes_from_client_json() {
        let request: EvaluateRequest =
            serde_json::from_str(r#"{"pdf_url": "https://example.com/exam.pdf"}"#).unwrap();
        assert_eq!(request.pdf_url, "https://example.com/exam.pdf");
    }

    #[test]
    fn success_envelope_shape() {
        let body = EvaluateResponse {
            status: "success".to_string(),
            data: EvaluationResult {
                extracted_info: "Question 1".into(),
                evaluation_response: "7".into(),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"]["extracted_info"], "Question 1");
        assert_eq!(json["data"]["evaluation_response"], "7");
    }

    #[test]
    fn fetch_failures_map_to_bad_gateway() {
        let err = EvalError::FetchFailed {
            url: "https://example.com/a.pdf".into(),
            reason: "HTTP 404 Not Found".into(),
        };
        let (status, detail) = error_response(&err);
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(detail.contains("404"));
    }

    #[test]
    fn submission_problems_map_to_unprocessable() {
        for err in [
            EvalError::DecodeFailed {
                detail: "not a pdf".into(),
            },
            EvalError::EmptyExtraction,
            EvalError::EmptyReply,
        ] {
            let (status, _) = error_response(&err);
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "for {err}");
        }
    }

    #[test]
    fn invalid_url_maps_to_bad_request() {
        let err = EvalError::InvalidUrl {
            url: "ftp://nope".into(),
        };
        let (status, _) = error_response(&err);
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let err = EvalError::Internal("tempdir at /tmp/xyz vanished".into());
        let (status, detail) = error_response(&err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!detail.contains("/tmp"));
    }
}
