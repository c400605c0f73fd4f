//! HTTP surface: routing, request shaping, and error-to-status mapping.
//! No business logic lives here.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use mhfaq_core::{FaqError, ModelLoader, QueryService};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, warn};

use crate::types::{ErrorResponse, HealthResponse, QueryRequest, QueryResponse, StatsResponse};

#[derive(Clone)]
pub struct AppState {
    pub loader: Arc<ModelLoader>,
    pub service: Arc<QueryService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/faq", post(query_faq))
        .route("/stats", get(stats))
        .fallback(not_found)
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Mental Health FAQ API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "query": "/faq",
            "stats": "/stats",
        },
    }))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.loader.is_ready();
    Json(HealthResponse {
        status: if model_loaded { "healthy" } else { "unhealthy" },
        message: if model_loaded {
            "FAQ model is ready"
        } else {
            "FAQ model not loaded yet"
        },
        model_loaded,
    })
}

async fn query_faq(State(state): State<AppState>, Json(request): Json<QueryRequest>) -> Response {
    let service = state.service.clone();

    // first call may build the index; ranking is CPU-bound either way
    let outcome = tokio::task::spawn_blocking(move || {
        service.answer(&request.question, request.top_k, request.min_score)
    })
    .await;

    match outcome {
        Ok(Ok(outcome)) => (StatusCode::OK, Json(QueryResponse::from(outcome))).into_response(),
        Ok(Err(err)) => error_response(err),
        Err(join_err) => {
            error!(error = %join_err, "query task panicked");
            internal_error()
        }
    }
}

async fn stats(State(state): State<AppState>) -> Response {
    match state.loader.ready() {
        Some(model) => {
            let embedding_dimensions = match model.index.dimension() {
                0 => json!("unknown"),
                dim => json!(dim),
            };
            (
                StatusCode::OK,
                Json(StatsResponse {
                    total_faqs: model.index.size(),
                    model_name: model.model_name.clone(),
                    embedding_dimensions,
                }),
            )
                .into_response()
        }
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new(
                "service_unavailable",
                "FAQ model is not loaded",
            )),
        )
            .into_response(),
    }
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(
            "not_found",
            "Endpoint not found. See / for available endpoints",
        )),
    )
        .into_response()
}

fn error_response(err: FaqError) -> Response {
    match err {
        FaqError::EmptyQuestion => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("bad_request", "Question cannot be empty")),
        )
            .into_response(),
        FaqError::Unavailable(reason) => {
            warn!(%reason, "rejecting query: model unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new(
                    "service_unavailable",
                    "FAQ model is not available",
                )),
            )
                .into_response()
        }
        // full detail is logged, never sent to the client
        FaqError::Internal(err) => {
            error!(error = %format!("{err:#}"), "query failed");
            internal_error()
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(
            "internal_error",
            "Something went wrong on our end",
        )),
    )
        .into_response()
}
