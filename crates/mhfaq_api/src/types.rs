//! Wire request/response shapes.

use mhfaq_core::{FaqMatch, QueryOutcome, DEFAULT_TOP_K};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    #[serde(default = "default_top_k")]
    pub top_k: i64,
    #[serde(default)]
    pub min_score: f64,
}

fn default_top_k() -> i64 {
    DEFAULT_TOP_K
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub success: bool,
    pub results: Vec<FaqMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub query: String,
    pub total_results: usize,
}

impl From<QueryOutcome> for QueryResponse {
    fn from(outcome: QueryOutcome) -> Self {
        Self {
            success: true,
            total_results: outcome.total(),
            results: outcome.matches,
            message: outcome.message,
            query: outcome.query,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub model_loaded: bool,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_faqs: usize,
    pub model_name: String,
    /// The vector width, or `"unknown"` when it cannot be determined.
    pub embedding_dimensions: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &'static str, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
        }
    }
}
