//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model_loaded: bool,
    /// Columns the classifier reads (0 when the model does not report them).
    pub model_inputs: usize,
}

/// `GET /health`: liveness plus classifier status.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    // CoreState is never built without a classifier
    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        model_loaded: true,
        model_inputs: ctx.core.model().input_columns().len(),
    })
}
