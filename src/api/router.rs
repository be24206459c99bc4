//! HTTP API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//!
//! Layers (outermost → innermost):
//! 1. CORS (any origin, method, header) → 2. Audit logger → 3. Body limit

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::{ApiContext, MAX_REPORT_BYTES};
use crate::core_state::CoreState;

/// Build the API router over shared application state.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);

    Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/predict-from-form", post(endpoints::predictions::from_form))
        .route(
            "/predict-from-symptoms",
            post(endpoints::predictions::from_symptoms),
        )
        .route(
            "/predict-with-report",
            post(endpoints::predictions::with_report),
        )
        .route("/send-alert", post(endpoints::alerts::send))
        .route("/patients", get(endpoints::patients::list))
        .route("/patients/:id", get(endpoints::patients::detail))
        .route("/predictions/:id", get(endpoints::patients::prediction))
        .with_state(ctx)
        // Innermost first, outermost last
        .layer(DefaultBodyLimit::max(MAX_REPORT_BYTES))
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(CorsLayer::permissive())
}
