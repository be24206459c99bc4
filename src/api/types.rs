//! Shared types for the HTTP API layer.

use std::sync::Arc;

use crate::api::error::ApiError;
use crate::core_state::CoreState;

/// Upload ceiling for report files.
pub const MAX_REPORT_BYTES: usize = 10 * 1024 * 1024;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }

    /// Run blocking work (SQLite, SMTP, PDF decoding) off the async runtime.
    pub async fn blocking<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&CoreState) -> Result<T, ApiError> + Send + 'static,
    {
        let core = self.core.clone();
        tokio::task::spawn_blocking(move || work(&core)).await?
    }
}
