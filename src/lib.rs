pub mod api; // HTTP endpoints
pub mod config;
pub mod core_state; // Load-once shared state
pub mod models;
pub mod db;
pub mod notification; // Clinician alert e-mails
pub mod pipeline;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Startup failures. Each one ends the process with a non-zero status.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Initialization failed: {0}")]
    Core(#[from] core_state::CoreError),
    #[error("Server error: {0}")]
    Server(#[from] api::ServerError),
}

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Load configuration and state, then serve until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::Config::from_env()?;
    let bind_addr = config.bind_addr;

    let core = tokio::task::block_in_place(|| core_state::CoreState::initialize(config))?;
    let mut server = api::start_server_on(Arc::new(core), bind_addr).await?;
    tracing::info!(addr = %server.addr, "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    server.shutdown();
    server.stopped().await;
    Ok(())
}
