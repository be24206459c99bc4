//! Process-wide application state.
//!
//! Built once at startup and shared behind an `Arc` by every request
//! handler. The classifier and alert sender are read-only; the SQLite
//! connection sits behind a `Mutex` that serializes writes.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::config::Config;
use crate::db;
use crate::notification::{AlertSender, SmtpAlertSender};
use crate::pipeline::risk::{ModelError, PipelineModel, RiskModel};

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    db: Mutex<Connection>,
    model: Arc<dyn RiskModel>,
    alerts: Arc<dyn AlertSender>,
    pub config: Config,
}

impl CoreState {
    pub fn new(
        conn: Connection,
        model: Arc<dyn RiskModel>,
        alerts: Arc<dyn AlertSender>,
        config: Config,
    ) -> Self {
        Self {
            db: Mutex::new(conn),
            model,
            alerts,
            config,
        }
    }

    /// Load the classifier artifact, open the database and build the
    /// SMTP sender. Any failure here is fatal for the process.
    pub fn initialize(config: Config) -> Result<Self, CoreError> {
        let model = PipelineModel::load(&config.model_path)?;
        let conn = db::sqlite::open_database(&config.database_path)?;
        let alerts = SmtpAlertSender::new(config.smtp.clone());

        if config.smtp.credentials().is_none() {
            tracing::warn!("SENDER_EMAIL / SENDER_PASSWORD not set; clinician alerts are disabled");
        }

        Ok(Self::new(conn, Arc::new(model), Arc::new(alerts), config))
    }

    /// Exclusive access to the database connection.
    pub fn lock_db(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.db.lock().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn model(&self) -> &dyn RiskModel {
        self.model.as_ref()
    }

    pub fn alerts(&self) -> &dyn AlertSender {
        self.alerts.as_ref()
    }
}

// ═══════════════════════════════════════════════════════════
// Error types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("Classifier error: {0}")]
    Model(#[from] ModelError),
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
