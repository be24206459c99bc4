//! Manual alert endpoint.
//!
//! `POST /send-alert`: re-send the high-risk e-mail for a stored prediction.

use std::str::FromStr;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::processor;

#[derive(Debug, Deserialize)]
pub struct SendAlertRequest {
    pub prediction_id: String,
    pub clinician_email: String,
}

#[derive(Debug, Serialize)]
pub struct SendAlertResponse {
    pub email_sent: bool,
    pub message: String,
}

/// `POST /send-alert`: alert a clinician about an existing prediction.
pub async fn send(
    State(ctx): State<ApiContext>,
    Json(request): Json<SendAlertRequest>,
) -> Result<Json<SendAlertResponse>, ApiError> {
    let email = request.clinician_email.trim().to_string();
    if lettre::Address::from_str(&email).is_err() {
        return Err(ApiError::BadRequest("Invalid clinician email address".into()));
    }
    let prediction_id = Uuid::parse_str(request.prediction_id.trim())
        .map_err(|_| ApiError::BadRequest("Invalid prediction ID format".into()))?;

    let recipient = email.clone();
    let email_sent = ctx
        .blocking(move |core| Ok(processor::resend_alert(core, &prediction_id, &recipient)?))
        .await?;

    let message = if email_sent {
        format!("Alert sent to {email}")
    } else {
        "Failed to send alert.".to_string()
    };
    Ok(Json(SendAlertResponse { email_sent, message }))
}
