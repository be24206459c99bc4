//! Score → label decisions. All comparisons are strict, so a score sitting
//! exactly on a threshold falls to the lower tier.

use crate::models::enums::{FollowUpTier, RiskOutcome};

/// Above this the outcome is "High Risk".
pub const HIGH_RISK_THRESHOLD: f64 = 0.5;

/// Above this a clinician alert is sent (when an address is known).
pub const ALERT_THRESHOLD: f64 = 0.70;

pub const CRITICAL_THRESHOLD: f64 = 0.80;
pub const URGENT_THRESHOLD: f64 = 0.70;
pub const FOLLOW_UP_THRESHOLD: f64 = 0.45;

pub fn outcome_for(risk_score: f64) -> RiskOutcome {
    if risk_score > HIGH_RISK_THRESHOLD {
        RiskOutcome::HighRisk
    } else {
        RiskOutcome::LowRisk
    }
}

pub fn follow_up_tier(risk_score: f64) -> FollowUpTier {
    if risk_score > CRITICAL_THRESHOLD {
        FollowUpTier::Critical
    } else if risk_score > URGENT_THRESHOLD {
        FollowUpTier::Urgent
    } else if risk_score > FOLLOW_UP_THRESHOLD {
        FollowUpTier::Soon
    } else {
        FollowUpTier::Routine
    }
}

pub fn follow_up_for(risk_score: f64) -> &'static str {
    follow_up_tier(risk_score).recommendation()
}

/// Alert only with a non-blank recipient and a score above [`ALERT_THRESHOLD`].
pub fn should_notify(risk_score: f64, clinician_email: Option<&str>) -> bool {
    clinician_email.is_some_and(|e| !e.trim().is_empty()) && risk_score > ALERT_THRESHOLD
}
