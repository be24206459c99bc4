use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::patient::{find_patient_by_name, get_patient, insert_patient_if_absent, parse_id, parse_timestamp, TIMESTAMP_FORMAT};
use crate::db::DatabaseError;
use crate::models::enums::RiskOutcome;
use crate::models::*;

/// Append a prediction to the patient with the given name, creating the
/// patient on first sight. Lookup-or-create and the insert share one
/// transaction.
pub fn record_prediction(
    conn: &mut Connection,
    new: &NewPrediction<'_>,
) -> Result<(Patient, Prediction), DatabaseError> {
    if !(0.0..=1.0).contains(&new.risk_score) {
        return Err(DatabaseError::ConstraintViolation(format!(
            "risk_score {} outside [0, 1]",
            new.risk_score
        )));
    }

    let now = chrono::Utc::now().naive_utc();
    let tx = conn.transaction()?;

    let created = insert_patient_if_absent(
        &tx,
        &Patient {
            id: Uuid::new_v4(),
            name: new.patient_name.to_string(),
            age: new.patient_age,
            created_at: now,
        },
    )?;
    let patient = find_patient_by_name(&tx, new.patient_name)?.ok_or_else(|| {
        DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: new.patient_name.to_string(),
        }
    })?;

    let position: i64 = tx.query_row(
        "SELECT COALESCE(MAX(position), 0) + 1 FROM predictions WHERE patient_id = ?1",
        params![patient.id.to_string()],
        |row| row.get(0),
    )?;

    let prediction = Prediction {
        id: Uuid::new_v4(),
        patient_id: patient.id,
        risk_score: new.risk_score,
        outcome: new.outcome,
        follow_up: new.follow_up.to_string(),
        created_at: now,
    };

    tx.execute(
        "INSERT INTO predictions (id, patient_id, position, risk_score, outcome, follow_up, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            prediction.id.to_string(),
            prediction.patient_id.to_string(),
            position,
            prediction.risk_score,
            prediction.outcome.as_str(),
            prediction.follow_up,
            prediction.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    tx.commit()?;

    tracing::debug!(
        patient_id = %patient.id,
        prediction_id = %prediction.id,
        new_patient = created,
        position,
        "Prediction recorded"
    );
    Ok((patient, prediction))
}

pub fn get_prediction(conn: &Connection, id: &Uuid) -> Result<Option<Prediction>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, patient_id, risk_score, outcome, follow_up, created_at
             FROM predictions WHERE id = ?1",
            params![id.to_string()],
            prediction_columns,
        )
        .optional()?;
    row.map(prediction_from_columns).transpose()
}

/// Prediction plus the owning patient's name.
pub fn get_prediction_with_patient(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<PredictionWithPatient>, DatabaseError> {
    let Some(prediction) = get_prediction(conn, id)? else {
        return Ok(None);
    };
    let patient = get_patient(conn, &prediction.patient_id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "Patient".into(),
        id: prediction.patient_id.to_string(),
    })?;
    Ok(Some(PredictionWithPatient {
        prediction,
        patient_name: patient.name,
    }))
}

/// Predictions owned by a patient, oldest first.
pub fn list_predictions_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Prediction>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, risk_score, outcome, follow_up, created_at
         FROM predictions WHERE patient_id = ?1 ORDER BY position",
    )?;
    let rows = stmt.query_map(params![patient_id.to_string()], prediction_columns)?;

    let mut predictions = Vec::new();
    for row in rows {
        predictions.push(prediction_from_columns(row?)?);
    }
    Ok(predictions)
}

pub fn get_patient_history(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Option<PatientHistory>, DatabaseError> {
    let Some(patient) = get_patient(conn, patient_id)? else {
        return Ok(None);
    };
    let predictions = list_predictions_for_patient(conn, patient_id)?;
    Ok(Some(PatientHistory { patient, predictions }))
}

type PredictionColumns = (String, String, f64, String, String, String);

fn prediction_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<PredictionColumns> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn prediction_from_columns(
    (id, patient_id, risk_score, outcome, follow_up, created_at): PredictionColumns,
) -> Result<Prediction, DatabaseError> {
    Ok(Prediction {
        id: parse_id(&id)?,
        patient_id: parse_id(&patient_id)?,
        risk_score,
        outcome: RiskOutcome::from_str(&outcome)?,
        follow_up,
        created_at: parse_timestamp(&created_at)?,
    })
}
