use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Insert a patient unless one with the same name already exists.
/// Returns true when a row was created.
pub fn insert_patient_if_absent(conn: &Connection, patient: &Patient) -> Result<bool, DatabaseError> {
    let inserted = conn.execute(
        "INSERT INTO patients (id, name, age, created_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(name) DO NOTHING",
        params![
            patient.id.to_string(),
            patient.name,
            patient.age,
            patient.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(inserted > 0)
}

pub fn find_patient_by_name(conn: &Connection, name: &str) -> Result<Option<Patient>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, name, age, created_at FROM patients WHERE name = ?1",
            params![name],
            patient_columns,
        )
        .optional()?;
    row.map(patient_from_columns).transpose()
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, name, age, created_at FROM patients WHERE id = ?1",
            params![id.to_string()],
            patient_columns,
        )
        .optional()?;
    row.map(patient_from_columns).transpose()
}

/// All patients, alphabetically, with how many predictions each owns.
pub fn list_patients(conn: &Connection) -> Result<Vec<PatientSummary>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.name, p.age, COUNT(pr.id)
         FROM patients p LEFT JOIN predictions pr ON pr.patient_id = p.id
         GROUP BY p.id ORDER BY p.name",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, i64>(3)?,
        ))
    })?;

    let mut patients = Vec::new();
    for row in rows {
        let (id, name, age, prediction_count) = row?;
        patients.push(PatientSummary {
            id: parse_id(&id)?,
            name,
            age,
            prediction_count,
        });
    }
    Ok(patients)
}

type PatientColumns = (String, String, i64, String);

fn patient_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<PatientColumns> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn patient_from_columns((id, name, age, created_at): PatientColumns) -> Result<Patient, DatabaseError> {
    Ok(Patient {
        id: parse_id(&id)?,
        name,
        age,
        created_at: parse_timestamp(&created_at)?,
    })
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|source| DatabaseError::InvalidId {
        value: raw.to_string(),
        source,
    })
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|source| {
        DatabaseError::InvalidTimestamp {
            value: raw.to_string(),
            source,
        }
    })
}
