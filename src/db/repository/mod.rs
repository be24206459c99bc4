//! Repository layer: entity-scoped database operations.

mod patient;
mod prediction;

pub use patient::*;
pub use prediction::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::db::DatabaseError;
    use crate::models::enums::RiskOutcome;
    use crate::models::*;
    use rusqlite::Connection;
    use uuid::Uuid;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn new_prediction<'a>(name: &'a str, age: i64, score: f64) -> NewPrediction<'a> {
        NewPrediction {
            patient_name: name,
            patient_age: age,
            risk_score: score,
            outcome: if score > 0.5 { RiskOutcome::HighRisk } else { RiskOutcome::LowRisk },
            follow_up: "Routine check-up in 6 months.",
        }
    }

    #[test]
    fn first_prediction_creates_patient() {
        let mut conn = test_db();
        let (patient, prediction) =
            record_prediction(&mut conn, &new_prediction("Jane Doe", 61, 0.82)).unwrap();

        assert_eq!(patient.name, "Jane Doe");
        assert_eq!(patient.age, 61);
        assert_eq!(prediction.patient_id, patient.id);
        assert_eq!(prediction.outcome, RiskOutcome::HighRisk);

        let found = find_patient_by_name(&conn, "Jane Doe").unwrap().unwrap();
        assert_eq!(found.id, patient.id);
    }

    #[test]
    fn repeated_predictions_attach_to_same_patient_in_order() {
        let mut conn = test_db();
        let (first_patient, first) =
            record_prediction(&mut conn, &new_prediction("John Roe", 50, 0.2)).unwrap();
        let (second_patient, second) =
            record_prediction(&mut conn, &new_prediction("John Roe", 51, 0.9)).unwrap();

        assert_eq!(first_patient.id, second_patient.id);
        // Existing patient keeps the age recorded at creation
        assert_eq!(second_patient.age, 50);

        let history = list_predictions_for_patient(&conn, &first_patient.id).unwrap();
        let ids: Vec<Uuid> = history.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);

        let summaries = list_patients(&conn).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].prediction_count, 2);
    }

    #[test]
    fn distinct_names_create_distinct_patients() {
        let mut conn = test_db();
        record_prediction(&mut conn, &new_prediction("Bea", 40, 0.3)).unwrap();
        record_prediction(&mut conn, &new_prediction("Al", 70, 0.6)).unwrap();

        let names: Vec<String> = list_patients(&conn).unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Al".to_string(), "Bea".to_string()]);
    }

    #[test]
    fn duplicate_name_insert_is_ignored() {
        let conn = test_db();
        let now = chrono::Utc::now().naive_utc();
        let make = |age| Patient {
            id: Uuid::new_v4(),
            name: "Same Name".into(),
            age,
            created_at: now,
        };
        assert!(insert_patient_if_absent(&conn, &make(30)).unwrap());
        assert!(!insert_patient_if_absent(&conn, &make(31)).unwrap());
        assert_eq!(list_patients(&conn).unwrap().len(), 1);
    }

    #[test]
    fn out_of_range_score_rejected() {
        let mut conn = test_db();
        let result = record_prediction(&mut conn, &new_prediction("Bad", 40, 1.5));
        assert!(matches!(result, Err(DatabaseError::ConstraintViolation(_))));
        assert!(find_patient_by_name(&conn, "Bad").unwrap().is_none());
    }

    #[test]
    fn prediction_lookup_joins_patient_name() {
        let mut conn = test_db();
        let (_, prediction) =
            record_prediction(&mut conn, &new_prediction("Ann Lee", 66, 0.75)).unwrap();

        let loaded = get_prediction_with_patient(&conn, &prediction.id).unwrap().unwrap();
        assert_eq!(loaded.patient_name, "Ann Lee");
        assert!((loaded.prediction.risk_score - 0.75).abs() < 1e-12);
        assert_eq!(loaded.prediction.follow_up, "Routine check-up in 6 months.");
    }

    #[test]
    fn unknown_ids_return_none() {
        let conn = test_db();
        let id = Uuid::new_v4();
        assert!(get_prediction(&conn, &id).unwrap().is_none());
        assert!(get_prediction_with_patient(&conn, &id).unwrap().is_none());
        assert!(get_patient(&conn, &id).unwrap().is_none());
        assert!(get_patient_history(&conn, &id).unwrap().is_none());
    }

    #[test]
    fn patient_history_contains_predictions() {
        let mut conn = test_db();
        let (patient, _) = record_prediction(&mut conn, &new_prediction("Kim", 45, 0.1)).unwrap();
        record_prediction(&mut conn, &new_prediction("Kim", 45, 0.55)).unwrap();

        let history = get_patient_history(&conn, &patient.id).unwrap().unwrap();
        assert_eq!(history.patient.name, "Kim");
        assert_eq!(history.predictions.len(), 2);
        assert_eq!(history.predictions[1].outcome, RiskOutcome::HighRisk);
    }

    #[test]
    fn check_constraint_guards_direct_writes() {
        let mut conn = test_db();
        let (patient, _) = record_prediction(&mut conn, &new_prediction("Lu", 52, 0.4)).unwrap();
        let result = conn.execute(
            "INSERT INTO predictions (id, patient_id, position, risk_score, outcome, follow_up, created_at)
             VALUES (?1, ?2, 9, 0.4, 'Medium Risk', 'x', '2026-01-01 00:00:00')",
            rusqlite::params![Uuid::new_v4().to_string(), patient.id.to_string()],
        );
        assert!(result.is_err());
    }

    #[test]
    fn corrupt_stored_id_is_reported() {
        let conn = test_db();
        conn.execute(
            "INSERT INTO patients (id, name, age, created_at)
             VALUES ('not-a-uuid', 'Broken Id', 40, '2026-01-01 00:00:00')",
            [],
        )
        .unwrap();

        let result = find_patient_by_name(&conn, "Broken Id");
        assert!(matches!(
            result,
            Err(DatabaseError::InvalidId { ref value, .. }) if value == "not-a-uuid"
        ));
        assert!(list_patients(&conn).is_err());
    }

    #[test]
    fn corrupt_stored_timestamp_is_reported() {
        let mut conn = test_db();
        let (patient, prediction) =
            record_prediction(&mut conn, &new_prediction("Old Row", 58, 0.3)).unwrap();
        conn.execute(
            "UPDATE predictions SET created_at = 'yesterday' WHERE id = ?1",
            rusqlite::params![prediction.id.to_string()],
        )
        .unwrap();

        let result = get_prediction(&conn, &prediction.id);
        assert!(matches!(
            result,
            Err(DatabaseError::InvalidTimestamp { ref value, .. }) if value == "yesterday"
        ));
        assert!(get_patient(&conn, &patient.id).unwrap().is_some());
    }
}
