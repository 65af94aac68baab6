//! Assignment database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::medications::medication_from_row;
use super::patients::patient_from_row;
use super::{Database, DbResult};
use crate::models::{Assignment, Medication, NewAssignment, Patient};

const ASSIGNMENT_COLUMNS: &str = "id, patient_id, medication_id, start_date, days";

fn assignment_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Assignment> {
    Ok(Assignment {
        id: row.get(offset)?,
        patient_id: row.get(offset + 1)?,
        medication_id: row.get(offset + 2)?,
        start_date: row.get(offset + 3)?,
        days: row.get(offset + 4)?,
    })
}

fn joined_from_row(row: &Row<'_>) -> rusqlite::Result<JoinedAssignment> {
    Ok(JoinedAssignment {
        assignment: assignment_from_row(row, 0)?,
        patient: patient_from_row(row, 5)?,
        medication: medication_from_row(row, 8)?,
    })
}

/// Which assignments a joined query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentScope {
    All,
    Assignment(i64),
    Patient(i64),
    Medication(i64),
}

impl AssignmentScope {
    fn where_clause(&self) -> (&'static str, Option<i64>) {
        match *self {
            AssignmentScope::All => ("", None),
            AssignmentScope::Assignment(id) => ("WHERE a.id = ?1", Some(id)),
            AssignmentScope::Patient(id) => ("WHERE a.patient_id = ?1", Some(id)),
            AssignmentScope::Medication(id) => ("WHERE a.medication_id = ?1", Some(id)),
        }
    }
}

/// An assignment row joined with the patient and medication it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedAssignment {
    pub assignment: Assignment,
    pub patient: Patient,
    pub medication: Medication,
}

impl Database {
    /// Insert a new assignment and return it with its assigned ID.
    pub fn insert_assignment(&self, assignment: &NewAssignment) -> DbResult<Assignment> {
        self.conn.execute(
            r#"
            INSERT INTO assignments (patient_id, medication_id, start_date, days)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                assignment.patient_id,
                assignment.medication_id,
                assignment.start_date,
                assignment.days,
            ],
        )?;
        Ok(Assignment {
            id: self.conn.last_insert_rowid(),
            patient_id: assignment.patient_id,
            medication_id: assignment.medication_id,
            start_date: assignment.start_date,
            days: assignment.days,
        })
    }

    /// Update an existing assignment.
    pub fn update_assignment(&self, assignment: &Assignment) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE assignments SET
                patient_id = ?2,
                medication_id = ?3,
                start_date = ?4,
                days = ?5,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                assignment.id,
                assignment.patient_id,
                assignment.medication_id,
                assignment.start_date,
                assignment.days,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get an assignment by ID, without relations.
    pub fn get_assignment(&self, id: i64) -> DbResult<Option<Assignment>> {
        self.conn
            .query_row(
                &format!("SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE id = ?"),
                [id],
                |row| assignment_from_row(row, 0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Assignments in `scope`, each joined with its patient and medication.
    pub fn list_joined_assignments(&self, scope: AssignmentScope) -> DbResult<Vec<JoinedAssignment>> {
        let (filter, id) = scope.where_clause();
        let sql = format!(
            r#"
            SELECT a.id, a.patient_id, a.medication_id, a.start_date, a.days,
                   p.id, p.name, p.date_of_birth,
                   m.id, m.name, m.dosage, m.frequency
            FROM assignments a
            JOIN patients p ON p.id = a.patient_id
            JOIN medications m ON m.id = a.medication_id
            {filter}
            ORDER BY a.id
            "#
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = match id {
            Some(id) => stmt.query_map([id], joined_from_row)?.collect::<Result<Vec<_>, _>>(),
            None => stmt.query_map([], joined_from_row)?.collect::<Result<Vec<_>, _>>(),
        };
        rows.map_err(Into::into)
    }

    /// Delete an assignment.
    pub fn delete_assignment(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM assignments WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewMedication, NewPatient};
    use chrono::NaiveDate;

    fn setup_db() -> (Database, Patient, Medication) {
        let db = Database::open_in_memory().unwrap();
        let patient = db
            .insert_patient(&NewPatient {
                name: "John Doe".into(),
                date_of_birth: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
            })
            .unwrap();
        let medication = db
            .insert_medication(&NewMedication {
                name: "Metformin".into(),
                dosage: "850mg".into(),
                frequency: "Twice daily".into(),
            })
            .unwrap();
        (db, patient, medication)
    }

    fn new_assignment(patient: &Patient, medication: &Medication, days: u32) -> NewAssignment {
        NewAssignment {
            patient_id: patient.id,
            medication_id: medication.id,
            start_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            days,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let (db, patient, medication) = setup_db();

        let inserted = db
            .insert_assignment(&new_assignment(&patient, &medication, 14))
            .unwrap();
        let retrieved = db.get_assignment(inserted.id).unwrap().unwrap();

        assert_eq!(retrieved, inserted);
        assert_eq!(retrieved.days, 14);
        assert_eq!(retrieved.start_date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn test_joined_query_attaches_relations() {
        let (db, patient, medication) = setup_db();
        db.insert_assignment(&new_assignment(&patient, &medication, 7))
            .unwrap();

        let joined = db.list_joined_assignments(AssignmentScope::All).unwrap();
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].patient, patient);
        assert_eq!(joined[0].medication, medication);
    }

    #[test]
    fn test_joined_query_scopes() {
        let (db, patient, medication) = setup_db();
        let other = db
            .insert_patient(&NewPatient {
                name: "Jane Roe".into(),
                date_of_birth: NaiveDate::from_ymd_opt(1980, 6, 6).unwrap(),
            })
            .unwrap();

        let first = db
            .insert_assignment(&new_assignment(&patient, &medication, 7))
            .unwrap();
        db.insert_assignment(&new_assignment(&other, &medication, 3))
            .unwrap();

        let for_patient = db
            .list_joined_assignments(AssignmentScope::Patient(patient.id))
            .unwrap();
        assert_eq!(for_patient.len(), 1);
        assert_eq!(for_patient[0].assignment, first);

        let for_medication = db
            .list_joined_assignments(AssignmentScope::Medication(medication.id))
            .unwrap();
        assert_eq!(for_medication.len(), 2);

        let single = db
            .list_joined_assignments(AssignmentScope::Assignment(first.id))
            .unwrap();
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_update_and_delete() {
        let (db, patient, medication) = setup_db();
        let mut assignment = db
            .insert_assignment(&new_assignment(&patient, &medication, 7))
            .unwrap();

        assignment.days = 10;
        assert!(db.update_assignment(&assignment).unwrap());
        assert_eq!(db.get_assignment(assignment.id).unwrap().unwrap().days, 10);

        assert!(db.delete_assignment(assignment.id).unwrap());
        assert!(db
            .list_joined_assignments(AssignmentScope::All)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_deleting_medication_cascades() {
        let (db, patient, medication) = setup_db();
        db.insert_assignment(&new_assignment(&patient, &medication, 7))
            .unwrap();

        db.delete_medication(medication.id).unwrap();
        assert!(db
            .list_joined_assignments(AssignmentScope::All)
            .unwrap()
            .is_empty());
        assert!(db.get_patient(patient.id).unwrap().is_some());
    }
}
