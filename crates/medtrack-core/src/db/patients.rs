//! Patient database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::{NewPatient, Patient};

pub(crate) const PATIENT_COLUMNS: &str = "id, name, date_of_birth";

/// Map a row selected with [`PATIENT_COLUMNS`] starting at `offset`.
pub(crate) fn patient_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        date_of_birth: row.get(offset + 2)?,
    })
}

impl Database {
    /// Insert a new patient and return it with its assigned ID.
    pub fn insert_patient(&self, patient: &NewPatient) -> DbResult<Patient> {
        self.conn.execute(
            "INSERT INTO patients (name, date_of_birth) VALUES (?1, ?2)",
            params![patient.name, patient.date_of_birth],
        )?;
        Ok(Patient {
            id: self.conn.last_insert_rowid(),
            name: patient.name.clone(),
            date_of_birth: patient.date_of_birth,
        })
    }

    /// Update an existing patient.
    pub fn update_patient(&self, patient: &Patient) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                name = ?2,
                date_of_birth = ?3,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![patient.id, patient.name, patient.date_of_birth],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: i64) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?"),
                [id],
                |row| patient_from_row(row, 0),
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn patient_exists(&self, id: i64) -> DbResult<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM patients WHERE id = ?", [id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// List all patients by ID.
    pub fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {PATIENT_COLUMNS} FROM patients ORDER BY id"))?;

        let rows = stmt.query_map([], |row| patient_from_row(row, 0))?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete a patient. Its assignments go with it.
    pub fn delete_patient(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM patients WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}
