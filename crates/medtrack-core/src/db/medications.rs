//! Medication database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::{Medication, NewMedication};

pub(crate) const MEDICATION_COLUMNS: &str = "id, name, dosage, frequency";

pub(crate) fn medication_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Medication> {
    Ok(Medication {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        dosage: row.get(offset + 2)?,
        frequency: row.get(offset + 3)?,
    })
}

impl Database {
    /// Insert a new medication and return it with its assigned ID.
    pub fn insert_medication(&self, medication: &NewMedication) -> DbResult<Medication> {
        self.conn.execute(
            "INSERT INTO medications (name, dosage, frequency) VALUES (?1, ?2, ?3)",
            params![medication.name, medication.dosage, medication.frequency],
        )?;
        Ok(Medication {
            id: self.conn.last_insert_rowid(),
            name: medication.name.clone(),
            dosage: medication.dosage.clone(),
            frequency: medication.frequency.clone(),
        })
    }

    /// Update an existing medication.
    pub fn update_medication(&self, medication: &Medication) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE medications SET
                name = ?2,
                dosage = ?3,
                frequency = ?4,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                medication.id,
                medication.name,
                medication.dosage,
                medication.frequency,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a medication by ID.
    pub fn get_medication(&self, id: i64) -> DbResult<Option<Medication>> {
        self.conn
            .query_row(
                &format!("SELECT {MEDICATION_COLUMNS} FROM medications WHERE id = ?"),
                [id],
                |row| medication_from_row(row, 0),
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn medication_exists(&self, id: i64) -> DbResult<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM medications WHERE id = ?", [id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// List all medications by ID.
    pub fn list_medications(&self) -> DbResult<Vec<Medication>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEDICATION_COLUMNS} FROM medications ORDER BY id"
        ))?;

        let rows = stmt.query_map([], |row| medication_from_row(row, 0))?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete a medication. Its assignments go with it.
    pub fn delete_medication(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM medications WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}
