//! Medication service operations.

use std::collections::HashMap;

use serde_json::Value;

use super::{not_found, Entity, MedTrack, ServiceResult};
use crate::db::AssignmentScope;
use crate::models::{AssignmentDetail, Medication, MedicationDetail};
use crate::validation;

impl MedTrack {
    pub fn create_medication(&self, input: &Value) -> ServiceResult<Medication> {
        let new = validation::new_medication(input, self.now())?;
        let db = self.lock()?;
        Ok(db.insert_medication(&new)?)
    }

    /// All medications, each with its assignments and their patients.
    pub fn find_all_medications(&self) -> ServiceResult<Vec<MedicationDetail>> {
        let db = self.lock()?;
        let medications = db.list_medications()?;

        let mut by_medication: HashMap<i64, Vec<AssignmentDetail>> = HashMap::new();
        for row in db.list_joined_assignments(AssignmentScope::All)? {
            by_medication
                .entry(row.assignment.medication_id)
                .or_default()
                .push(AssignmentDetail::new(row.assignment).with_patient(row.patient));
        }

        Ok(medications
            .into_iter()
            .map(|medication| MedicationDetail {
                assignments: by_medication.remove(&medication.id).unwrap_or_default(),
                medication,
            })
            .collect())
    }

    pub fn find_medication(&self, id: i64) -> ServiceResult<MedicationDetail> {
        let db = self.lock()?;
        let medication = db
            .get_medication(id)?
            .ok_or_else(|| not_found(Entity::Medication, id))?;

        let assignments = db
            .list_joined_assignments(AssignmentScope::Medication(id))?
            .into_iter()
            .map(|row| AssignmentDetail::new(row.assignment).with_patient(row.patient))
            .collect();

        Ok(MedicationDetail {
            medication,
            assignments,
        })
    }

    pub fn update_medication(&self, id: i64, input: &Value) -> ServiceResult<Medication> {
        let changes = validation::medication_changes(input, self.now())?;
        let db = self.lock()?;
        let mut medication = db
            .get_medication(id)?
            .ok_or_else(|| not_found(Entity::Medication, id))?;

        changes.apply_to(&mut medication);
        db.update_medication(&medication)?;
        Ok(medication)
    }

    /// Delete a medication and, by cascade, its assignments.
    pub fn remove_medication(&self, id: i64) -> ServiceResult<()> {
        let db = self.lock()?;
        if !db.medication_exists(id)? {
            return Err(not_found(Entity::Medication, id));
        }
        db.delete_medication(id)?;
        Ok(())
    }
}
