//! Patient service operations.

use std::collections::HashMap;

use serde_json::Value;

use super::{not_found, Entity, MedTrack, ServiceResult};
use crate::db::AssignmentScope;
use crate::models::{AssignmentDetail, Patient, PatientDetail};
use crate::validation;

impl MedTrack {
    /// Validate and insert a patient.
    pub fn create_patient(&self, input: &Value) -> ServiceResult<Patient> {
        let new = validation::new_patient(input, self.now())?;
        let db = self.lock()?;
        Ok(db.insert_patient(&new)?)
    }

    /// All patients, each with its assignments and their medications.
    pub fn find_all_patients(&self) -> ServiceResult<Vec<PatientDetail>> {
        let db = self.lock()?;
        let patients = db.list_patients()?;

        let mut by_patient: HashMap<i64, Vec<AssignmentDetail>> = HashMap::new();
        for row in db.list_joined_assignments(AssignmentScope::All)? {
            by_patient
                .entry(row.assignment.patient_id)
                .or_default()
                .push(AssignmentDetail::new(row.assignment).with_medication(row.medication));
        }

        Ok(patients
            .into_iter()
            .map(|patient| PatientDetail {
                assignments: by_patient.remove(&patient.id).unwrap_or_default(),
                patient,
            })
            .collect())
    }

    pub fn find_patient(&self, id: i64) -> ServiceResult<PatientDetail> {
        let db = self.lock()?;
        let patient = db
            .get_patient(id)?
            .ok_or_else(|| not_found(Entity::Patient, id))?;

        let assignments = db
            .list_joined_assignments(AssignmentScope::Patient(id))?
            .into_iter()
            .map(|row| AssignmentDetail::new(row.assignment).with_medication(row.medication))
            .collect();

        Ok(PatientDetail {
            patient,
            assignments,
        })
    }

    /// Apply the supplied fields to an existing patient.
    pub fn update_patient(&self, id: i64, input: &Value) -> ServiceResult<Patient> {
        let changes = validation::patient_changes(input, self.now())?;
        let db = self.lock()?;
        let mut patient = db
            .get_patient(id)?
            .ok_or_else(|| not_found(Entity::Patient, id))?;

        changes.apply_to(&mut patient);
        db.update_patient(&patient)?;
        Ok(patient)
    }

    /// Delete a patient and, by cascade, its assignments.
    pub fn remove_patient(&self, id: i64) -> ServiceResult<()> {
        let db = self.lock()?;
        if !db.patient_exists(id)? {
            return Err(not_found(Entity::Patient, id));
        }
        db.delete_patient(id)?;
        Ok(())
    }
}
