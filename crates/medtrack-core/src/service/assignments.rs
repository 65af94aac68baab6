//! Assignment service operations.

use serde_json::Value;

use super::{not_found, Entity, MedTrack, ServiceResult};
use crate::db::{AssignmentScope, Database, JoinedAssignment};
use crate::models::{Assignment, AssignmentDetail};
use crate::validation;

impl JoinedAssignment {
    fn into_detail(self) -> AssignmentDetail {
        AssignmentDetail::new(self.assignment)
            .with_patient(self.patient)
            .with_medication(self.medication)
    }
}

/// Both references must resolve; the patient is checked first.
fn check_references(db: &Database, patient_id: i64, medication_id: i64) -> ServiceResult<()> {
    if !db.patient_exists(patient_id)? {
        return Err(not_found(Entity::Patient, patient_id));
    }
    if !db.medication_exists(medication_id)? {
        return Err(not_found(Entity::Medication, medication_id));
    }
    Ok(())
}

impl MedTrack {
    /// Validate and insert an assignment whose patient and medication exist.
    pub fn create_assignment(&self, input: &Value) -> ServiceResult<Assignment> {
        let new = validation::new_assignment(input, self.now())?;
        let db = self.lock()?;
        check_references(&db, new.patient_id, new.medication_id)?;
        Ok(db.insert_assignment(&new)?)
    }

    /// All assignments with their patient and medication.
    pub fn find_all_assignments(&self) -> ServiceResult<Vec<AssignmentDetail>> {
        let db = self.lock()?;
        Ok(db
            .list_joined_assignments(AssignmentScope::All)?
            .into_iter()
            .map(JoinedAssignment::into_detail)
            .collect())
    }

    pub fn find_assignment(&self, id: i64) -> ServiceResult<AssignmentDetail> {
        let db = self.lock()?;
        db.list_joined_assignments(AssignmentScope::Assignment(id))?
            .into_iter()
            .next()
            .map(JoinedAssignment::into_detail)
            .ok_or_else(|| not_found(Entity::Assignment, id))
    }

    /// Apply the supplied fields; changed references must still resolve.
    pub fn update_assignment(&self, id: i64, input: &Value) -> ServiceResult<Assignment> {
        let changes = validation::assignment_changes(input, self.now())?;
        let db = self.lock()?;
        let mut assignment = db
            .get_assignment(id)?
            .ok_or_else(|| not_found(Entity::Assignment, id))?;

        changes.apply_to(&mut assignment);
        check_references(&db, assignment.patient_id, assignment.medication_id)?;
        db.update_assignment(&assignment)?;
        Ok(assignment)
    }

    pub fn remove_assignment(&self, id: i64) -> ServiceResult<()> {
        let db = self.lock()?;
        if db.get_assignment(id)?.is_none() {
            return Err(not_found(Entity::Assignment, id));
        }
        db.delete_assignment(id)?;
        Ok(())
    }

    /// All assignments with relations plus remaining days and status,
    /// computed at the service clock's current time.
    pub fn find_all_with_remaining_days(&self) -> ServiceResult<Vec<AssignmentDetail>> {
        let now = self.now();
        let db = self.lock()?;
        Ok(db
            .list_joined_assignments(AssignmentScope::All)?
            .into_iter()
            .map(|row| row.into_detail().with_treatment_window(now))
            .collect())
    }
}
