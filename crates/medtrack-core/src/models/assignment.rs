//! Assignment models: a patient on a medication for a fixed course.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::{Medication, Patient};
use crate::treatment::{self, TreatmentStatus};

/// A course of treatment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: i64,
    pub patient_id: i64,
    pub medication_id: i64,
    /// First day of treatment
    pub start_date: NaiveDate,
    /// Length of the course in days (1-365)
    pub days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignment {
    pub patient_id: i64,
    pub medication_id: i64,
    pub start_date: NaiveDate,
    pub days: u32,
}

/// Partial assignment update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medication_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
}

impl AssignmentChanges {
    pub fn apply_to(self, assignment: &mut Assignment) {
        if let Some(patient_id) = self.patient_id {
            assignment.patient_id = patient_id;
        }
        if let Some(medication_id) = self.medication_id {
            assignment.medication_id = medication_id;
        }
        if let Some(start_date) = self.start_date {
            assignment.start_date = start_date;
        }
        if let Some(days) = self.days {
            assignment.days = days;
        }
    }
}

impl Assignment {
    /// Start of treatment: midnight UTC on `start_date`.
    pub fn start_instant(&self) -> DateTime<Utc> {
        start_of_day(self.start_date)
    }

    /// Whole days left in the course as of `now`, never negative.
    pub fn remaining_days(&self, now: DateTime<Utc>) -> u32 {
        treatment::remaining_days(self.start_instant(), self.days, now)
    }

    pub fn status(&self, now: DateTime<Utc>) -> TreatmentStatus {
        treatment::status(self.start_instant(), self.days, now)
    }
}

/// Midnight UTC on `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// An assignment with its related records and, when requested, its
/// computed treatment window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDetail {
    #[serde(flatten)]
    pub assignment: Assignment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<Patient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medication: Option<Medication>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TreatmentStatus>,
}

impl AssignmentDetail {
    pub fn new(assignment: Assignment) -> Self {
        Self {
            assignment,
            patient: None,
            medication: None,
            remaining_days: None,
            status: None,
        }
    }

    pub fn with_patient(mut self, patient: Patient) -> Self {
        self.patient = Some(patient);
        self
    }

    pub fn with_medication(mut self, medication: Medication) -> Self {
        self.medication = Some(medication);
        self
    }

    /// Attach remaining days and status computed at `now`.
    pub fn with_treatment_window(mut self, now: DateTime<Utc>) -> Self {
        self.remaining_days = Some(self.assignment.remaining_days(now));
        self.status = Some(self.assignment.status(now));
        self
    }
}
