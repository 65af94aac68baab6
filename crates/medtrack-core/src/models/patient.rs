//! Patient models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::assignment::AssignmentDetail;

/// A patient record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// System-assigned ID
    pub id: i64,
    /// Full name (trimmed, 2-100 chars)
    pub name: String,
    /// Date of birth
    pub date_of_birth: NaiveDate,
}

/// Fields required to create a patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub name: String,
    pub date_of_birth: NaiveDate,
}

/// Partial patient update. Only `Some` fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PatientChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

impl PatientChanges {
    /// Merge the supplied fields into `patient`, leaving the rest untouched.
    pub fn apply_to(self, patient: &mut Patient) {
        if let Some(name) = self.name {
            patient.name = name;
        }
        if let Some(date_of_birth) = self.date_of_birth {
            patient.date_of_birth = date_of_birth;
        }
    }
}

/// A patient together with its assignments, each carrying its medication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientDetail {
    #[serde(flatten)]
    pub patient: Patient,
    pub assignments: Vec<AssignmentDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> Patient {
        Patient {
            id: 1,
            name: "Ada Lovelace".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 12, 10).unwrap(),
        }
    }

    #[test]
    fn test_apply_name_only_keeps_date_of_birth() {
        let mut p = patient();
        PatientChanges {
            name: Some("New Name".into()),
            date_of_birth: None,
        }
        .apply_to(&mut p);

        assert_eq!(p.name, "New Name");
        assert_eq!(p.date_of_birth, NaiveDate::from_ymd_opt(1990, 12, 10).unwrap());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(patient()).unwrap();
        assert_eq!(json["dateOfBirth"], "1990-12-10");
        assert!(json.get("date_of_birth").is_none());
    }

    #[test]
    fn test_empty_changes_skip_fields() {
        let changes = PatientChanges::default();
        assert_eq!(serde_json::to_string(&changes).unwrap(), "{}");
    }
}
