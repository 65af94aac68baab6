//! Medication models.

use serde::{Deserialize, Serialize};

use super::assignment::AssignmentDetail;

/// A medication in the formulary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: i64,
    /// Medication name (e.g., "Amoxicillin")
    pub name: String,
    /// Dosage (e.g., "500mg")
    pub dosage: String,
    /// Frequency (e.g., "Twice daily")
    pub frequency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewMedication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

/// Partial medication update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MedicationChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
}

impl MedicationChanges {
    pub fn apply_to(self, medication: &mut Medication) {
        if let Some(name) = self.name {
            medication.name = name;
        }
        if let Some(dosage) = self.dosage {
            medication.dosage = dosage;
        }
        if let Some(frequency) = self.frequency {
            medication.frequency = frequency;
        }
    }
}

/// A medication together with its assignments, each carrying its patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicationDetail {
    #[serde(flatten)]
    pub medication: Medication,
    pub assignments: Vec<AssignmentDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_changes() {
        let mut med = Medication {
            id: 3,
            name: "Ibuprofen".into(),
            dosage: "200mg".into(),
            frequency: "Every 8 hours".into(),
        };

        MedicationChanges {
            dosage: Some("400mg".into()),
            ..Default::default()
        }
        .apply_to(&mut med);

        assert_eq!(med.name, "Ibuprofen");
        assert_eq!(med.dosage, "400mg");
        assert_eq!(med.frequency, "Every 8 hours");
    }
}
