//! Validation tables for each entity and the typed inputs built from them.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{
    validate, DateCheck, FieldKind, FieldRule, Limit, Mode, ValidationErrors, ValidationResult,
    Validated,
};
use crate::models::{
    AssignmentChanges, MedicationChanges, NewAssignment, NewMedication, NewPatient,
    PatientChanges,
};

pub const PATIENT_RULES: &[FieldRule] = &[
    FieldRule {
        field: "name",
        required: "Name is required",
        kind: FieldKind::Text {
            min: Limit {
                value: 2,
                message: "Name must be at least 2 characters",
            },
            max: Limit {
                value: 100,
                message: "Name must be less than 100 characters",
            },
        },
    },
    FieldRule {
        field: "dateOfBirth",
        required: "Date of birth is required",
        kind: FieldKind::Date {
            checks: &[
                DateCheck::NotInFuture {
                    message: "Date of birth cannot be in the future",
                },
                DateCheck::NotBefore {
                    year: 1900,
                    month: 1,
                    day: 1,
                    message: "Please enter a valid date of birth",
                },
            ],
        },
    },
];

pub const MEDICATION_RULES: &[FieldRule] = &[
    FieldRule {
        field: "name",
        required: "Medication name is required",
        kind: FieldKind::Text {
            min: Limit {
                value: 2,
                message: "Medication name must be at least 2 characters",
            },
            max: Limit {
                value: 200,
                message: "Medication name must be less than 200 characters",
            },
        },
    },
    FieldRule {
        field: "dosage",
        required: "Dosage is required",
        kind: FieldKind::Text {
            min: Limit {
                value: 1,
                message: "Dosage is required",
            },
            max: Limit {
                value: 50,
                message: "Dosage must be less than 50 characters",
            },
        },
    },
    FieldRule {
        field: "frequency",
        required: "Frequency is required",
        kind: FieldKind::Text {
            min: Limit {
                value: 1,
                message: "Frequency is required",
            },
            max: Limit {
                value: 100,
                message: "Frequency must be less than 100 characters",
            },
        },
    },
];

pub const ASSIGNMENT_RULES: &[FieldRule] = &[
    FieldRule {
        field: "patientId",
        required: "Patient selection is required",
        kind: FieldKind::Integer {
            min: Limit {
                value: 1,
                message: "Please select a patient",
            },
            max: None,
            whole: "Patient ID must be a whole number",
        },
    },
    FieldRule {
        field: "medicationId",
        required: "Medication selection is required",
        kind: FieldKind::Integer {
            min: Limit {
                value: 1,
                message: "Please select a medication",
            },
            max: None,
            whole: "Medication ID must be a whole number",
        },
    },
    FieldRule {
        field: "startDate",
        required: "Start date is required",
        kind: FieldKind::Date {
            checks: &[DateCheck::NotOlderThan {
                hours: 24,
                message: "Start date cannot be more than 1 day in the past",
            }],
        },
    },
    FieldRule {
        field: "days",
        required: "Number of days is required",
        kind: FieldKind::Integer {
            min: Limit {
                value: 1,
                message: "Treatment must be at least 1 day",
            },
            max: Some(Limit {
                value: 365,
                message: "Treatment cannot exceed 365 days",
            }),
            whole: "Number of days must be a whole number",
        },
    },
];

fn require_text(v: &mut Validated, field: &str) -> ValidationResult<String> {
    v.take_text(field)
        .ok_or_else(|| ValidationErrors::single(field, format!("{field} is required")))
}

fn require_integer(v: &mut Validated, field: &str) -> ValidationResult<i64> {
    v.take_integer(field)
        .ok_or_else(|| ValidationErrors::single(field, format!("{field} is required")))
}

fn days_of(value: i64) -> ValidationResult<u32> {
    u32::try_from(value)
        .map_err(|_| ValidationErrors::single("days", "Treatment cannot exceed 365 days"))
}

pub fn new_patient(body: &Value, now: DateTime<Utc>) -> ValidationResult<NewPatient> {
    let mut v = validate(PATIENT_RULES, body, Mode::Create, now)?;
    Ok(NewPatient {
        name: require_text(&mut v, "name")?,
        date_of_birth: v
            .take_date("dateOfBirth")
            .ok_or_else(|| ValidationErrors::single("dateOfBirth", "Date of birth is required"))?,
    })
}

pub fn patient_changes(body: &Value, now: DateTime<Utc>) -> ValidationResult<PatientChanges> {
    let mut v = validate(PATIENT_RULES, body, Mode::Update, now)?;
    Ok(PatientChanges {
        name: v.take_text("name"),
        date_of_birth: v.take_date("dateOfBirth"),
    })
}

pub fn new_medication(body: &Value, now: DateTime<Utc>) -> ValidationResult<NewMedication> {
    let mut v = validate(MEDICATION_RULES, body, Mode::Create, now)?;
    Ok(NewMedication {
        name: require_text(&mut v, "name")?,
        dosage: require_text(&mut v, "dosage")?,
        frequency: require_text(&mut v, "frequency")?,
    })
}

pub fn medication_changes(body: &Value, now: DateTime<Utc>) -> ValidationResult<MedicationChanges> {
    let mut v = validate(MEDICATION_RULES, body, Mode::Update, now)?;
    Ok(MedicationChanges {
        name: v.take_text("name"),
        dosage: v.take_text("dosage"),
        frequency: v.take_text("frequency"),
    })
}

pub fn new_assignment(body: &Value, now: DateTime<Utc>) -> ValidationResult<NewAssignment> {
    let mut v = validate(ASSIGNMENT_RULES, body, Mode::Create, now)?;
    Ok(NewAssignment {
        patient_id: require_integer(&mut v, "patientId")?,
        medication_id: require_integer(&mut v, "medicationId")?,
        start_date: v
            .take_date("startDate")
            .ok_or_else(|| ValidationErrors::single("startDate", "Start date is required"))?,
        days: days_of(require_integer(&mut v, "days")?)?,
    })
}

pub fn assignment_changes(body: &Value, now: DateTime<Utc>) -> ValidationResult<AssignmentChanges> {
    let mut v = validate(ASSIGNMENT_RULES, body, Mode::Update, now)?;
    Ok(AssignmentChanges {
        patient_id: v.take_integer("patientId"),
        medication_id: v.take_integer("medicationId"),
        start_date: v.take_date("startDate"),
        days: v.take_integer("days").map(days_of).transpose()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_new_patient_valid() {
        let p = new_patient(&json!({"name": "  Ada Lovelace ", "dateOfBirth": "1815-12-10"}), now());
        assert!(p.is_err(), "born before 1900");

        let p = new_patient(&json!({"name": "  Ada Lovelace ", "dateOfBirth": "1990-12-10"}), now()).unwrap();
        assert_eq!(p.name, "Ada Lovelace");
        assert_eq!(p.date_of_birth, NaiveDate::from_ymd_opt(1990, 12, 10).unwrap());
    }

    #[test]
    fn test_one_char_name_rejected() {
        let err = new_patient(&json!({"name": "A", "dateOfBirth": "1990-01-01"}), now()).unwrap_err();
        assert!(err.has_field("name"));
        assert_eq!(err.errors()[0].message, "Name must be at least 2 characters");
    }

    #[test]
    fn test_name_length_bounds() {
        let max = "x".repeat(100);
        assert!(new_patient(&json!({"name": max, "dateOfBirth": "1990-01-01"}), now()).is_ok());

        let over = "x".repeat(101);
        let err = new_patient(&json!({"name": over, "dateOfBirth": "1990-01-01"}), now()).unwrap_err();
        assert_eq!(err.errors()[0].message, "Name must be less than 100 characters");
    }

    #[test]
    fn test_date_of_birth_bounds() {
        let today = now().date_naive().to_string();
        assert!(new_patient(&json!({"name": "Bo", "dateOfBirth": today}), now()).is_ok());
        assert!(new_patient(&json!({"name": "Bo", "dateOfBirth": "1900-01-01"}), now()).is_ok());

        let err = new_patient(&json!({"name": "Bo", "dateOfBirth": "2024-06-16"}), now()).unwrap_err();
        assert_eq!(err.errors()[0].message, "Date of birth cannot be in the future");

        let err = new_patient(&json!({"name": "Bo", "dateOfBirth": "1899-12-31"}), now()).unwrap_err();
        assert_eq!(err.errors()[0].message, "Please enter a valid date of birth");
    }

    #[test]
    fn test_patient_errors_collected() {
        let err = new_patient(&json!({"name": "A", "dateOfBirth": "not a date"}), now()).unwrap_err();
        assert_eq!(err.errors().len(), 2);
        assert!(err.has_field("name"));
        assert!(err.has_field("dateOfBirth"));
    }

    #[test]
    fn test_patient_changes_partial() {
        let changes = patient_changes(&json!({"name": "New Name"}), now()).unwrap();
        assert_eq!(changes.name.as_deref(), Some("New Name"));
        assert!(changes.date_of_birth.is_none());
    }

    #[test]
    fn test_new_medication() {
        let med = new_medication(
            &json!({"name": "Lisinopril", "dosage": "10mg", "frequency": "Once daily"}),
            now(),
        )
        .unwrap();
        assert_eq!(med.name, "Lisinopril");

        let err = new_medication(&json!({"name": "L", "dosage": "", "frequency": "y".repeat(101)}), now())
            .unwrap_err();
        let messages: Vec<_> = err.errors().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Medication name must be at least 2 characters",
                "Dosage is required",
                "Frequency must be less than 100 characters",
            ]
        );
    }

    #[test]
    fn test_medication_changes_rejects_long_dosage() {
        let err = medication_changes(&json!({"dosage": "m".repeat(51)}), now()).unwrap_err();
        assert_eq!(err.errors()[0].message, "Dosage must be less than 50 characters");
    }

    #[test]
    fn test_new_assignment_valid() {
        let a = new_assignment(
            &json!({"patientId": 1, "medicationId": 2, "startDate": "2024-06-15", "days": 30}),
            now(),
        )
        .unwrap();
        assert_eq!(a.patient_id, 1);
        assert_eq!(a.medication_id, 2);
        assert_eq!(a.days, 30);
    }

    #[test]
    fn test_start_date_window() {
        // Midnight today is 12h before `now`: inside the one-day grace.
        let body = json!({"patientId": 1, "medicationId": 1, "startDate": "2024-06-15", "days": 1});
        assert!(new_assignment(&body, now()).is_ok());

        // Midnight yesterday is 36h before `now`.
        let body = json!({"patientId": 1, "medicationId": 1, "startDate": "2024-06-14", "days": 1});
        let err = new_assignment(&body, now()).unwrap_err();
        assert_eq!(err.errors()[0].message, "Start date cannot be more than 1 day in the past");

        // Exactly at the next midnight, yesterday is exactly 24h back.
        let next_day = now().date_naive().succ_opt().unwrap();
        let midnight = crate::models::start_of_day(next_day);
        let body = json!({"patientId": 1, "medicationId": 1, "startDate": "2024-06-15", "days": 1});
        assert!(new_assignment(&body, midnight).is_ok());
        assert!(new_assignment(&body, midnight + Duration::seconds(1)).is_err());
    }

    #[test]
    fn test_assignment_errors_collected() {
        let err = new_assignment(
            &json!({"patientId": 0, "medicationId": 1.5, "days": 400}),
            now(),
        )
        .unwrap_err();
        let fields: Vec<_> = err.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["patientId", "medicationId", "startDate", "days"]);
        assert_eq!(err.errors()[3].message, "Treatment cannot exceed 365 days");
    }

    #[test]
    fn test_assignment_changes() {
        let changes = assignment_changes(&json!({"days": 12}), now()).unwrap();
        assert_eq!(changes.days, Some(12));
        assert!(changes.patient_id.is_none());

        let err = assignment_changes(&json!({"days": 0}), now()).unwrap_err();
        assert_eq!(err.errors()[0].message, "Treatment must be at least 1 day");
    }

    #[test]
    fn test_numbers_are_not_coerced_to_text_or_dates() {
        let err = new_patient(&json!({"name": 12, "dateOfBirth": 631152000000i64}), now()).unwrap_err();
        assert_eq!(err.errors()[0].field, "name");
        assert_eq!(err.errors()[0].message, "name must be a string");
        assert_eq!(err.errors()[1].field, "dateOfBirth");
        assert_eq!(err.errors()[1].message, "dateOfBirth must be a valid date");

        let err = new_medication(&json!({"name": "Aspirin", "dosage": 81, "frequency": "Daily"}), now())
            .unwrap_err();
        assert!(err.has_field("dosage"));
    }
}
