//! MedTrack Core Library
//!
//! Patients, medications, and treatment assignments over SQLite, with a
//! derived "remaining days of treatment" view.
//!
//! # Architecture
//!
//! ```text
//!   raw JSON input
//!        │
//!        ▼
//!   validation (constraint tables, all errors collected)
//!        │
//!        ▼
//!   service::MedTrack ──► referential checks (patient / medication exist)
//!        │
//!        ▼
//!   db::Database (rusqlite, foreign keys, ON DELETE CASCADE)
//!        │
//!        ▼
//!   reads: joined relations + treatment window computed at read time
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite database layer
//! - [`models`]: Domain types (Patient, Medication, Assignment, details)
//! - [`validation`]: Per-entity constraint tables and the validator
//! - [`treatment`]: Remaining-days arithmetic and treatment status
//! - [`service`]: CRUD services with not-found and validation semantics

pub mod db;
pub mod models;
pub mod service;
pub mod treatment;
pub mod validation;

// Re-export commonly used types
pub use db::{Database, DbError};
pub use models::{
    Assignment, AssignmentChanges, AssignmentDetail, HealthStatus, Medication, MedicationChanges,
    MedicationDetail, NewAssignment, NewMedication, NewPatient, Patient, PatientChanges,
    PatientDetail,
};
pub use service::{Entity, MedTrack, ServiceError, ServiceResult};
pub use treatment::{remaining_days, TreatmentStatus};
pub use validation::{FieldError, ValidationErrors};
