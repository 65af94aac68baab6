//! CRUD services over the database.
//!
//! [`MedTrack`] owns the connection behind a mutex; every public call takes
//! the lock once and runs as a single unit of work. Inputs arrive as raw JSON
//! and are checked against the tables in [`crate::validation`] before
//! anything touches the store.

mod assignments;
mod medications;
mod patients;

use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db::{Database, DbError};
use crate::validation::ValidationErrors;

/// Record types addressed by ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Patient,
    Medication,
    Assignment,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::Patient => "Patient",
            Entity::Medication => "Medication",
            Entity::Assignment => "Assignment",
        })
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: Entity, id: i64 },

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl<T> From<std::sync::PoisonError<T>> for ServiceError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ServiceError::LockPoisoned(e.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

fn not_found(entity: Entity, id: i64) -> ServiceError {
    ServiceError::NotFound { entity, id }
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Thread-safe service facade over a [`Database`].
#[derive(Clone)]
pub struct MedTrack {
    db: Arc<Mutex<Database>>,
    clock: Clock,
}

impl fmt::Debug for MedTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MedTrack").finish_non_exhaustive()
    }
}

impl MedTrack {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            clock: Arc::new(Utc::now),
        }
    }

    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> ServiceResult<Self> {
        Ok(Self::new(Database::open(path)?))
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> ServiceResult<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    /// Replace the wall clock used for date validation and remaining days.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn lock(&self) -> ServiceResult<MutexGuard<'_, Database>> {
        Ok(self.db.lock()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_not_found_message() {
        let err = not_found(Entity::Medication, 12);
        assert_eq!(err.to_string(), "Medication with ID 12 not found");
    }

    #[test]
    fn test_fixed_clock() {
        let fixed = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let service = MedTrack::open_in_memory().unwrap().with_clock(move || fixed);
        assert_eq!(service.now(), fixed);
    }

    #[test]
    fn test_validation_error_is_transparent() {
        let err: ServiceError = ValidationErrors::single("name", "Name is required").into();
        assert_eq!(err.to_string(), "Validation failed: name: Name is required");
    }
}
