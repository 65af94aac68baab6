//! MedTrack API client
//!
//! Typed async calls for every endpoint of the MedTrack REST API.
//!
//! Every request carries the configured timeout. GETs are retried on
//! transport failures and 5xx responses, waiting `backoff * n` before
//! attempt `n + 1`; POST, PATCH and DELETE are sent exactly once.
//!
//! ```no_run
//! # async fn run() -> medtrack_client::ClientResult<()> {
//! use medtrack_client::{ClientConfig, MedTrackClient};
//!
//! let client = MedTrackClient::new(ClientConfig::new("http://localhost:8080"))?;
//! for row in client.assignments_with_remaining_days().await? {
//!     println!("{}: {:?} days left", row.assignment.id, row.remaining_days);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};

use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_retry::RetryIf;

use medtrack_core::{
    Assignment, AssignmentChanges, AssignmentDetail, HealthStatus, Medication, MedicationChanges,
    MedicationDetail, NewAssignment, NewMedication, NewPatient, Patient, PatientChanges,
    PatientDetail,
};

#[derive(Debug, Clone)]
pub struct MedTrackClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl MedTrackClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Client configured from `API_BASE_URL`, `API_TIMEOUT_MS` and `RETRY_ATTEMPTS`.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn health(&self) -> ClientResult<HealthStatus> {
        self.get("/health").await
    }

    // Patients

    pub async fn create_patient(&self, patient: &NewPatient) -> ClientResult<Patient> {
        self.send(Method::POST, "/patients", patient).await
    }

    pub async fn list_patients(&self) -> ClientResult<Vec<PatientDetail>> {
        self.get("/patients").await
    }

    pub async fn get_patient(&self, id: i64) -> ClientResult<PatientDetail> {
        self.get(&format!("/patients/{id}")).await
    }

    pub async fn update_patient(&self, id: i64, changes: &PatientChanges) -> ClientResult<Patient> {
        self.send(Method::PATCH, &format!("/patients/{id}"), changes).await
    }

    pub async fn delete_patient(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("/patients/{id}")).await
    }

    // Medications

    pub async fn create_medication(&self, medication: &NewMedication) -> ClientResult<Medication> {
        self.send(Method::POST, "/medications", medication).await
    }

    pub async fn list_medications(&self) -> ClientResult<Vec<MedicationDetail>> {
        self.get("/medications").await
    }

    pub async fn get_medication(&self, id: i64) -> ClientResult<MedicationDetail> {
        self.get(&format!("/medications/{id}")).await
    }

    pub async fn update_medication(
        &self,
        id: i64,
        changes: &MedicationChanges,
    ) -> ClientResult<Medication> {
        self.send(Method::PATCH, &format!("/medications/{id}"), changes).await
    }

    pub async fn delete_medication(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("/medications/{id}")).await
    }

    // Assignments

    pub async fn create_assignment(&self, assignment: &NewAssignment) -> ClientResult<Assignment> {
        self.send(Method::POST, "/assignments", assignment).await
    }

    pub async fn list_assignments(&self) -> ClientResult<Vec<AssignmentDetail>> {
        self.get("/assignments").await
    }

    /// Assignments with `remaining_days` and `status` filled in by the server.
    pub async fn assignments_with_remaining_days(&self) -> ClientResult<Vec<AssignmentDetail>> {
        self.get("/assignments/with-remaining-days").await
    }

    pub async fn get_assignment(&self, id: i64) -> ClientResult<AssignmentDetail> {
        self.get(&format!("/assignments/{id}")).await
    }

    pub async fn update_assignment(
        &self,
        id: i64,
        changes: &AssignmentChanges,
    ) -> ClientResult<Assignment> {
        self.send(Method::PATCH, &format!("/assignments/{id}"), changes).await
    }

    pub async fn delete_assignment(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("/assignments/{id}")).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        RetryIf::spawn(
            self.config.retry_delays(),
            || self.get_once::<T>(path),
            |err: &ClientError| {
                let retryable = err.is_retryable();
                if retryable {
                    tracing::warn!(path, error = %err, "GET failed");
                }
                retryable
            },
        )
        .await
    }

    async fn get_once<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        tracing::debug!(path, "GET");
        let response = self.http.get(self.url(path)).send().await?;
        read_json(response).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(%method, path, "sending");
        let response = self
            .http
            .request(method, self.url(path))
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }

    async fn delete(&self, path: &str) -> ClientResult<()> {
        tracing::debug!(path, "DELETE");
        let response = self.http.delete(self.url(path)).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.bytes().await?;
            Err(ClientError::from_response(status, &body))
        }
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json().await?)
    } else {
        let body = response.bytes().await?;
        Err(ClientError::from_response(status, &body))
    }
}
