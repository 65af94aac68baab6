use serde::{Deserialize, Serialize};

/// Liveness response served by `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub ok: bool,
    pub message: String,
}

impl HealthStatus {
    pub fn alive() -> Self {
        Self {
            ok: true,
            message: "MedTrack API is alive".into(),
        }
    }
}
