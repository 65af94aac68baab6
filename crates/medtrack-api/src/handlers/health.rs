use axum::Json;

use medtrack_core::HealthStatus;

pub async fn check() -> Json<HealthStatus> {
    Json(HealthStatus::alive())
}
