//! MedTrack REST API
//!
//! axum routes over [`medtrack_core::MedTrack`]. Every error leaves the
//! server as the same JSON shape:
//!
//! ```text
//! { "statusCode": 404, "message": "Patient with ID 7 not found",
//!   "timestamp": "...", "path": "/patients/7", "method": "GET" }
//! ```
//!
//! Validation failures add `"errors": [{ "field", "message" }, ...]`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;

use axum::routing::get;
use axum::Router;

use medtrack_core::MedTrack;

pub use config::{Config, ConfigError, CorsOrigin, DatabaseLocation};
pub use error::{ApiError, ErrorBody};

/// Shared state for all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub records: MedTrack,
}

impl AppState {
    pub fn new(records: MedTrack) -> Self {
        Self { records }
    }
}

/// Routes and error rendering, without CORS or request logging.
pub fn router(state: AppState) -> Router {
    use handlers::{assignments, health, medications, patients};

    Router::new()
        .route("/health", get(health::check))
        .route("/patients", get(patients::list).post(patients::create))
        .route(
            "/patients/:id",
            get(patients::get)
                .patch(patients::update)
                .delete(patients::remove),
        )
        .route(
            "/medications",
            get(medications::list).post(medications::create),
        )
        .route(
            "/medications/:id",
            get(medications::get)
                .patch(medications::update)
                .delete(medications::remove),
        )
        .route(
            "/assignments",
            get(assignments::list).post(assignments::create),
        )
        .route(
            "/assignments/with-remaining-days",
            get(assignments::with_remaining_days),
        )
        .route(
            "/assignments/:id",
            get(assignments::get)
                .patch(assignments::update)
                .delete(assignments::remove),
        )
        .fallback(handlers::not_found)
        .layer(axum::middleware::from_fn(middleware::render_errors))
        .with_state(state)
}

/// The full application as served: routes plus CORS and, in development,
/// per-request logging.
pub fn app(state: AppState, config: &Config) -> Router {
    let mut app = router(state);
    if config.request_logging() {
        app = app.layer(axum::middleware::from_fn(middleware::log_requests));
    }
    app.layer(config.cors_layer())
}
