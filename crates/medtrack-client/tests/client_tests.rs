//! Client tests against real servers on ephemeral ports.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use medtrack_api::{router, AppState};
use medtrack_client::{ClientConfig, ClientError, MedTrackClient};
use medtrack_core::{
    AssignmentChanges, MedTrack, NewAssignment, NewMedication, NewPatient, PatientChanges,
    TreatmentStatus,
};

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base_url: &str, attempts: u32) -> MedTrackClient {
    let config = ClientConfig::new(base_url)
        .with_timeout(Duration::from_secs(5))
        .with_retries(attempts, Duration::from_millis(10));
    MedTrackClient::new(config).unwrap()
}

async fn medtrack_server() -> MedTrackClient {
    let records = MedTrack::open_in_memory().unwrap();
    let base = spawn(router(AppState::new(records))).await;
    client(&base, 3)
}

/// A server whose `/patients` GET fails `failures` times before answering.
/// Every hit on `/patients` is counted, POSTs included.
async fn flaky_server(failures: usize) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));

    let get_hits = hits.clone();
    let post_hits = hits.clone();
    let app = Router::new().route(
        "/patients",
        get(move || {
            let hits = get_hits.clone();
            async move {
                let n = hits.fetch_add(1, Ordering::SeqCst);
                if n < failures {
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        Json(json!({"statusCode": 503, "message": "warming up"})),
                    )
                } else {
                    (StatusCode::OK, Json(json!([])))
                }
            }
        })
        .post(move |_body: Json<Value>| {
            let hits = post_hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"statusCode": 500, "message": "Internal server error"})),
                )
            }
        }),
    );

    (spawn(app).await, hits)
}

#[tokio::test]
async fn test_full_round_trip() {
    let client = medtrack_server().await;
    let today = Utc::now().date_naive();

    assert!(client.health().await.unwrap().ok);

    let patient = client
        .create_patient(&NewPatient {
            name: "John Doe".into(),
            date_of_birth: "1980-05-20".parse().unwrap(),
        })
        .await
        .unwrap();
    let medication = client
        .create_medication(&NewMedication {
            name: "Metformin".into(),
            dosage: "850mg".into(),
            frequency: "Twice daily".into(),
        })
        .await
        .unwrap();
    let assignment = client
        .create_assignment(&NewAssignment {
            patient_id: patient.id,
            medication_id: medication.id,
            start_date: today,
            days: 30,
        })
        .await
        .unwrap();

    let renamed = client
        .update_patient(
            patient.id,
            &PatientChanges {
                name: Some("John Q. Doe".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.date_of_birth, patient.date_of_birth);

    let longer = client
        .update_assignment(
            assignment.id,
            &AssignmentChanges {
                days: Some(60),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(longer.days, 60);

    let detail = client.get_patient(patient.id).await.unwrap();
    assert_eq!(detail.patient.name, "John Q. Doe");
    assert_eq!(
        detail.assignments[0].medication.as_ref().unwrap().name,
        "Metformin"
    );

    let rows = client.assignments_with_remaining_days().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, Some(TreatmentStatus::Active));
    assert!(rows[0].remaining_days.unwrap() >= 59);

    client.delete_assignment(assignment.id).await.unwrap();
    assert!(client.list_assignments().await.unwrap().is_empty());

    client.delete_medication(medication.id).await.unwrap();
    client.delete_patient(patient.id).await.unwrap();
    assert!(client.list_patients().await.unwrap().is_empty());
    assert!(client.list_medications().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_validation_failure_surfaces_field_errors() {
    let client = medtrack_server().await;

    let err = client
        .create_patient(&NewPatient {
            name: "A".into(),
            date_of_birth: "1990-01-01".parse().unwrap(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    assert_eq!(err.field_errors()[0].field, "name");
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let client = medtrack_server().await;
    let err = client.get_medication(42).await.unwrap_err();

    match err {
        ClientError::Api {
            status,
            message,
            path,
            ..
        } => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(message, "Medication with ID 42 not found");
            assert_eq!(path.as_deref(), Some("/medications/42"));
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_is_retried_after_server_errors() {
    let (base, hits) = flaky_server(2).await;
    let client = client(&base, 3);

    let patients = client.list_patients().await.unwrap();
    assert!(patients.is_empty());
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_get_gives_up_after_configured_attempts() {
    let (base, hits) = flaky_server(usize::MAX).await;
    let client = client(&base, 3);

    let err = client.list_patients().await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_post_is_never_retried() {
    let (base, hits) = flaky_server(0).await;
    let client = client(&base, 3);

    let err = client
        .create_patient(&NewPatient {
            name: "John Doe".into(),
            date_of_birth: "1980-05-20".parse().unwrap(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_slow_responses_time_out_and_are_retried() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/health",
        get(move || {
            let hits = counter.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({"ok": true, "message": "late"}))
            }
        }),
    );
    let base = spawn(app).await;

    let config = ClientConfig::new(base)
        .with_timeout(Duration::from_millis(100))
        .with_retries(2, Duration::from_millis(10));
    let client = MedTrackClient::new(config).unwrap();

    let err = client.health().await.unwrap_err();
    match &err {
        ClientError::Transport(e) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {other:?}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_connection_refused_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client(&format!("http://{addr}"), 2);
    let err = client.health().await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
    assert!(err.is_retryable());
}
