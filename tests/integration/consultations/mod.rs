//! Consultation lifecycle integration tests (PostgreSQL-backed, `#[ignore]`d)

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use medlink_consultations::ConsultationStatus;

use crate::common::{create_test_jwt, TestApp};

/// Helper: build an authenticated request
fn authed_request(method: Method, uri: &str, jwt: &str, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", jwt));

    if let Some(b) = body {
        builder = builder.header("content-type", "application/json");
        builder
            .body(Body::from(serde_json::to_string(&b).unwrap()))
            .unwrap()
    } else {
        builder.body(Body::empty()).unwrap()
    }
}

/// Helper: parse response body as JSON Value
async fn parse_body(response: axum::http::Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

mod test_create_consultation {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_patient_creates_pending_consultation() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();
        let jwt = create_test_jwt(&patient, &app.config.jwt_secret).unwrap();

        let req = authed_request(
            Method::POST,
            "/v1/consultations",
            &jwt,
            Some(json!({
                "title": "Skin rash",
                "description": "Itchy rash on both arms since Monday.",
                "doctor_id": doctor.id,
            })),
        );

        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = parse_body(resp).await;
        assert_eq!(body["status"], "pending");
        assert_eq!(body["patient_id"], patient.id.to_string());
        assert_eq!(body["doctor_id"], doctor.id.to_string());

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_doctor_cannot_create_consultation() {
        let app = TestApp::new().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();
        let other_doctor = app.create_test_doctor().await.unwrap();
        let jwt = create_test_jwt(&doctor, &app.config.jwt_secret).unwrap();

        let req = authed_request(
            Method::POST,
            "/v1/consultations",
            &jwt,
            Some(json!({
                "title": "Skin rash",
                "description": "desc",
                "doctor_id": other_doctor.id,
            })),
        );

        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_unknown_doctor_returns_404() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let jwt = create_test_jwt(&patient, &app.config.jwt_secret).unwrap();

        let req = authed_request(
            Method::POST,
            "/v1/consultations",
            &jwt,
            Some(json!({
                "title": "Skin rash",
                "description": "desc",
                "doctor_id": Uuid::new_v4(),
            })),
        );

        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_self_assignment_returns_400() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let jwt = create_test_jwt(&patient, &app.config.jwt_secret).unwrap();

        let req = authed_request(
            Method::POST,
            "/v1/consultations",
            &jwt,
            Some(json!({
                "title": "Skin rash",
                "description": "desc",
                "doctor_id": patient.id,
            })),
        );

        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        app.cleanup().await.unwrap();
    }
}

mod test_lifecycle_transitions {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_accept_moves_pending_to_active() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();
        let consultation = app
            .create_test_consultation(patient.id, doctor.id, ConsultationStatus::Pending)
            .await
            .unwrap();
        let jwt = create_test_jwt(&doctor, &app.config.jwt_secret).unwrap();

        let req = authed_request(
            Method::POST,
            &format!("/v1/consultations/{}/accept", consultation.id),
            &jwt,
            None,
        );

        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = parse_body(resp).await;
        assert_eq!(body["status"], "active");

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_unassigned_doctor_cannot_accept() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();
        let interloper = app.create_test_doctor().await.unwrap();
        let consultation = app
            .create_test_consultation(patient.id, doctor.id, ConsultationStatus::Pending)
            .await
            .unwrap();
        let jwt = create_test_jwt(&interloper, &app.config.jwt_secret).unwrap();

        let req = authed_request(
            Method::POST,
            &format!("/v1/consultations/{}/accept", consultation.id),
            &jwt,
            None,
        );

        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        app.cleanup().await.unwrap();
    }

    // Scenario: doctor rejects a pending consultation; accepting afterwards
    // is an invalid transition
    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_reject_then_accept_conflicts() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();
        let consultation = app
            .create_test_consultation(patient.id, doctor.id, ConsultationStatus::Pending)
            .await
            .unwrap();
        let jwt = create_test_jwt(&doctor, &app.config.jwt_secret).unwrap();

        let reject = authed_request(
            Method::POST,
            &format!("/v1/consultations/{}/reject", consultation.id),
            &jwt,
            None,
        );
        let resp = app.router().oneshot(reject).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = parse_body(resp).await;
        assert_eq!(body["status"], "inactive");

        let accept = authed_request(
            Method::POST,
            &format!("/v1/consultations/{}/accept", consultation.id),
            &jwt,
            None,
        );
        let resp = app.router().oneshot(accept).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body = parse_body(resp).await;
        assert_eq!(body["error"]["code"], "INVALID_STATE");

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_end_requires_active() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();
        let jwt = create_test_jwt(&doctor, &app.config.jwt_secret).unwrap();

        let active = app
            .create_test_consultation(patient.id, doctor.id, ConsultationStatus::Active)
            .await
            .unwrap();
        let req = authed_request(
            Method::POST,
            &format!("/v1/consultations/{}/end", active.id),
            &jwt,
            None,
        );
        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(parse_body(resp).await["status"], "inactive");

        let pending = app
            .create_test_consultation(patient.id, doctor.id, ConsultationStatus::Pending)
            .await
            .unwrap();
        let req = authed_request(
            Method::POST,
            &format!("/v1/consultations/{}/end", pending.id),
            &jwt,
            None,
        );
        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        app.cleanup().await.unwrap();
    }

    // Scenario: two accept calls race on the same pending consultation;
    // exactly one succeeds
    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_concurrent_accepts_exactly_one_wins() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();
        let consultation = app
            .create_test_consultation(patient.id, doctor.id, ConsultationStatus::Pending)
            .await
            .unwrap();
        let jwt = create_test_jwt(&doctor, &app.config.jwt_secret).unwrap();

        let uri = format!("/v1/consultations/{}/accept", consultation.id);
        let first = app
            .router()
            .oneshot(authed_request(Method::POST, &uri, &jwt, None));
        let second = app
            .router()
            .oneshot(authed_request(Method::POST, &uri, &jwt, None));

        let (a, b) = tokio::join!(first, second);
        let statuses = [a.unwrap().status(), b.unwrap().status()];

        let wins = statuses.iter().filter(|s| **s == StatusCode::OK).count();
        let conflicts = statuses
            .iter()
            .filter(|s| **s == StatusCode::CONFLICT)
            .count();
        assert_eq!(wins, 1, "exactly one accept should win: {:?}", statuses);
        assert_eq!(conflicts, 1, "the loser should conflict: {:?}", statuses);

        app.cleanup().await.unwrap();
    }
}

mod test_reassignment {
    use super::*;

    // Scenario: reassignment is disallowed while the consultation is active
    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_reassign_blocked_while_active() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();
        let replacement = app.create_test_doctor().await.unwrap();
        let consultation = app
            .create_test_consultation(patient.id, doctor.id, ConsultationStatus::Active)
            .await
            .unwrap();
        let jwt = create_test_jwt(&patient, &app.config.jwt_secret).unwrap();

        let req = authed_request(
            Method::POST,
            &format!("/v1/consultations/{}/reassign", consultation.id),
            &jwt,
            Some(json!({ "doctor_id": replacement.id })),
        );

        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_reassign_inactive_resets_to_pending() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();
        let replacement = app.create_test_doctor().await.unwrap();
        let consultation = app
            .create_test_consultation(patient.id, doctor.id, ConsultationStatus::Inactive)
            .await
            .unwrap();
        let jwt = create_test_jwt(&patient, &app.config.jwt_secret).unwrap();

        let req = authed_request(
            Method::POST,
            &format!("/v1/consultations/{}/reassign", consultation.id),
            &jwt,
            Some(json!({ "doctor_id": replacement.id })),
        );

        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = parse_body(resp).await;
        assert_eq!(body["status"], "pending");
        assert_eq!(body["doctor_id"], replacement.id.to_string());

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_reassign_to_same_doctor_rejected() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();
        let consultation = app
            .create_test_consultation(patient.id, doctor.id, ConsultationStatus::Pending)
            .await
            .unwrap();
        let jwt = create_test_jwt(&patient, &app.config.jwt_secret).unwrap();

        let req = authed_request(
            Method::POST,
            &format!("/v1/consultations/{}/reassign", consultation.id),
            &jwt,
            Some(json!({ "doctor_id": doctor.id })),
        );

        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_only_owning_patient_can_reassign() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let other_patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();
        let replacement = app.create_test_doctor().await.unwrap();
        let consultation = app
            .create_test_consultation(patient.id, doctor.id, ConsultationStatus::Pending)
            .await
            .unwrap();
        let jwt = create_test_jwt(&other_patient, &app.config.jwt_secret).unwrap();

        let req = authed_request(
            Method::POST,
            &format!("/v1/consultations/{}/reassign", consultation.id),
            &jwt,
            Some(json!({ "doctor_id": replacement.id })),
        );

        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        app.cleanup().await.unwrap();
    }
}

mod test_visibility {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_patient_fetches_inactive_consultation() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();
        let consultation = app
            .create_test_consultation(patient.id, doctor.id, ConsultationStatus::Inactive)
            .await
            .unwrap();
        let jwt = create_test_jwt(&patient, &app.config.jwt_secret).unwrap();

        let req = authed_request(
            Method::GET,
            &format!("/v1/consultations/{}", consultation.id),
            &jwt,
            None,
        );
        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_doctor_cannot_fetch_inactive_consultation() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();
        let consultation = app
            .create_test_consultation(patient.id, doctor.id, ConsultationStatus::Inactive)
            .await
            .unwrap();
        let jwt = create_test_jwt(&doctor, &app.config.jwt_secret).unwrap();

        let req = authed_request(
            Method::GET,
            &format!("/v1/consultations/{}", consultation.id),
            &jwt,
            None,
        );
        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_doctor_listing_drops_inactive() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();

        app.create_test_consultation(patient.id, doctor.id, ConsultationStatus::Pending)
            .await
            .unwrap();
        app.create_test_consultation(patient.id, doctor.id, ConsultationStatus::Active)
            .await
            .unwrap();
        app.create_test_consultation(patient.id, doctor.id, ConsultationStatus::Inactive)
            .await
            .unwrap();

        // Doctor sees pending + active only
        let jwt = create_test_jwt(&doctor, &app.config.jwt_secret).unwrap();
        let req = authed_request(Method::GET, "/v1/consultations", &jwt, None);
        let resp = app.router().oneshot(req).await.unwrap();
        let body = parse_body(resp).await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        // The patient keeps all three indefinitely
        let jwt = create_test_jwt(&patient, &app.config.jwt_secret).unwrap();
        let req = authed_request(Method::GET, "/v1/consultations", &jwt, None);
        let resp = app.router().oneshot(req).await.unwrap();
        let body = parse_body(resp).await;
        assert_eq!(body.as_array().unwrap().len(), 3);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_status_filter() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();

        app.create_test_consultation(patient.id, doctor.id, ConsultationStatus::Pending)
            .await
            .unwrap();
        app.create_test_consultation(patient.id, doctor.id, ConsultationStatus::Active)
            .await
            .unwrap();

        let jwt = create_test_jwt(&doctor, &app.config.jwt_secret).unwrap();
        let req = authed_request(Method::GET, "/v1/consultations?status=pending", &jwt, None);
        let resp = app.router().oneshot(req).await.unwrap();
        let body = parse_body(resp).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["status"], "pending");

        app.cleanup().await.unwrap();
    }
}
