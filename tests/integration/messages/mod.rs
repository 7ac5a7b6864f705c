//! Message relay + AI responder integration tests (PostgreSQL-backed,
//! `#[ignore]`d). The completion service is the deterministic mock.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use medlink_consultations::ConsultationStatus;
use medlink_memory::MemoryStore;

use crate::common::{create_test_jwt, TestApp};

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

async fn parse_body(response: axum::http::Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Fetch the message history until an AI message shows up (the responder
/// runs as a detached task) or the deadline passes.
async fn wait_for_ai_message(app: &TestApp, uri: &str, jwt: &str) -> Option<Value> {
    for _ in 0..40 {
        let req = authed_request(Method::GET, uri, jwt, None);
        let resp = app.router().oneshot(req).await.unwrap();
        let body = parse_body(resp).await;
        if let Some(ai) = body
            .as_array()
            .unwrap()
            .iter()
            .find(|m| m["message_type"] == "ai")
        {
            return Some(ai.clone());
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    None
}

mod test_send_message {
    use super::*;

    // Scenario: active consultation, patient sends, message is persisted
    // with message_type=user
    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_send_in_active_consultation() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();
        let consultation = app
            .create_test_consultation(patient.id, doctor.id, ConsultationStatus::Active)
            .await
            .unwrap();
        let jwt = create_test_jwt(&patient, &app.config.jwt_secret).unwrap();

        let uri = format!("/v1/consultations/{}/messages", consultation.id);
        let req = authed_request(Method::POST, &uri, &jwt, Some(json!({ "content": "hello" })));

        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = parse_body(resp).await;
        assert_eq!(body["message_type"], "user");
        assert_eq!(body["content"], "hello");
        assert_eq!(body["sender_role"], "patient");

        // Context window picked up the labeled line
        let context = app.memory.get_context(consultation.id).await.unwrap();
        assert_eq!(context, vec!["patient: hello"]);

        // The durable history returns it
        let req = authed_request(Method::GET, &uri, &jwt, None);
        let resp = app.router().oneshot(req).await.unwrap();
        let body = parse_body(resp).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_send_fails_off_active_for_both_roles() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();

        let pending = app
            .create_test_consultation(patient.id, doctor.id, ConsultationStatus::Pending)
            .await
            .unwrap();

        for user in [&patient, &doctor] {
            let jwt = create_test_jwt(user, &app.config.jwt_secret).unwrap();
            let uri = format!("/v1/consultations/{}/messages", pending.id);
            let req =
                authed_request(Method::POST, &uri, &jwt, Some(json!({ "content": "hello" })));
            let resp = app.router().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::CONFLICT);
            let body = parse_body(resp).await;
            assert_eq!(body["error"]["code"], "INVALID_STATE");
        }

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_stranger_cannot_send() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();
        let stranger = app.create_test_patient().await.unwrap();
        let consultation = app
            .create_test_consultation(patient.id, doctor.id, ConsultationStatus::Active)
            .await
            .unwrap();
        let jwt = create_test_jwt(&stranger, &app.config.jwt_secret).unwrap();

        let uri = format!("/v1/consultations/{}/messages", consultation.id);
        let req = authed_request(Method::POST, &uri, &jwt, Some(json!({ "content": "hi" })));
        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_script_content_sanitized_before_storage() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();
        let consultation = app
            .create_test_consultation(patient.id, doctor.id, ConsultationStatus::Active)
            .await
            .unwrap();
        let jwt = create_test_jwt(&patient, &app.config.jwt_secret).unwrap();

        let uri = format!("/v1/consultations/{}/messages", consultation.id);
        let req = authed_request(
            Method::POST,
            &uri,
            &jwt,
            Some(json!({ "content": "hi <script>alert('x')</script> doc" })),
        );

        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = parse_body(resp).await;
        assert_eq!(body["content"], "hi  doc");

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_whitespace_only_content_rejected() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();
        let consultation = app
            .create_test_consultation(patient.id, doctor.id, ConsultationStatus::Active)
            .await
            .unwrap();
        let jwt = create_test_jwt(&patient, &app.config.jwt_secret).unwrap();

        let uri = format!("/v1/consultations/{}/messages", consultation.id);
        let req = authed_request(Method::POST, &uri, &jwt, Some(json!({ "content": "   " })));
        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        app.cleanup().await.unwrap();
    }
}

mod test_ai_responder {
    use super::*;

    // Scenario: doctor sends "@ai patient has a fever, advise rest" in an
    // active consultation; a memory entry is stored with the marker stripped
    // and an AI message is persisted
    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_doctor_mention_stores_memory_and_replies() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();
        let consultation = app
            .create_test_consultation(patient.id, doctor.id, ConsultationStatus::Active)
            .await
            .unwrap();
        let jwt = create_test_jwt(&doctor, &app.config.jwt_secret).unwrap();

        let uri = format!("/v1/consultations/{}/messages", consultation.id);
        let req = authed_request(
            Method::POST,
            &uri,
            &jwt,
            Some(json!({ "content": "@ai patient has a fever, advise rest" })),
        );
        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let ai = wait_for_ai_message(&app, &uri, &jwt)
            .await
            .expect("AI reply should be persisted");
        assert!(ai["sender_id"].is_null());
        assert_eq!(ai["sender_name"], "AI Assistant");
        assert_eq!(ai["sender_role"], "ai");

        // The doctor's statement became an advice_<ts> memory, marker stripped
        let memories = app.memory.get_all_memories(consultation.id).await.unwrap();
        assert_eq!(memories.len(), 1);
        let (key, value) = memories.iter().next().unwrap();
        assert!(key.starts_with("advice_"), "unexpected key {}", key);
        assert_eq!(value, "patient has a fever, advise rest");

        // AI reply joined the context window
        let context = app.memory.get_context(consultation.id).await.unwrap();
        assert!(context.iter().any(|line| line.starts_with("AI: ")));

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_patient_mention_replies_without_memory() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();
        let consultation = app
            .create_test_consultation(patient.id, doctor.id, ConsultationStatus::Active)
            .await
            .unwrap();
        let jwt = create_test_jwt(&patient, &app.config.jwt_secret).unwrap();

        let uri = format!("/v1/consultations/{}/messages", consultation.id);
        let req = authed_request(
            Method::POST,
            &uri,
            &jwt,
            Some(json!({ "content": "@ai what helps a sore throat?" })),
        );
        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        assert!(wait_for_ai_message(&app, &uri, &jwt).await.is_some());

        let memories = app.memory.get_all_memories(consultation.id).await.unwrap();
        assert!(memories.is_empty(), "patient mentions record no memory");

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_plain_message_never_triggers_ai() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();
        let consultation = app
            .create_test_consultation(patient.id, doctor.id, ConsultationStatus::Active)
            .await
            .unwrap();
        let jwt = create_test_jwt(&patient, &app.config.jwt_secret).unwrap();

        let uri = format!("/v1/consultations/{}/messages", consultation.id);
        let req = authed_request(
            Method::POST,
            &uri,
            &jwt,
            Some(json!({ "content": "just checking in" })),
        );
        app.router().oneshot(req).await.unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;

        let req = authed_request(Method::GET, &uri, &jwt, None);
        let resp = app.router().oneshot(req).await.unwrap();
        let body = parse_body(resp).await;
        assert!(body
            .as_array()
            .unwrap()
            .iter()
            .all(|m| m["message_type"] == "user"));

        app.cleanup().await.unwrap();
    }
}

mod test_message_history {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_history_pagination() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();
        let consultation = app
            .create_test_consultation(patient.id, doctor.id, ConsultationStatus::Active)
            .await
            .unwrap();
        let jwt = create_test_jwt(&patient, &app.config.jwt_secret).unwrap();

        let uri = format!("/v1/consultations/{}/messages", consultation.id);
        for i in 0..5 {
            let req = authed_request(
                Method::POST,
                &uri,
                &jwt,
                Some(json!({ "content": format!("line {}", i) })),
            );
            app.router().oneshot(req).await.unwrap();
        }

        let req = authed_request(Method::GET, &format!("{}?limit=2&offset=2", uri), &jwt, None);
        let resp = app.router().oneshot(req).await.unwrap();
        let body = parse_body(resp).await;
        let page = body.as_array().unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0]["content"], "line 2");
        assert_eq!(page[1]["content"], "line 3");

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires TEST_DATABASE_URL
    async fn test_doctor_loses_history_when_inactive() {
        let app = TestApp::new().await.unwrap();
        let patient = app.create_test_patient().await.unwrap();
        let doctor = app.create_test_doctor().await.unwrap();
        let consultation = app
            .create_test_consultation(patient.id, doctor.id, ConsultationStatus::Inactive)
            .await
            .unwrap();

        let uri = format!("/v1/consultations/{}/messages", consultation.id);

        let jwt = create_test_jwt(&doctor, &app.config.jwt_secret).unwrap();
        let resp = app
            .router()
            .oneshot(authed_request(Method::GET, &uri, &jwt, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        // The patient still reads the archive
        let jwt = create_test_jwt(&patient, &app.config.jwt_secret).unwrap();
        let resp = app
            .router()
            .oneshot(authed_request(Method::GET, &uri, &jwt, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        app.cleanup().await.unwrap();
    }
}
