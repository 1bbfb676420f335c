mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;
use tokio::sync::mpsc;

use common::{InMemoryRegistrationRepository, create_test_state, test_router};
use registration_service::domain::confirmation_event::ConfirmationEmail;

struct Harness {
    server: TestServer,
    repo: Arc<InMemoryRegistrationRepository>,
    rx: mpsc::Receiver<ConfirmationEmail>,
}

fn harness() -> Harness {
    let repo = Arc::new(InMemoryRegistrationRepository::new());
    let (state, rx) = create_test_state(repo.clone());

    Harness {
        server: TestServer::new(test_router(state)).unwrap(),
        repo,
        rx,
    }
}

async fn start(server: &TestServer, email: &str) -> serde_json::Value {
    let response = server
        .post("/api/registrations")
        .json(&json!({ "email": email }))
        .await;

    response.assert_status(StatusCode::CREATED);
    response.json::<serde_json::Value>()
}

#[tokio::test]
async fn test_start_registration_issues_code() {
    let mut h = harness();

    let body = start(&h.server, "user@example.com").await;

    assert_eq!(body["email"], "user@example.com");
    assert_eq!(body["step"], "email_confirmation");
    assert!(body["code_expires_at"].is_string());
    assert!(body.get("code_hash").is_none());

    let event = h.rx.try_recv().unwrap();
    assert_eq!(event.email, "user@example.com");
    assert_eq!(event.code.len(), 6);
}

#[tokio::test]
async fn test_start_rejects_invalid_email_with_checklist() {
    let h = harness();

    let response = h
        .server
        .post("/api/registrations")
        .json(&json!({ "email": "user@localhost" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"]["code"], "validation_error");

    let checks = &body["error"]["details"]["checks"];
    assert_eq!(checks["contains_one_at_and_dot"], false);
    assert_eq!(checks["uses_only_allowed_characters"], true);
    assert_eq!(checks["has_valid_domain"], false);
    assert_eq!(checks["is_fully_valid"], false);
}

#[tokio::test]
async fn test_full_wizard_flow() {
    let mut h = harness();

    // Step 1: email entry -> confirmation code issued.
    let body = start(&h.server, "user@example.com").await;
    let id = body["id"].as_i64().unwrap();

    let event = h.rx.recv().await.unwrap();

    // Step 2: confirm with the delivered code.
    let response = h
        .server
        .post(&format!("/api/registrations/{id}/confirm"))
        .json(&json!({ "code": event.code }))
        .await;

    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["step"], "profile_setup");
    assert!(body["confirmed_at"].is_string());

    // Step 3: fill in the profile.
    let response = h
        .server
        .patch(&format!("/api/registrations/{id}/profile"))
        .json(&json!({ "display_name": "Danil", "bio": "Hello there" }))
        .await;

    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["display_name"], "Danil");
    assert_eq!(body["bio"], "Hello there");

    // Step 4: submit.
    let response = h
        .server
        .post(&format!("/api/registrations/{id}/submit"))
        .await;

    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["step"], "submitting");
    assert!(body["completed_at"].is_string());
}

#[tokio::test]
async fn test_confirm_with_wrong_code() {
    let mut h = harness();

    let body = start(&h.server, "user@example.com").await;
    let id = body["id"].as_i64().unwrap();

    let event = h.rx.recv().await.unwrap();
    let wrong = if event.code == "000000" {
        "000001"
    } else {
        "000000"
    };

    let response = h
        .server
        .post(&format!("/api/registrations/{id}/confirm"))
        .json(&json!({ "code": wrong }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    // Still awaiting confirmation.
    let state = h
        .server
        .get(&format!("/api/registrations/{id}"))
        .await
        .json::<serde_json::Value>();
    assert_eq!(state["step"], "email_confirmation");
}

#[tokio::test]
async fn test_confirm_with_expired_code_is_gone() {
    let mut h = harness();

    let body = start(&h.server, "user@example.com").await;
    let id = body["id"].as_i64().unwrap();
    let event = h.rx.recv().await.unwrap();

    h.repo.expire_code(id);

    let response = h
        .server
        .post(&format!("/api/registrations/{id}/confirm"))
        .json(&json!({ "code": event.code }))
        .await;

    response.assert_status(StatusCode::GONE);
}

#[tokio::test]
async fn test_resend_issues_fresh_code() {
    let mut h = harness();

    let body = start(&h.server, "user@example.com").await;
    let id = body["id"].as_i64().unwrap();
    let first = h.rx.recv().await.unwrap();

    let response = h
        .server
        .post(&format!("/api/registrations/{id}/resend"))
        .await;

    response.assert_status_ok();

    let second = h.rx.recv().await.unwrap();
    assert_eq!(second.email, "user@example.com");

    // The first code was superseded; only the fresh one confirms.
    let response = h
        .server
        .post(&format!("/api/registrations/{id}/confirm"))
        .json(&json!({ "code": second.code }))
        .await;

    response.assert_status_ok();

    // Codes can collide by chance; only assert rejection when they differ.
    if first.code != second.code {
        let body = start(&h.server, "other@example.com").await;
        let other_id = body["id"].as_i64().unwrap();
        let other_code = h.rx.recv().await.unwrap().code;

        if other_code != first.code {
            let response = h
                .server
                .post(&format!("/api/registrations/{other_id}/confirm"))
                .json(&json!({ "code": first.code }))
                .await;

            response.assert_status(StatusCode::BAD_REQUEST);
        }
    }
}

#[tokio::test]
async fn test_duplicate_email_conflicts_after_completion() {
    let mut h = harness();

    let body = start(&h.server, "user@example.com").await;
    let id = body["id"].as_i64().unwrap();
    let event = h.rx.recv().await.unwrap();

    h.server
        .post(&format!("/api/registrations/{id}/confirm"))
        .json(&json!({ "code": event.code }))
        .await
        .assert_status_ok();

    h.server
        .patch(&format!("/api/registrations/{id}/profile"))
        .json(&json!({ "display_name": "Danil" }))
        .await
        .assert_status_ok();

    h.server
        .post(&format!("/api/registrations/{id}/submit"))
        .await
        .assert_status_ok();

    let response = h
        .server
        .post("/api/registrations")
        .json(&json!({ "email": "user@example.com" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_restarting_pending_registration_reissues_code() {
    let mut h = harness();

    let body = start(&h.server, "user@example.com").await;
    let id = body["id"].as_i64().unwrap();
    let _ = h.rx.recv().await.unwrap();

    // Same address, still unconfirmed: same registration, new code.
    let response = h
        .server
        .post("/api/registrations")
        .json(&json!({ "email": "user@example.com" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["id"].as_i64().unwrap(), id);

    let event = h.rx.recv().await.unwrap();
    assert_eq!(event.registration_id, id);
}

#[tokio::test]
async fn test_step_back_and_change_email() {
    let mut h = harness();

    let body = start(&h.server, "typo@example.com").await;
    let id = body["id"].as_i64().unwrap();
    let _ = h.rx.recv().await.unwrap();

    // Back to email entry.
    let response = h
        .server
        .post(&format!("/api/registrations/{id}/back"))
        .await;

    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["step"], "email_entry");

    // Going further back conflicts.
    h.server
        .post(&format!("/api/registrations/{id}/back"))
        .await
        .assert_status(StatusCode::CONFLICT);

    // Re-enter a corrected address.
    let response = h
        .server
        .post(&format!("/api/registrations/{id}/email"))
        .json(&json!({ "email": "fixed@example.com" }))
        .await;

    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["email"], "fixed@example.com");
    assert_eq!(body["step"], "email_confirmation");

    let event = h.rx.recv().await.unwrap();
    assert_eq!(event.email, "fixed@example.com");
}

#[tokio::test]
async fn test_profile_update_clears_bio_with_null() {
    let mut h = harness();

    let body = start(&h.server, "user@example.com").await;
    let id = body["id"].as_i64().unwrap();
    let event = h.rx.recv().await.unwrap();

    h.server
        .post(&format!("/api/registrations/{id}/confirm"))
        .json(&json!({ "code": event.code }))
        .await
        .assert_status_ok();

    h.server
        .patch(&format!("/api/registrations/{id}/profile"))
        .json(&json!({ "display_name": "Danil", "bio": "temp" }))
        .await
        .assert_status_ok();

    let response = h
        .server
        .patch(&format!("/api/registrations/{id}/profile"))
        .json(&json!({ "bio": null }))
        .await;

    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["bio"], serde_json::Value::Null);
    // Absent field is untouched.
    assert_eq!(body["display_name"], "Danil");
}

#[tokio::test]
async fn test_submit_requires_display_name() {
    let mut h = harness();

    let body = start(&h.server, "user@example.com").await;
    let id = body["id"].as_i64().unwrap();
    let event = h.rx.recv().await.unwrap();

    h.server
        .post(&format!("/api/registrations/{id}/confirm"))
        .json(&json!({ "code": event.code }))
        .await
        .assert_status_ok();

    let response = h
        .server
        .post(&format!("/api/registrations/{id}/submit"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_endpoints_conflict_before_confirmation() {
    let mut h = harness();

    let body = start(&h.server, "user@example.com").await;
    let id = body["id"].as_i64().unwrap();
    let _ = h.rx.recv().await.unwrap();

    h.server
        .patch(&format!("/api/registrations/{id}/profile"))
        .json(&json!({ "display_name": "Early" }))
        .await
        .assert_status(StatusCode::CONFLICT);

    h.server
        .post(&format!("/api/registrations/{id}/submit"))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_get_unknown_registration_is_404() {
    let h = harness();

    h.server
        .get("/api/registrations/999")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
