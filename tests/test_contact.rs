mod common;

use axum::http::StatusCode;
use common::{CmsBehavior, TestEnv};
use editorial::models::contact::{ContactForm, ContactMessage, ToastKind};

fn message() -> ContactMessage {
    ContactMessage {
        name: "Ada".into(),
        phone: "555-0100".into(),
        email: "ada@example.com".into(),
        message: "Hello there".into(),
    }
}

#[tokio::test]
async fn message_is_forwarded_to_webhook() {
    let env = TestEnv::start(CmsBehavior::default()).await;
    let server = env.server();

    let response = server.post("/api/contactus.json").json(&message()).await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);

    let delivered = env.cms.log.contact.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0]["email"], "ada@example.com");
    assert_eq!(delivered[0]["message"], "Hello there");
}

#[tokio::test]
async fn form_clears_after_successful_send() {
    let env = TestEnv::start(CmsBehavior::default()).await;
    let server = env.server_permissive();

    let mut form = ContactForm {
        fields: message(),
        submitting: false,
    };
    let outgoing = form.begin_submit().unwrap();
    let response = server.post("/api/contactus.json").json(&outgoing).await;

    let outcome = if response.status_code().is_success() { Ok(()) } else { Err(response.status_code()) };
    let toast = form.complete(outcome);

    assert_eq!(toast.kind, ToastKind::Success);
    assert!(form.fields.is_blank());
}

#[tokio::test]
async fn webhook_failure_keeps_form_and_shows_failure() {
    let env = TestEnv::start(CmsBehavior {
        contact_status: StatusCode::INTERNAL_SERVER_ERROR,
        ..CmsBehavior::default()
    })
    .await;
    let server = env.server_permissive();

    let mut form = ContactForm {
        fields: message(),
        submitting: false,
    };
    let outgoing = form.begin_submit().unwrap();
    let response = server.post("/api/contactus.json").json(&outgoing).await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let toast = form.complete(Err(response.status_code()));
    assert_eq!(toast.kind, ToastKind::Danger);
    assert_eq!(form.fields, message());
}

#[tokio::test]
async fn contact_without_webhook_is_unavailable() {
    let env = TestEnv::start_with(CmsBehavior::default(), false).await;
    let server = env.server_permissive();

    let response = server.post("/api/contactus.json").json(&message()).await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert!(env.cms.log.contact.lock().unwrap().is_empty());
}

#[tokio::test]
async fn form_encoded_message_is_forwarded() {
    let env = TestEnv::start(CmsBehavior::default()).await;
    let server = env.server();

    let response = server.post("/api/contactus.json").form(&message()).await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);

    let delivered = env.cms.log.contact.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0]["name"], "Ada");
    assert_eq!(delivered[0]["phone"], "555-0100");
}

#[tokio::test]
async fn unreadable_body_is_a_bad_request() {
    let env = TestEnv::start(CmsBehavior::default()).await;
    let server = env.server_permissive();

    let response = server.post("/api/contactus.json").text("hello").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(env.cms.log.contact.lock().unwrap().is_empty());
}
