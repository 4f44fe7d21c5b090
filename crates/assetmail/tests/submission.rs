//! Integration tests for the submission gate.
//!
//! A recording mailer replaces the SMTP session so the status mapping and the
//! validation gate can be checked without a relay.

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use assetmail::{Mailer, RelayConfig, handle_submission};
use assetmail_mime::EmailRequest;
use assetmail_smtp::{Delivered, Error, ProtocolState, ServerInfo};

/// Mailer that records every request and answers with a fixed outcome.
struct RecordingMailer {
    fail: bool,
    calls: AtomicUsize,
    requests: Mutex<Vec<EmailRequest>>,
}

impl RecordingMailer {
    fn accepting() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::accepting()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Mailer for RecordingMailer {
    async fn send(&self, request: &EmailRequest) -> assetmail_smtp::Result<Delivered> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(Error::ConnectionClosed {
                state: ProtocolState::AuthenticatedWait,
            });
        }
        Ok(Delivered {
            recipients: request.to.iter().take(1).cloned().collect(),
            server: ServerInfo::default(),
        })
    }
}

fn config() -> RelayConfig {
    RelayConfig::new("smtp.example.com")
        .credentials("relay-user", "s3cret")
        .sender("noreply@assets.example")
        .reply_to("it-desk@assets.example")
}

const VALID: &str = r#"{
    "to": ["alice@example.com", "bob@example.com"],
    "subject": "Laptop checkout",
    "html": "<p>MacBook Pro #A-1042 checked out</p>"
}"#;

#[tokio::test]
async fn valid_submission_is_delivered() {
    let mailer = RecordingMailer::accepting();

    let response = handle_submission("POST", VALID, &config(), &mailer).await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({ "success": true }));
    assert_eq!(mailer.calls(), 1);

    let sent = mailer.requests.lock().unwrap();
    assert_eq!(sent[0].from, "noreply@assets.example");
    assert_eq!(sent[0].to, vec!["alice@example.com", "bob@example.com"]);
    assert_eq!(sent[0].subject, "Laptop checkout");
    assert_eq!(sent[0].reply_to.as_deref(), Some("it-desk@assets.example"));
}

#[tokio::test]
async fn missing_html_never_reaches_mailer() {
    let mailer = RecordingMailer::accepting();
    let body = r#"{"to": "alice@example.com", "subject": "Laptop checkout"}"#;

    let response = handle_submission("POST", body, &config(), &mailer).await;

    assert_eq!(response.status, 400);
    assert_eq!(
        response.body,
        json!({ "error": "Missing required fields", "missing": ["html"] })
    );
    assert_eq!(mailer.calls(), 0);
}

#[tokio::test]
async fn every_missing_field_is_reported() {
    let mailer = RecordingMailer::accepting();

    let response = handle_submission("POST", r#"{"replyTo": "x@y.com"}"#, &config(), &mailer).await;

    assert_eq!(response.status, 400);
    assert_eq!(response.body["missing"], json!(["to", "subject", "html"]));
    assert_eq!(mailer.calls(), 0);
}

#[tokio::test]
async fn malformed_body_is_a_client_error() {
    let mailer = RecordingMailer::accepting();

    let response = handle_submission("POST", "{\"to\": ", &config(), &mailer).await;

    assert_eq!(response.status, 400);
    assert_eq!(response.body, json!({ "error": "Invalid request body" }));
    assert_eq!(mailer.calls(), 0);
}

#[tokio::test]
async fn wrong_typed_reply_to_is_named() {
    let mailer = RecordingMailer::accepting();
    let body = r#"{"to": "a@x.com", "subject": "s", "html": "<p>h</p>", "replyTo": 5}"#;

    let response = handle_submission("POST", body, &config(), &mailer).await;

    assert_eq!(response.status, 400);
    assert_eq!(
        response.body,
        json!({ "error": "Invalid fields", "invalid": ["replyTo"] })
    );
    assert_eq!(mailer.calls(), 0);
}

#[tokio::test]
async fn wrong_typed_to_is_named() {
    let mailer = RecordingMailer::accepting();
    let body = r#"{"to": {"address": "a@x.com"}, "subject": "s", "html": "<p>h</p>"}"#;

    let response = handle_submission("POST", body, &config(), &mailer).await;

    assert_eq!(response.status, 400);
    assert_eq!(response.body["invalid"], json!(["to"]));
    assert_eq!(mailer.calls(), 0);
}

#[tokio::test]
async fn non_post_methods_are_rejected() {
    let mailer = RecordingMailer::accepting();

    for method in ["GET", "PUT", "DELETE", "PATCH", "OPTIONS"] {
        let response = handle_submission(method, VALID, &config(), &mailer).await;
        assert_eq!(response.status, 405, "{method}");
    }
    assert_eq!(mailer.calls(), 0);
}

#[tokio::test]
async fn method_is_case_insensitive() {
    let mailer = RecordingMailer::accepting();
    let response = handle_submission("post", VALID, &config(), &mailer).await;
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn delivery_failure_hides_cause() {
    let mailer = RecordingMailer::failing();

    let response = handle_submission("POST", VALID, &config(), &mailer).await;

    assert_eq!(response.status, 500);
    assert_eq!(response.body, json!({ "error": "Failed to send email" }));
    assert!(!response.body.to_string().contains("authenticated"));
    assert_eq!(mailer.calls(), 1);
}

#[tokio::test]
async fn request_reply_to_overrides_default() {
    let mailer = RecordingMailer::accepting();
    let body = r#"{
        "to": "alice@example.com",
        "subject": "Return reminder",
        "html": "<p>Due Friday</p>",
        "replyTo": "facilities@assets.example"
    }"#;

    let response = handle_submission("POST", body, &config(), &mailer).await;

    assert_eq!(response.status, 200);
    let sent = mailer.requests.lock().unwrap();
    assert_eq!(sent[0].reply_to.as_deref(), Some("facilities@assets.example"));
    assert_eq!(sent[0].to, vec!["alice@example.com"]);
}
