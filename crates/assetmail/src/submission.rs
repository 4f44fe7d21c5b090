//! The `POST /api/send-email` submission gate.
//!
//! A submission is validated before any network activity. Only a complete
//! request reaches the [`Mailer`]; delivery failures are logged and reported
//! to the caller as a generic error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use assetmail_mime::EmailRequest;

use crate::config::RelayConfig;
use crate::error::{Result, SubmissionError};
use crate::mailer::Mailer;

/// Path the submission gate is mounted on.
pub const SUBMISSION_PATH: &str = "/api/send-email";

/// One address or a list of addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    /// A single address.
    One(String),
    /// Several addresses, in order.
    Many(Vec<String>),
}

impl Recipients {
    /// Returns `true` if there is no usable address.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(addr) => addr.trim().is_empty(),
            Self::Many(addrs) => addrs.is_empty() || addrs.iter().any(|a| a.trim().is_empty()),
        }
    }

    /// Converts into an ordered list of addresses.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(addr) => vec![addr],
            Self::Many(addrs) => addrs,
        }
    }
}

/// JSON body accepted by the submission gate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    /// Recipient address or addresses.
    #[serde(default)]
    pub to: Option<Recipients>,
    /// Subject line.
    #[serde(default)]
    pub subject: Option<String>,
    /// HTML body.
    #[serde(default)]
    pub html: Option<String>,
    /// Reply-to address overriding the configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

impl SubmissionRequest {
    /// Parses a JSON request body.
    ///
    /// Each field is checked on its own so that a wrong-typed field is
    /// reported by name. `null` counts as absent.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::InvalidBody`] if the body is not a JSON
    /// object and [`SubmissionError::InvalidFields`] naming every field of the
    /// wrong type.
    pub fn from_json(body: &str) -> Result<Self> {
        let object: Map<String, Value> = serde_json::from_str(body)?;
        let mut invalid = Vec::new();

        let request = Self {
            to: field(&object, "to", &mut invalid),
            subject: field(&object, "subject", &mut invalid),
            html: field(&object, "html", &mut invalid),
            reply_to: field(&object, "replyTo", &mut invalid),
        };

        if invalid.is_empty() {
            Ok(request)
        } else {
            Err(SubmissionError::InvalidFields(invalid))
        }
    }

    /// Lists required fields that are absent or empty.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.to.as_ref().is_none_or(Recipients::is_empty) {
            missing.push("to");
        }
        if self.subject.as_deref().is_none_or(str::is_empty) {
            missing.push("subject");
        }
        if self.html.as_deref().is_none_or(str::is_empty) {
            missing.push("html");
        }
        missing
    }

    /// Builds the email to deliver, using the configured sender and default
    /// reply-to.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::MissingFields`] if any required field is
    /// absent or empty.
    pub fn into_email(self, config: &RelayConfig) -> Result<EmailRequest> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(SubmissionError::MissingFields(missing));
        }

        let mut email = EmailRequest::new(
            config.sender.as_str(),
            self.subject.unwrap_or_default(),
            self.html.unwrap_or_default(),
        );
        email.to = self.to.map(Recipients::into_vec).unwrap_or_default();
        email.reply_to = self
            .reply_to
            .filter(|r| !r.is_empty())
            .or_else(|| config.reply_to.clone());
        Ok(email)
    }
}

fn field<T: DeserializeOwned>(
    object: &Map<String, Value>,
    name: &'static str,
    invalid: &mut Vec<&'static str>,
) -> Option<T> {
    match object.get(name) {
        None | Some(Value::Null) => None,
        Some(value) => T::deserialize(value).map_or_else(
            |_| {
                invalid.push(name);
                None
            },
            Some,
        ),
    }
}

/// Status and JSON body returned by the submission gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResponse {
    /// HTTP status code.
    pub status: u16,
    /// JSON response body.
    pub body: Value,
}

impl SubmissionResponse {
    /// `200` after the relay accepted the message.
    #[must_use]
    pub fn delivered() -> Self {
        Self {
            status: 200,
            body: json!({ "success": true }),
        }
    }

    /// `400` naming the missing fields.
    #[must_use]
    pub fn missing_fields(fields: &[&str]) -> Self {
        Self {
            status: 400,
            body: json!({ "error": "Missing required fields", "missing": fields }),
        }
    }

    /// `400` naming fields that had the wrong JSON type.
    #[must_use]
    pub fn invalid_fields(fields: &[&str]) -> Self {
        Self {
            status: 400,
            body: json!({ "error": "Invalid fields", "invalid": fields }),
        }
    }

    /// `400` for a body that is not a JSON object.
    #[must_use]
    pub fn invalid_body() -> Self {
        Self {
            status: 400,
            body: json!({ "error": "Invalid request body" }),
        }
    }

    /// `405` for anything but `POST`.
    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self {
            status: 405,
            body: json!({ "error": "Method not allowed" }),
        }
    }

    /// `500` for any delivery failure. The cause is not included.
    #[must_use]
    pub fn failed() -> Self {
        Self {
            status: 500,
            body: json!({ "error": "Failed to send email" }),
        }
    }

    /// Returns `true` for a `2xx` status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Validates a raw request body into an email ready to deliver.
///
/// # Errors
///
/// Returns [`SubmissionError::InvalidBody`] for malformed JSON,
/// [`SubmissionError::InvalidFields`] for wrong-typed fields and
/// [`SubmissionError::MissingFields`] for incomplete submissions.
pub fn prepare_submission(body: &str, config: &RelayConfig) -> Result<EmailRequest> {
    SubmissionRequest::from_json(body)?.into_email(config)
}

/// Handles one request to the submission gate.
///
/// Method and body are checked before the mailer is called; the mailer is
/// called at most once.
pub async fn handle_submission<M: Mailer>(
    method: &str,
    body: &str,
    config: &RelayConfig,
    mailer: &M,
) -> SubmissionResponse {
    if !method.eq_ignore_ascii_case("POST") {
        tracing::debug!("Rejecting {} {}", method, SUBMISSION_PATH);
        return SubmissionResponse::method_not_allowed();
    }

    let email = match prepare_submission(body, config) {
        Ok(email) => email,
        Err(SubmissionError::MissingFields(fields)) => {
            tracing::warn!("Rejecting submission, missing: {}", fields.join(", "));
            return SubmissionResponse::missing_fields(&fields);
        }
        Err(SubmissionError::InvalidFields(fields)) => {
            tracing::warn!("Rejecting submission, invalid: {}", fields.join(", "));
            return SubmissionResponse::invalid_fields(&fields);
        }
        Err(e) => {
            tracing::warn!("Rejecting submission: {}", e);
            return SubmissionResponse::invalid_body();
        }
    };

    match mailer.send(&email).await {
        Ok(delivered) => {
            tracing::info!(
                "Submission \"{}\" accepted for {}",
                email.subject,
                delivered.recipients.join(", ")
            );
            SubmissionResponse::delivered()
        }
        Err(e) => {
            tracing::warn!("Failed to send \"{}\": {}", email.subject, e);
            SubmissionResponse::failed()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> RelayConfig {
        RelayConfig::new("smtp.example.com").sender("noreply@assets.example")
    }

    #[test]
    fn single_recipient_string() {
        let req = SubmissionRequest::from_json(
            r#"{"to":"ops@example.com","subject":"Audit","html":"<p>due</p>"}"#,
        )
        .unwrap();
        assert_eq!(req.to, Some(Recipients::One("ops@example.com".to_string())));

        let email = req.into_email(&config()).unwrap();
        assert_eq!(email.to, vec!["ops@example.com"]);
        assert_eq!(email.from, "noreply@assets.example");
    }

    #[test]
    fn recipient_list_keeps_order() {
        let email = prepare_submission(
            r#"{"to":["b@x.com","a@x.com"],"subject":"s","html":"<p>h</p>"}"#,
            &config(),
        )
        .unwrap();
        assert_eq!(email.to, vec!["b@x.com", "a@x.com"]);
    }

    #[test]
    fn all_missing_fields_are_named() {
        let req = SubmissionRequest::from_json("{}").unwrap();
        assert_eq!(req.missing_fields(), vec!["to", "subject", "html"]);
    }

    #[test]
    fn empty_values_count_as_missing() {
        let req =
            SubmissionRequest::from_json(r#"{"to":[],"subject":"","html":"<p>x</p>"}"#).unwrap();
        assert_eq!(req.missing_fields(), vec!["to", "subject"]);

        let req =
            SubmissionRequest::from_json(r#"{"to":["a@x.com",""],"subject":"s","html":"h"}"#)
                .unwrap();
        assert_eq!(req.missing_fields(), vec!["to"]);
    }

    #[test]
    fn reply_to_prefers_request_then_config() {
        let cfg = config().reply_to("desk@assets.example");

        let email = prepare_submission(
            r#"{"to":"a@x.com","subject":"s","html":"h","replyTo":"me@x.com"}"#,
            &cfg,
        )
        .unwrap();
        assert_eq!(email.reply_to.as_deref(), Some("me@x.com"));

        let email = prepare_submission(r#"{"to":"a@x.com","subject":"s","html":"h"}"#, &cfg)
            .unwrap();
        assert_eq!(email.reply_to.as_deref(), Some("desk@assets.example"));

        let email = prepare_submission(r#"{"to":"a@x.com","subject":"s","html":"h"}"#, &config())
            .unwrap();
        assert_eq!(email.reply_to, None);
    }

    #[test]
    fn malformed_body_is_invalid() {
        let err = prepare_submission("not json", &config()).unwrap_err();
        assert!(matches!(err, SubmissionError::InvalidBody(_)));

        let err = prepare_submission(r#"["a@x.com"]"#, &config()).unwrap_err();
        assert!(matches!(err, SubmissionError::InvalidBody(_)));
    }

    #[test]
    fn wrong_typed_fields_are_named() {
        let err = prepare_submission(
            r#"{"to":"a@x.com","subject":"s","html":"<p>h</p>","replyTo":5}"#,
            &config(),
        )
        .unwrap_err();
        assert!(matches!(err, SubmissionError::InvalidFields(f) if f == vec!["replyTo"]));

        let err = prepare_submission(r#"{"to":42,"subject":"s","html":["h"]}"#, &config())
            .unwrap_err();
        assert!(matches!(err, SubmissionError::InvalidFields(f) if f == vec!["to", "html"]));
    }

    #[test]
    fn null_counts_as_absent() {
        let req = SubmissionRequest::from_json(
            r#"{"to":null,"subject":"s","html":"h","replyTo":null}"#,
        )
        .unwrap();
        assert_eq!(req.missing_fields(), vec!["to"]);
        assert_eq!(req.reply_to, None);
    }

    #[test]
    fn response_bodies() {
        assert_eq!(
            SubmissionResponse::delivered().body.to_string(),
            r#"{"success":true}"#
        );
        assert_eq!(SubmissionResponse::failed().status, 500);
        assert!(!SubmissionResponse::failed().is_success());

        let resp = SubmissionResponse::missing_fields(&["html"]);
        assert_eq!(resp.status, 400);
        assert_eq!(resp.body["missing"], json!(["html"]));
    }
}
