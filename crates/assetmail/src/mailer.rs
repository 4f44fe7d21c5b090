//! The delivery seam between the submission gate and the SMTP session.

use std::future::Future;

use assetmail_mime::EmailRequest;
use assetmail_smtp::{Credentials, Delivered, SessionOptions, deliver};

use crate::config::RelayConfig;

/// Something that can deliver one email.
pub trait Mailer {
    /// Delivers the request, returning once the relay has accepted it.
    fn send(
        &self,
        request: &EmailRequest,
    ) -> impl Future<Output = assetmail_smtp::Result<Delivered>> + Send;
}

/// [`Mailer`] backed by a fresh implicit-TLS SMTP session per email.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    credentials: Credentials,
    options: SessionOptions,
}

impl SmtpMailer {
    /// Creates a mailer for the configured relay.
    #[must_use]
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            credentials: config.session_credentials(),
            options: config.session_options(),
        }
    }

    /// Relay this mailer connects to, as `host:port`.
    #[must_use]
    pub fn relay(&self) -> String {
        format!("{}:{}", self.credentials.host, self.credentials.port)
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, request: &EmailRequest) -> assetmail_smtp::Result<Delivered> {
        deliver(request, &self.credentials, &self.options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailer_takes_relay_from_config() {
        let config = RelayConfig::new("smtp.example.com")
            .port(2465)
            .credentials("u", "hunter2");
        let mailer = SmtpMailer::new(&config);
        assert_eq!(mailer.relay(), "smtp.example.com:2465");
        assert!(!format!("{mailer:?}").contains("hunter2"));
    }

    #[tokio::test]
    async fn invalid_request_never_connects() {
        let mailer = SmtpMailer::new(&RelayConfig::new("relay.invalid"));
        let request = EmailRequest::new("a@x.com", "", "<p>x</p>").to("b@x.com");
        let err = mailer.send(&request).await.err();
        assert!(matches!(err, Some(assetmail_smtp::Error::InvalidRequest(_))));
    }
}
