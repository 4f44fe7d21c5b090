//! Delivery session: one connection, one conversation, one outcome.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use assetmail_mime::{EmailRequest, MimeMessage, compose};

use crate::connection::{LineAssembler, ServerInfo, Transport, connect_tls};
use crate::error::{Error, Result};
use crate::protocol::{
    CapabilityPolicy, Conversation, DEFAULT_CLIENT_ID, Machine, RecipientPolicy,
};

/// Implicit-TLS submission port.
pub const DEFAULT_PORT: u16 = 465;

/// Upper bound on a whole delivery unless configured otherwise.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(60);

/// Relay address and login for one delivery attempt.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Relay hostname.
    pub host: String,
    /// Relay port.
    pub port: u16,
    /// Login username.
    pub username: String,
    /// Login password.
    pub password: String,
}

impl Credentials {
    /// Creates credentials for the given relay.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Per-session behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Name sent with `EHLO`.
    pub client_id: String,
    /// Bound on connect plus the whole conversation. `None` waits forever.
    pub deadline: Option<Duration>,
    /// When the capability phase ends.
    pub capability_policy: CapabilityPolicy,
    /// How many recipients are declared.
    pub recipient_policy: RecipientPolicy,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            deadline: Some(DEFAULT_DEADLINE),
            capability_policy: CapabilityPolicy::default(),
            recipient_policy: RecipientPolicy::default(),
        }
    }
}

/// Successful outcome of a delivery session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivered {
    /// Recipients declared to the relay with `RCPT TO`.
    pub recipients: Vec<String>,
    /// Capabilities the relay advertised.
    pub server: ServerInfo,
}

/// Builds the conversation for a request using the given options.
///
/// # Errors
///
/// Returns an error if the request fails validation.
pub fn prepare(
    request: &EmailRequest,
    message: &MimeMessage,
    credentials: &Credentials,
    options: &SessionOptions,
) -> Result<Conversation> {
    let conversation = Conversation::new(
        request,
        message,
        credentials.username.as_str(),
        credentials.password.as_str(),
    )?
    .client_id(options.client_id.as_str())
    .capability_policy(options.capability_policy)
    .recipient_policy(options.recipient_policy);

    let declared = conversation.declared_recipients().len();
    if declared < request.to.len() {
        tracing::warn!(
            "Only {} of {} recipients will be declared to the relay; the rest appear in To: only",
            declared,
            request.to.len()
        );
    }

    Ok(conversation)
}

/// Delivers one email over a fresh implicit-TLS connection.
///
/// The request is validated and composed before any network activity. The
/// session succeeds only when the relay acknowledges `QUIT`; transport
/// errors, an early close or the deadline end it with an error. Nothing is
/// retried.
///
/// # Errors
///
/// Returns an error if validation, connecting, the TLS handshake or any
/// read/write fails, the relay closes early, or the deadline elapses.
pub async fn deliver(
    request: &EmailRequest,
    credentials: &Credentials,
    options: &SessionOptions,
) -> Result<Delivered> {
    let message = compose(request);
    let conversation = prepare(request, &message, credentials, options)?;

    let delivered = with_deadline(options.deadline, async {
        let transport = connect_tls(&credentials.host, credentials.port).await?;
        converse(transport, conversation).await
    })
    .await?;

    tracing::info!(
        "Delivered \"{}\" to {} via {}:{}",
        request.subject,
        delivered.recipients.join(", "),
        credentials.host,
        credentials.port
    );
    Ok(delivered)
}

/// Drives a conversation over an already connected transport.
///
/// # Errors
///
/// Returns an error if the transport fails, the relay closes before the
/// conversation finishes, or the deadline elapses.
pub async fn run<T: Transport>(
    transport: T,
    conversation: Conversation,
    deadline: Option<Duration>,
) -> Result<Delivered> {
    with_deadline(deadline, converse(transport, conversation)).await
}

async fn with_deadline<T, F>(deadline: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| Error::Timeout(limit))?,
        None => fut.await,
    }
}

async fn converse<T: Transport>(mut transport: T, conversation: Conversation) -> Result<Delivered> {
    let mut machine = Machine::new(conversation);
    let mut assembler = LineAssembler::new();

    loop {
        let Some(chunk) = transport.receive().await? else {
            return Err(Error::ConnectionClosed {
                state: machine.state(),
            });
        };
        assembler.push(&chunk)?;

        while let Some(line) = assembler.next_line() {
            tracing::debug!("S: {}", line);

            if let Some(emission) = machine.feed(&line) {
                tracing::debug!("C: {}", emission);
                transport.send(&emission.to_bytes()).await?;
            }

            if machine.is_closed() {
                if let Err(e) = transport.close().await {
                    tracing::debug!("Ignoring error while closing relay connection: {}", e);
                }
                return Ok(Delivered {
                    recipients: machine.conversation().declared_recipients().to_vec(),
                    server: machine.server_info().clone(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_debug_redacts_password() {
        let creds = Credentials::new("smtp.example.com", DEFAULT_PORT, "user", "hunter2");
        let dbg = format!("{creds:?}");
        assert!(dbg.contains("smtp.example.com"));
        assert!(!dbg.contains("hunter2"));
    }

    #[test]
    fn default_options() {
        let opts = SessionOptions::default();
        assert_eq!(opts.client_id, "localhost");
        assert_eq!(opts.deadline, Some(Duration::from_secs(60)));
        assert_eq!(opts.capability_policy, CapabilityPolicy::RequireSize);
        assert_eq!(opts.recipient_policy, RecipientPolicy::FirstOnly);
    }

    #[tokio::test]
    async fn invalid_request_fails_before_connecting() {
        // Unroutable relay: reaching the network would hang or error differently.
        let creds = Credentials::new("relay.invalid", DEFAULT_PORT, "u", "p");
        let request = EmailRequest::new("s@x.com", "subject", "").to("a@x.com");

        let err = deliver(&request, &creds, &SessionOptions::default())
            .await
            .err();
        assert!(matches!(err, Some(Error::InvalidRequest(_))));
    }
}
