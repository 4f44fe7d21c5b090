//! Relay configuration.
//!
//! Values are carried as-is: nothing here checks that the host resolves or
//! that credentials are present. Bad values surface as delivery failures.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use assetmail_smtp::protocol::DEFAULT_CLIENT_ID;
use assetmail_smtp::{
    CapabilityPolicy, Credentials, DEFAULT_DEADLINE, DEFAULT_PORT, RecipientPolicy,
    SessionOptions,
};

use crate::error::{Result, SubmissionError};

/// Environment variable names read by [`RelayConfig::from_env`].
pub mod env {
    /// Relay hostname.
    pub const HOST: &str = "SMTP_HOST";
    /// Relay port.
    pub const PORT: &str = "SMTP_PORT";
    /// Login username.
    pub const USER: &str = "SMTP_USER";
    /// Login password.
    pub const PASS: &str = "SMTP_PASS";
    /// Sender address.
    pub const FROM: &str = "SMTP_FROM";
    /// Default reply-to address.
    pub const REPLY_TO: &str = "SMTP_REPLY_TO";
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_client_id() -> String {
    DEFAULT_CLIENT_ID.to_string()
}

#[allow(clippy::unnecessary_wraps)]
const fn default_deadline_secs() -> Option<u64> {
    Some(DEFAULT_DEADLINE.as_secs())
}

/// Where and how to deliver submissions.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Relay hostname.
    #[serde(default)]
    pub host: String,
    /// Relay port (implicit TLS).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Login username.
    #[serde(default)]
    pub username: String,
    /// Login password.
    #[serde(default)]
    pub password: String,
    /// Sender address for every submission.
    #[serde(default)]
    pub sender: String,
    /// Reply-to used when a submission names none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    /// Name sent with `EHLO`.
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Session deadline in seconds. `null` disables it.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: Option<u64>,
    /// When the capability phase ends.
    #[serde(default)]
    pub capability_policy: CapabilityPolicy,
    /// How many recipients are declared to the relay.
    #[serde(default)]
    pub recipient_policy: RecipientPolicy,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            username: String::new(),
            password: String::new(),
            sender: String::new(),
            reply_to: None,
            client_id: default_client_id(),
            deadline_secs: default_deadline_secs(),
            capability_policy: CapabilityPolicy::default(),
            recipient_policy: RecipientPolicy::default(),
        }
    }
}

impl RelayConfig {
    /// Creates a configuration for the given relay host with defaults.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Sets the relay port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the login credentials.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Sets the sender address.
    #[must_use]
    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = sender.into();
        self
    }

    /// Sets the default reply-to address.
    #[must_use]
    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to = Some(address.into());
        self
    }

    /// Sets the `EHLO` client name.
    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Sets the session deadline. `None` waits forever.
    #[must_use]
    pub fn deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline_secs = deadline.map(|d| d.as_secs());
        self
    }

    /// Sets the capability policy.
    #[must_use]
    pub const fn capability_policy(mut self, policy: CapabilityPolicy) -> Self {
        self.capability_policy = policy;
        self
    }

    /// Sets the recipient policy.
    #[must_use]
    pub const fn recipient_policy(mut self, policy: RecipientPolicy) -> Self {
        self.recipient_policy = policy;
        self
    }

    /// Reads the configuration from the process environment.
    ///
    /// Unset variables become empty strings; an unset or unparsable port
    /// falls back to 465.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).unwrap_or_default();

        let port = match lookup(env::PORT) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(
                    "Ignoring unparsable {}={:?}, using {}",
                    env::PORT,
                    raw,
                    DEFAULT_PORT
                );
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        Self {
            host: var(env::HOST),
            port,
            username: var(env::USER),
            password: var(env::PASS),
            sender: var(env::FROM),
            reply_to: lookup(env::REPLY_TO).filter(|v| !v.is_empty()),
            ..Self::default()
        }
    }

    /// Loads the configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)
            .map_err(|e| SubmissionError::Config(format!("{}: {e}", path.display())))?;
        tracing::info!("Loaded relay configuration from {}", path.display());
        Ok(config)
    }

    /// Relay address and login for a session.
    #[must_use]
    pub fn session_credentials(&self) -> Credentials {
        Credentials::new(
            self.host.as_str(),
            self.port,
            self.username.as_str(),
            self.password.as_str(),
        )
    }

    /// Session behaviour derived from this configuration.
    #[must_use]
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            client_id: self.client_id.clone(),
            deadline: self.deadline_secs.map(Duration::from_secs),
            capability_policy: self.capability_policy,
            recipient_policy: self.recipient_policy,
        }
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("sender", &self.sender)
            .field("reply_to", &self.reply_to)
            .field("client_id", &self.client_id)
            .field("deadline_secs", &self.deadline_secs)
            .field("capability_policy", &self.capability_policy)
            .field("recipient_policy", &self.recipient_policy)
            .finish()
    }
}
