//! Error types for SMTP delivery.

use std::io;
use std::time::Duration;

use crate::protocol::ProtocolState;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error (connect, TLS handshake, read or write).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TLS handshake with the relay failed.
    #[error("TLS handshake failed: {0}")]
    Tls(io::Error),

    /// Relay hostname is not a valid TLS server name.
    #[error("Invalid DNS name: {0}")]
    InvalidDnsName(#[from] rustls::pki_types::InvalidDnsNameError),

    /// Protocol error (malformed framing from the relay).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The session deadline elapsed before the conversation finished.
    #[error("Delivery timed out after {0:?}")]
    Timeout(Duration),

    /// The relay closed the connection before the conversation finished.
    #[error("Connection closed by relay while in state {state}")]
    ConnectionClosed {
        /// State the conversation was stuck in.
        state: ProtocolState,
    },

    /// The email request failed validation.
    #[error("Invalid email request: {0}")]
    InvalidRequest(#[from] assetmail_mime::Error),
}

impl Error {
    /// Returns true if the failure happened on the network rather than in the request.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Tls(_) | Self::Timeout(_) | Self::ConnectionClosed { .. } | Self::Protocol(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_error_names_state() {
        let err = Error::ConnectionClosed {
            state: ProtocolState::DataPromptWait,
        };
        assert_eq!(
            err.to_string(),
            "Connection closed by relay while in state data-prompt-wait"
        );
        assert!(err.is_transport());
    }

    #[test]
    fn invalid_request_is_not_transport() {
        let err = Error::from(assetmail_mime::Error::EmptyField("html"));
        assert!(!err.is_transport());
        assert_eq!(
            err.to_string(),
            "Invalid email request: Missing required field: html"
        );
    }
}
