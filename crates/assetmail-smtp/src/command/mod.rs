//! SMTP command builder.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::types::AuthMechanism;

/// SMTP command.
#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    /// EHLO - Extended greeting
    Ehlo {
        /// Client hostname
        hostname: String,
    },
    /// AUTH - Begin authentication
    Auth {
        /// Authentication mechanism
        mechanism: AuthMechanism,
    },
    /// Base64-encoded answer to an AUTH challenge
    AuthResponse {
        /// Encoded credential value
        encoded: String,
    },
    /// MAIL FROM - Start mail transaction
    MailFrom {
        /// Sender address
        from: String,
    },
    /// RCPT TO - Add recipient
    RcptTo {
        /// Recipient address
        to: String,
    },
    /// DATA - Begin message data
    Data,
    /// QUIT - Close connection
    Quit,
}

impl Command {
    /// Builds an AUTH challenge answer from a plaintext credential.
    #[must_use]
    pub fn auth_response(value: &str) -> Self {
        Self::AuthResponse {
            encoded: STANDARD.encode(value.as_bytes()),
        }
    }

    /// Serializes the command to bytes, including the CRLF terminator.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        match self {
            Self::Ehlo { hostname } => {
                buf.extend_from_slice(b"EHLO ");
                buf.extend_from_slice(hostname.as_bytes());
            }
            Self::Auth { mechanism } => {
                buf.extend_from_slice(b"AUTH ");
                buf.extend_from_slice(mechanism.as_str().as_bytes());
            }
            Self::AuthResponse { encoded } => {
                buf.extend_from_slice(encoded.as_bytes());
            }
            Self::MailFrom { from } => {
                buf.extend_from_slice(b"MAIL FROM:<");
                buf.extend_from_slice(from.as_bytes());
                buf.push(b'>');
            }
            Self::RcptTo { to } => {
                buf.extend_from_slice(b"RCPT TO:<");
                buf.extend_from_slice(to.as_bytes());
                buf.push(b'>');
            }
            Self::Data => {
                buf.extend_from_slice(b"DATA");
            }
            Self::Quit => {
                buf.extend_from_slice(b"QUIT");
            }
        }

        buf.extend_from_slice(b"\r\n");
        buf
    }
}

/// Credentials never reach logs or debug output.
impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthResponse { .. } => f.write_str("AuthResponse(<redacted>)"),
            Self::Ehlo { hostname } => write!(f, "Ehlo({hostname})"),
            Self::Auth { mechanism } => write!(f, "Auth({})", mechanism.as_str()),
            Self::MailFrom { from } => write!(f, "MailFrom({from})"),
            Self::RcptTo { to } => write!(f, "RcptTo({to})"),
            Self::Data => f.write_str("Data"),
            Self::Quit => f.write_str("Quit"),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthResponse { .. } => f.write_str("<credentials>"),
            _ => {
                let wire = self.serialize();
                let text = String::from_utf8_lossy(&wire);
                f.write_str(text.trim_end())
            }
        }
    }
}
