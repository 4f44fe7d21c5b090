//! Protocol state types.
//!
//! The submission conversation walks a fixed sequence of wait states, from
//! the relay greeting to the closing reply.

use std::fmt;

/// Where a delivery conversation currently stands.
///
/// Each variant names the reply the client is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolState {
    /// Waiting for the `220` greeting.
    #[default]
    GreetingWait,
    /// `EHLO` sent, reading capability lines.
    CapabilitiesWait,
    /// `AUTH LOGIN` sent, waiting for the username challenge.
    AuthUsernameWait,
    /// Username sent, waiting for the password challenge.
    AuthPasswordWait,
    /// Password sent, waiting for `235`.
    AuthenticatedWait,
    /// `MAIL FROM` sent, waiting for the sender acknowledgement.
    SenderAckWait,
    /// `RCPT TO` sent for `declared` recipients so far.
    RecipientAckWait {
        /// Number of recipients declared, including the one awaiting acknowledgement.
        declared: usize,
    },
    /// `DATA` sent, waiting for `354`.
    DataPromptWait,
    /// Message written, waiting for the acceptance line.
    MessageAckWait,
    /// `QUIT` sent, waiting for `221`.
    ClosingWait,
    /// Conversation finished.
    Closed,
}

impl ProtocolState {
    /// Returns `true` once the conversation has finished.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Short kebab-case name used in logs and errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GreetingWait => "greeting-wait",
            Self::CapabilitiesWait => "capabilities-wait",
            Self::AuthUsernameWait => "auth-username-wait",
            Self::AuthPasswordWait => "auth-password-wait",
            Self::AuthenticatedWait => "authenticated-wait",
            Self::SenderAckWait => "sender-ack-wait",
            Self::RecipientAckWait { .. } => "recipient-ack-wait",
            Self::DataPromptWait => "data-prompt-wait",
            Self::MessageAckWait => "message-ack-wait",
            Self::ClosingWait => "closing-wait",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for ProtocolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_waiting_for_greeting() {
        assert_eq!(ProtocolState::default(), ProtocolState::GreetingWait);
    }

    #[test]
    fn only_closed_is_terminal() {
        assert!(ProtocolState::Closed.is_terminal());
        assert!(!ProtocolState::ClosingWait.is_terminal());
        assert!(!ProtocolState::GreetingWait.is_terminal());
    }

    #[test]
    fn display_names() {
        assert_eq!(
            ProtocolState::RecipientAckWait { declared: 3 }.to_string(),
            "recipient-ack-wait"
        );
        assert_eq!(ProtocolState::Closed.to_string(), "closed");
    }
}
