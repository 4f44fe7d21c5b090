//! Outbound data produced by the state machine.

use std::fmt;

use crate::command::Command;

/// What the machine wants written to the relay after a transition.
///
/// The machine never touches the transport itself; the session turns each
/// emission into one write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    /// A single protocol command.
    Command(Command),
    /// The composed message body, ending with the end-of-data marker.
    Message(String),
}

impl Emission {
    /// Wire bytes for this emission, terminated with CRLF.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Command(cmd) => cmd.serialize(),
            Self::Message(body) => {
                let mut buf = Vec::with_capacity(body.len() + 2);
                buf.extend_from_slice(body.as_bytes());
                buf.extend_from_slice(b"\r\n");
                buf
            }
        }
    }

    /// Returns the command, if this is one.
    #[must_use]
    pub const fn as_command(&self) -> Option<&Command> {
        match self {
            Self::Command(cmd) => Some(cmd),
            Self::Message(_) => None,
        }
    }
}

impl From<Command> for Emission {
    fn from(cmd: Command) -> Self {
        Self::Command(cmd)
    }
}

/// Log-safe rendering: credentials and message bodies are not printed.
impl fmt::Display for Emission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(cmd) => write!(f, "{cmd}"),
            Self::Message(body) => write!(f, "<message, {} bytes>", body.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_bytes() {
        let e = Emission::from(Command::Data);
        assert_eq!(e.to_bytes(), b"DATA\r\n");
        assert_eq!(e.as_command(), Some(&Command::Data));
    }

    #[test]
    fn message_bytes_get_terminator() {
        let e = Emission::Message("Subject: x\r\n\r\nbody\r\n.".to_string());
        assert_eq!(e.to_bytes(), b"Subject: x\r\n\r\nbody\r\n.\r\n");
        assert!(e.as_command().is_none());
    }

    #[test]
    fn display_hides_body() {
        let e = Emission::Message("secret".to_string());
        assert_eq!(e.to_string(), "<message, 6 bytes>");
    }
}
