//! Connection plumbing: line assembly, transports, TLS.

mod framed;
mod stream;
mod transport;

pub use framed::{LineAssembler, Lines, MAX_LINE_LENGTH};
pub use stream::{TlsTransport, connect_tls};
pub use transport::{StreamTransport, Transport};

use crate::types::{AuthMechanism, Extension};

/// Server capabilities from the EHLO response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerInfo {
    /// Server hostname from the first EHLO line.
    pub hostname: String,
    /// Advertised extensions, in the order received.
    pub extensions: Vec<Extension>,
}

impl ServerInfo {
    /// Records one EHLO reply line. A leading non-keyword line names the server.
    pub fn record(&mut self, text: &str) {
        let ext = Extension::parse(text);
        if self.hostname.is_empty()
            && self.extensions.is_empty()
            && matches!(ext, Extension::Other(_))
        {
            self.hostname = text.split_whitespace().next().unwrap_or_default().to_string();
            return;
        }
        self.extensions.push(ext);
    }

    /// Checks if the server supports an extension.
    #[must_use]
    pub fn supports(&self, ext: &Extension) -> bool {
        self.extensions.contains(ext)
    }

    /// Returns the maximum message size, if advertised.
    #[must_use]
    pub fn max_message_size(&self) -> Option<usize> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Size(size) => *size,
            _ => None,
        })
    }

    /// Returns supported authentication mechanisms.
    #[must_use]
    pub fn auth_mechanisms(&self) -> Vec<AuthMechanism> {
        self.extensions
            .iter()
            .find_map(|ext| match ext {
                Extension::Auth(mechanisms) => Some(mechanisms.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_hostname_then_extensions() {
        let mut info = ServerInfo::default();
        info.record("mail.example.com Hello client");
        info.record("SIZE 35882577");
        info.record("AUTH LOGIN PLAIN");
        info.record("8BITMIME");

        assert_eq!(info.hostname, "mail.example.com");
        assert_eq!(info.max_message_size(), Some(35_882_577));
        assert_eq!(
            info.auth_mechanisms(),
            vec![AuthMechanism::Login, AuthMechanism::Plain]
        );
        assert!(info.supports(&Extension::EightBitMime));
        assert!(!info.supports(&Extension::Pipelining));
    }

    #[test]
    fn first_line_keyword_still_counts() {
        let mut info = ServerInfo::default();
        info.record("SIZE 100");
        assert_eq!(info.max_message_size(), Some(100));
        assert!(info.hostname.is_empty());
    }

    #[test]
    fn nothing_advertised() {
        let info = ServerInfo::default();
        assert_eq!(info.max_message_size(), None);
        assert!(info.auth_mechanisms().is_empty());
    }
}
