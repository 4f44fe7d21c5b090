//! SMTP extension types.

/// Extensions a relay advertises in its EHLO reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Extension {
    /// SIZE - Maximum message size
    Size(Option<usize>),
    /// AUTH - Authentication mechanisms
    Auth(Vec<AuthMechanism>),
    /// 8BITMIME - 8-bit MIME transport
    EightBitMime,
    /// PIPELINING - Command pipelining
    Pipelining,
    /// SMTPUTF8 - UTF-8 email addresses
    SmtpUtf8,
    /// Anything else, kept verbatim
    Other(String),
}

impl Extension {
    /// Parses the text of one EHLO capability line (without the `250-` prefix).
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut words = text.split_whitespace();
        let Some(keyword) = words.next() else {
            return Self::Other(text.to_string());
        };

        match keyword.to_ascii_uppercase().as_str() {
            "SIZE" => Self::Size(words.next().and_then(|s| s.parse().ok())),
            "AUTH" => Self::Auth(words.filter_map(AuthMechanism::parse).collect()),
            "8BITMIME" => Self::EightBitMime,
            "PIPELINING" => Self::Pipelining,
            "SMTPUTF8" => Self::SmtpUtf8,
            _ => Self::Other(text.to_string()),
        }
    }

    /// Returns true for the SIZE extension, with or without a limit.
    #[must_use]
    pub const fn is_size(&self) -> bool {
        matches!(self, Self::Size(_))
    }
}

/// SASL authentication mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMechanism {
    /// PLAIN - single-step plaintext
    Plain,
    /// LOGIN - username then password challenge/response
    Login,
    /// `XOAUTH2` - `OAuth2` bearer token
    XOAuth2,
}

impl AuthMechanism {
    /// Parses an authentication mechanism name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PLAIN" => Some(Self::Plain),
            "LOGIN" => Some(Self::Login),
            "XOAUTH2" => Some(Self::XOAuth2),
            _ => None,
        }
    }

    /// Returns the mechanism name as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "PLAIN",
            Self::Login => "LOGIN",
            Self::XOAuth2 => "XOAUTH2",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_with_limit() {
        assert_eq!(Extension::parse("SIZE 100"), Extension::Size(Some(100)));
    }

    #[test]
    fn size_without_limit() {
        assert_eq!(Extension::parse("size"), Extension::Size(None));
        assert!(Extension::parse("SIZE").is_size());
    }

    #[test]
    fn auth_keeps_known_mechanisms() {
        assert_eq!(
            Extension::parse("AUTH LOGIN PLAIN CRAM-MD5"),
            Extension::Auth(vec![AuthMechanism::Login, AuthMechanism::Plain])
        );
    }

    #[test]
    fn simple_keywords() {
        assert_eq!(Extension::parse("8BITMIME"), Extension::EightBitMime);
        assert_eq!(Extension::parse("PIPELINING"), Extension::Pipelining);
        assert_eq!(Extension::parse("SMTPUTF8"), Extension::SmtpUtf8);
    }

    #[test]
    fn unknown_and_hostname_lines() {
        // The first EHLO line carries the relay's hostname, not a keyword.
        assert_eq!(
            Extension::parse("mail.example.com Hello"),
            Extension::Other("mail.example.com Hello".to_string())
        );
        assert!(matches!(Extension::parse(""), Extension::Other(_)));
        assert!(!Extension::parse("MAXSIZE 10").is_size());
    }

    #[test]
    fn mechanism_round_trip_names() {
        for mech in [
            AuthMechanism::Plain,
            AuthMechanism::Login,
            AuthMechanism::XOAuth2,
        ] {
            assert_eq!(AuthMechanism::parse(mech.as_str()), Some(mech));
        }
        assert_eq!(AuthMechanism::parse("login"), Some(AuthMechanism::Login));
        assert_eq!(AuthMechanism::parse("GSSAPI"), None);
    }
}
