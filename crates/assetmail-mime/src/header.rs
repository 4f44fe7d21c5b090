//! Ordered header block.

use std::fmt;

/// Collection of email headers in insertion order.
///
/// Values are written as given. Callers must not pass values containing
/// line breaks; no folding or RFC 2047 encoding is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Returns an iterator over all headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl fmt::Display for Headers {
    /// Renders each header as `Name: value` followed by CRLF.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_new() {
        let headers = Headers::new();
        assert_eq!(headers.to_string(), "");
    }

    #[test]
    fn test_headers_allow_repeats() {
        let mut headers = Headers::new();
        headers.add("Received", "a");
        headers.add("Received", "b");
        assert_eq!(headers.to_string(), "Received: a\r\nReceived: b\r\n");
    }

    #[test]
    fn test_headers_keep_insertion_order() {
        let mut headers = Headers::new();
        headers.add("To", "b@example.com");
        headers.add("From", "a@example.com");
        headers.add("Subject", "Hi");

        let names: Vec<_> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["To", "From", "Subject"]);
    }

    #[test]
    fn test_headers_display() {
        let mut headers = Headers::new();
        headers.add("From", "sender@example.com");
        headers.add("To", "recipient@example.com");

        assert_eq!(
            headers.to_string(),
            "From: sender@example.com\r\nTo: recipient@example.com\r\n"
        );
    }

    #[test]
    fn test_headers_value_written_verbatim() {
        let mut headers = Headers::new();
        headers.add("Subject", "Ünïcode: \"quoted\" <text>");
        assert_eq!(
            headers.to_string(),
            "Subject: Ünïcode: \"quoted\" <text>\r\n"
        );
    }
}
