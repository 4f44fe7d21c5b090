//! MIME message structure and wire rendering.

use crate::content_type::ContentType;
use crate::header::Headers;
use std::fmt;

/// End-of-data marker that closes the SMTP DATA phase.
pub const END_OF_DATA: &str = ".";

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    SevenBit,
    /// 8-bit text.
    EightBit,
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::EightBit => write!(f, "8bit"),
        }
    }
}

/// One alternative inside a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Part content type.
    pub content_type: ContentType,
    /// Declared transfer encoding.
    pub transfer_encoding: TransferEncoding,
    /// Body text, CRLF-separated and ready for transfer.
    pub body: String,
}

impl Part {
    /// Creates a new part.
    #[must_use]
    pub const fn new(
        content_type: ContentType,
        transfer_encoding: TransferEncoding,
        body: String,
    ) -> Self {
        Self {
            content_type,
            transfer_encoding,
            body,
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Content-Type: {}\r\n", self.content_type)?;
        write!(
            f,
            "Content-Transfer-Encoding: {}\r\n",
            self.transfer_encoding
        )?;
        write!(f, "\r\n{}\r\n", self.body)
    }
}

/// A composed `multipart/alternative` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeMessage {
    /// Boundary token separating the parts.
    pub boundary: String,
    /// Top-level headers, in wire order.
    pub headers: Headers,
    /// Plain-text alternative.
    pub text: Part,
    /// HTML alternative.
    pub html: Part,
}

impl MimeMessage {
    /// The line that opens each part.
    #[must_use]
    pub fn boundary_line(&self) -> String {
        format!("--{}", self.boundary)
    }

    /// The line that closes the multipart body.
    #[must_use]
    pub fn closing_boundary_line(&self) -> String {
        format!("--{}--", self.boundary)
    }

    /// Renders the full DATA payload, ending with the end-of-data marker.
    ///
    /// The returned text has no trailing CRLF after the final `.`; the
    /// transport adds the line terminator when writing.
    #[must_use]
    pub fn to_wire(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MimeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = self.boundary_line();
        write!(f, "{}\r\n", self.headers)?;
        write!(f, "{open}\r\n{}", self.text)?;
        write!(f, "{open}\r\n{}", self.html)?;
        write!(f, "{}\r\n\r\n{END_OF_DATA}", self.closing_boundary_line())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_encoding_display() {
        assert_eq!(TransferEncoding::SevenBit.to_string(), "7bit");
        assert_eq!(TransferEncoding::EightBit.to_string(), "8bit");
    }

    #[test]
    fn test_part_display() {
        let part = Part::new(
            ContentType::text_html(),
            TransferEncoding::EightBit,
            "<b>hi</b>".to_string(),
        );
        assert_eq!(
            part.to_string(),
            "Content-Type: text/html; charset=utf-8\r\n\
             Content-Transfer-Encoding: 8bit\r\n\
             \r\n\
             <b>hi</b>\r\n"
        );
    }

    #[test]
    fn test_boundary_lines() {
        let mut headers = Headers::new();
        headers.add("Subject", "x");
        let msg = MimeMessage {
            boundary: "abc".to_string(),
            headers,
            text: Part::new(
                ContentType::text_plain(),
                TransferEncoding::SevenBit,
                "t".to_string(),
            ),
            html: Part::new(
                ContentType::text_html(),
                TransferEncoding::EightBit,
                "h".to_string(),
            ),
        };

        assert_eq!(msg.boundary_line(), "--abc");
        assert_eq!(msg.closing_boundary_line(), "--abc--");
        assert!(msg.to_wire().ends_with("--abc--\r\n\r\n."));
    }
}
