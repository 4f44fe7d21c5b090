//! Builds a `multipart/alternative` message from an [`EmailRequest`].

use crate::boundary;
use crate::content_type::ContentType;
use crate::encoding::transfer_safe;
use crate::header::Headers;
use crate::message::{MimeMessage, Part, TransferEncoding};
use crate::request::EmailRequest;

/// Plain-text alternative shown by clients that cannot render HTML.
pub const PLAIN_TEXT_FALLBACK: &str =
    "This message contains HTML content. Please view it in an HTML-capable email client.";

/// Composes a message with a freshly generated boundary.
#[must_use]
pub fn compose(request: &EmailRequest) -> MimeMessage {
    compose_with_boundary(request, boundary::generate())
}

/// Composes a message using the given boundary token.
///
/// Header values are written as supplied; they must not contain line breaks.
/// The boundary must not occur inside the HTML body.
#[must_use]
pub fn compose_with_boundary(request: &EmailRequest, boundary: impl Into<String>) -> MimeMessage {
    let boundary = boundary.into();

    let mut headers = Headers::new();
    headers.add("From", &request.from);
    headers.add("To", request.to.join(", "));
    headers.add("Subject", &request.subject);
    if let Some(reply_to) = &request.reply_to {
        headers.add("Reply-To", reply_to);
    }
    headers.add("MIME-Version", "1.0");
    headers.add(
        "Content-Type",
        ContentType::multipart_alternative(boundary.as_str()).to_string(),
    );

    let text = Part::new(
        ContentType::text_plain(),
        TransferEncoding::SevenBit,
        PLAIN_TEXT_FALLBACK.to_string(),
    );
    let html = Part::new(
        ContentType::text_html(),
        TransferEncoding::EightBit,
        transfer_safe(&request.html),
    );

    MimeMessage {
        boundary,
        headers,
        text,
        html,
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

    const BOUNDARY: &str = "----=_test_boundary";

    fn request() -> EmailRequest {
        EmailRequest::new(
            "noreply@assets.example",
            "Asset checked out",
            "<h1>Laptop #42</h1><p>Checked out by Dana.</p>",
        )
        .to("a@x.com")
    }

    fn lines(wire: &str) -> Vec<&str> {
        wire.split("\r\n").collect()
    }

    #[test]
    fn header_block_order() {
        let msg = compose_with_boundary(&request().reply_to("desk@x.com"), BOUNDARY);
        let wire = msg.to_wire();
        let lines = lines(&wire);

        assert_eq!(lines[0], "From: noreply@assets.example");
        assert_eq!(lines[1], "To: a@x.com");
        assert_eq!(lines[2], "Subject: Asset checked out");
        assert_eq!(lines[3], "Reply-To: desk@x.com");
        assert_eq!(lines[4], "MIME-Version: 1.0");
        assert_eq!(
            lines[5],
            "Content-Type: multipart/alternative; boundary=\"----=_test_boundary\""
        );
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], "------=_test_boundary");
    }

    #[test]
    fn reply_to_omitted_when_absent() {
        let wire = compose_with_boundary(&request(), BOUNDARY).to_wire();
        assert!(!wire.contains("Reply-To:"));
        assert_eq!(lines(&wire)[3], "MIME-Version: 1.0");
    }

    #[test]
    fn multiple_recipients_are_comma_joined() {
        let req = request().to("b@x.com");
        let wire = compose_with_boundary(&req, BOUNDARY).to_wire();
        assert!(lines(&wire).contains(&"To: a@x.com, b@x.com"));
    }

    #[test]
    fn boundary_lines_appear_exactly_where_expected() {
        let req = request();
        let msg = compose_with_boundary(&req, BOUNDARY);
        let wire = msg.to_wire();
        let lines = lines(&wire);

        let open = msg.boundary_line();
        let close = msg.closing_boundary_line();

        let opens: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == open)
            .map(|(i, _)| i)
            .collect();
        let closes: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == close)
            .map(|(i, _)| i)
            .collect();

        // One opening line for the text part, one for the HTML part.
        assert_eq!(opens.len(), 2);
        assert_eq!(closes.len(), 1);
        assert!(opens[1] < closes[0]);

        let html_section = lines[opens[1]..closes[0]].join("\r\n");
        assert!(html_section.contains(&req.html));
        assert!(html_section.contains("Content-Type: text/html; charset=utf-8"));
        assert!(html_section.contains("Content-Transfer-Encoding: 8bit"));
    }

    #[test]
    fn plain_text_part_carries_fallback() {
        let msg = compose_with_boundary(&request(), BOUNDARY);
        let wire = msg.to_wire();
        let text_start = wire.find("Content-Type: text/plain").unwrap();
        let html_start = wire.find("Content-Type: text/html").unwrap();
        assert!(wire[text_start..html_start].contains(PLAIN_TEXT_FALLBACK));
    }

    #[test]
    fn ends_with_closing_boundary_blank_line_and_dot() {
        let wire = compose_with_boundary(&request(), BOUNDARY).to_wire();
        assert!(wire.ends_with("------=_test_boundary--\r\n\r\n."));
    }

    #[test]
    fn html_leading_dots_are_stuffed() {
        let req = EmailRequest::new("s@x.com", "s", "<p>\n.\n</p>").to("a@x.com");
        let wire = compose_with_boundary(&req, BOUNDARY).to_wire();
        assert!(wire.contains("<p>\r\n..\r\n</p>"));
        // The only lone dot is the final end-of-data marker.
        assert_eq!(wire.split("\r\n").filter(|l| *l == ".").count(), 1);
    }

    #[test]
    fn fresh_boundary_per_message() {
        let a = compose(&request());
        let b = compose(&request());
        assert_ne!(a.boundary, b.boundary);
    }
}
