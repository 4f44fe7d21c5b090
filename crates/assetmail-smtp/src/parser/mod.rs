//! SMTP reply line parser.

use crate::types::{ReplyCode, ReplyLine};

/// Parses one assembled reply line.
///
/// Accepted shapes:
/// - `250` (code only)
/// - `250 text` (final line)
/// - `250-text` (continuation line)
///
/// Returns `None` for anything else; the conversation ignores such lines.
#[must_use]
pub fn parse_line(line: &str) -> Option<ReplyLine> {
    let bytes = line.as_bytes();
    if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
        return None;
    }

    let code = line[..3].parse::<u16>().ok()?;

    let (is_last, text) = match bytes.get(3) {
        None => (true, ""),
        Some(b' ') => (true, &line[4..]),
        Some(b'-') => (false, &line[4..]),
        Some(_) => return None,
    };

    Some(ReplyLine {
        code: ReplyCode::new(code),
        is_last,
        text: text.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_final_line() {
        let reply = parse_line("250 2.1.0 Ok").unwrap();
        assert_eq!(reply.code.as_u16(), 250);
        assert!(reply.is_last);
        assert_eq!(reply.text, "2.1.0 Ok");
    }

    #[test]
    fn test_parse_continuation_line() {
        let reply = parse_line("250-SIZE 100").unwrap();
        assert_eq!(reply.code, ReplyCode::OK);
        assert!(!reply.is_last);
        assert_eq!(reply.text, "SIZE 100");
    }

    #[test]
    fn test_parse_code_only() {
        let reply = parse_line("354").unwrap();
        assert_eq!(reply.code, ReplyCode::START_DATA);
        assert!(reply.is_last);
        assert_eq!(reply.text, "");
    }

    #[test]
    fn test_parse_greeting() {
        let reply = parse_line("220 smtp.example.com ESMTP ready").unwrap();
        assert_eq!(reply.code, ReplyCode::SERVICE_READY);
        assert_eq!(reply.text, "smtp.example.com ESMTP ready");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_line("").is_none());
        assert!(parse_line("25").is_none());
        assert!(parse_line("ABC OK").is_none());
        assert!(parse_line("2500 nope").is_none());
        assert!(parse_line("VXNlcm5hbWU6").is_none());
    }
}
