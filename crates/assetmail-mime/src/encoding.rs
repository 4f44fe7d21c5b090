//! Body text preparation for SMTP transfer.

/// Normalizes line endings to CRLF.
///
/// Bare `\n` and bare `\r` are both turned into `\r\n`; existing CRLF pairs are kept.
#[must_use]
pub fn normalize_crlf(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 32);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\r\n");
            }
            '\n' => out.push_str("\r\n"),
            _ => out.push(c),
        }
    }

    out
}

/// Dot-stuffs CRLF-separated text (RFC 5321 section 4.5.2).
///
/// Every line starting with `.` gets an extra leading `.`, so the body can
/// never contain the end-of-data marker by accident.
#[must_use]
pub fn dot_stuff(text: &str) -> String {
    text.split("\r\n")
        .map(|line| {
            if line.starts_with('.') {
                format!(".{line}")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\r\n")
}

/// Prepares free-form body text for the DATA phase.
#[must_use]
pub fn transfer_safe(text: &str) -> String {
    dot_stuff(&normalize_crlf(text))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_bare_lf() {
        assert_eq!(normalize_crlf("a\nb\n"), "a\r\nb\r\n");
    }

    #[test]
    fn test_normalize_keeps_crlf() {
        assert_eq!(normalize_crlf("a\r\nb"), "a\r\nb");
    }

    #[test]
    fn test_normalize_bare_cr() {
        assert_eq!(normalize_crlf("a\rb"), "a\r\nb");
    }

    #[test]
    fn test_dot_stuff_leading_dot() {
        assert_eq!(dot_stuff(".hidden\r\nvisible"), "..hidden\r\nvisible");
    }

    #[test]
    fn test_dot_stuff_lone_dot() {
        assert_eq!(dot_stuff("a\r\n.\r\nb"), "a\r\n..\r\nb");
    }

    #[test]
    fn test_dot_stuff_inner_dot_untouched() {
        assert_eq!(dot_stuff("a.b\r\nc."), "a.b\r\nc.");
    }

    #[test]
    fn test_transfer_safe_combines_both() {
        assert_eq!(transfer_safe("<p>\n.\n</p>"), "<p>\r\n..\r\n</p>");
    }

    proptest! {
        #[test]
        fn transfer_safe_never_yields_lone_dot_line(s in "[a-z.\\n]{0,64}") {
            let out = transfer_safe(&s);
            prop_assert!(out.split("\r\n").all(|line| line != "."));
        }

        #[test]
        fn transfer_safe_is_identity_without_dots_or_newlines(s in "[a-zA-Z0-9 <>/]{0,64}") {
            prop_assert_eq!(transfer_safe(&s), s);
        }
    }
}
