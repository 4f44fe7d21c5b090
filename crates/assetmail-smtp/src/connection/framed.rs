//! Line assembly for the SMTP reply stream.
//!
//! The transport hands over raw chunks cut at arbitrary byte offsets. The
//! assembler buffers them and yields complete CRLF-terminated lines, keeping
//! any trailing partial line until the rest of it arrives.

use bytes::{Buf, BytesMut};

use crate::error::{Error, Result};

/// Default buffer size for reading.
pub(crate) const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Maximum line length to prevent memory exhaustion.
pub const MAX_LINE_LENGTH: usize = 1024 * 1024; // 1 MB

/// Reassembles protocol lines from an arbitrarily chunked byte stream.
///
/// One assembler belongs to one connection. Lines come out in arrival order,
/// with the terminator stripped.
#[derive(Debug)]
pub struct LineAssembler {
    buffer: BytesMut,
    max_line_length: usize,
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl LineAssembler {
    /// Creates an empty assembler with the default line limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_line_length(MAX_LINE_LENGTH)
    }

    /// Creates an empty assembler that rejects partial lines longer than `max`.
    #[must_use]
    pub fn with_max_line_length(max: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(DEFAULT_BUFFER_SIZE),
            max_line_length: max,
        }
    }

    /// Appends a chunk received from the transport.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the partial line after the last CRLF is
    /// longer than the line limit.
    pub fn push(&mut self, chunk: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(chunk);

        let partial = match find_last_crlf(&self.buffer) {
            Some(pos) => self.buffer.len() - (pos + 2),
            None => self.buffer.len(),
        };
        if partial > self.max_line_length {
            return Err(Error::Protocol(format!(
                "line too long: {} bytes without CRLF (max {})",
                partial, self.max_line_length
            )));
        }

        Ok(())
    }

    /// Removes and returns the next complete line, without its CRLF.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; the conversation only
    /// inspects ASCII reply codes and fixed challenge strings.
    pub fn next_line(&mut self) -> Option<String> {
        let pos = find_crlf(&self.buffer)?;
        let line = String::from_utf8_lossy(&self.buffer[..pos]).into_owned();
        self.buffer.advance(pos + 2);
        Some(line)
    }

    /// Drains every complete line currently buffered.
    pub fn lines(&mut self) -> Lines<'_> {
        Lines { assembler: self }
    }

    /// Bytes of the partial line waiting for its terminator.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }
}

/// Iterator over the complete lines of a [`LineAssembler`].
#[derive(Debug)]
pub struct Lines<'a> {
    assembler: &'a mut LineAssembler,
}

impl Iterator for Lines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.assembler.next_line()
    }
}

/// Finds the position of CRLF in a buffer.
fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

/// Finds the position of the last CRLF in a buffer.
fn find_last_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).rposition(|w| w == b"\r\n")
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
    use proptest::prelude::*;

    #[test]
    fn test_single_chunk_single_line() {
        let mut asm = LineAssembler::new();
        asm.push(b"220 ready\r\n").unwrap();
        assert_eq!(asm.next_line().as_deref(), Some("220 ready"));
        assert_eq!(asm.next_line(), None);
        assert!(asm.pending().is_empty());
    }

    #[test]
    fn test_many_lines_in_one_chunk() {
        let mut asm = LineAssembler::new();
        asm.push(b"250-SIZE 100\r\n250-8BITMIME\r\n250 SIZE 100\r\n")
            .unwrap();
        let lines: Vec<String> = asm.lines().collect();
        assert_eq!(lines, vec!["250-SIZE 100", "250-8BITMIME", "250 SIZE 100"]);
    }

    #[test]
    fn test_partial_line_is_retained() {
        let mut asm = LineAssembler::new();
        asm.push(b"235 auth ok\r\n250 2.1").unwrap();
        assert_eq!(asm.next_line().as_deref(), Some("235 auth ok"));
        assert_eq!(asm.next_line(), None);
        assert_eq!(asm.pending(), b"250 2.1");

        asm.push(b".0 Ok\r\n").unwrap();
        assert_eq!(asm.next_line().as_deref(), Some("250 2.1.0 Ok"));
        assert!(asm.pending().is_empty());
    }

    #[test]
    fn test_terminator_split_between_cr_and_lf() {
        let mut asm = LineAssembler::new();
        asm.push(b"354 start input\r").unwrap();
        assert_eq!(asm.next_line(), None);
        asm.push(b"\n").unwrap();
        assert_eq!(asm.next_line().as_deref(), Some("354 start input"));
    }

    #[test]
    fn test_bare_lf_is_not_a_terminator() {
        let mut asm = LineAssembler::new();
        asm.push(b"220 a\nb\r\n").unwrap();
        assert_eq!(asm.next_line().as_deref(), Some("220 a\nb"));
    }

    #[test]
    fn test_empty_line() {
        let mut asm = LineAssembler::new();
        asm.push(b"\r\n221 bye\r\n").unwrap();
        assert_eq!(asm.next_line().as_deref(), Some(""));
        assert_eq!(asm.next_line().as_deref(), Some("221 bye"));
    }

    #[test]
    fn test_line_too_long() {
        let mut asm = LineAssembler::with_max_line_length(8);
        assert!(asm.push(b"220 ").is_ok());
        assert!(matches!(
            asm.push(b"much too long"),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn test_oversized_tail_after_complete_line() {
        let mut asm = LineAssembler::with_max_line_length(8);
        let err = asm.push(b"220 ok\r\n250-0123456789").unwrap_err();
        assert!(matches!(err, Error::Protocol(msg) if msg.contains("14 bytes")));
    }

    #[test]
    fn test_tail_within_limit_after_complete_line() {
        let mut asm = LineAssembler::with_max_line_length(8);
        asm.push(b"220 ok\r\n250 2.1").unwrap();
        assert_eq!(asm.next_line().as_deref(), Some("220 ok"));
        assert_eq!(asm.pending(), b"250 2.1");
    }

    #[test]
    fn test_long_buffer_with_terminator_is_fine() {
        let mut asm = LineAssembler::with_max_line_length(8);
        asm.push(b"220 ok\r\n250 ok\r\n").unwrap();
        assert_eq!(asm.lines().count(), 2);
    }

    proptest! {
        #[test]
        fn split_line_reassembles_identically(
            line in "[0-9]{3}[ -][ -~]{0,80}",
            offset in 0usize..200,
        ) {
            let wire = format!("{line}\r\n");
            let cut = offset % (wire.len() + 1);

            let mut asm = LineAssembler::new();
            asm.push(&wire.as_bytes()[..cut]).unwrap();
            let early: Vec<String> = asm.lines().collect();
            asm.push(&wire.as_bytes()[cut..]).unwrap();
            let late: Vec<String> = asm.lines().collect();

            let all: Vec<String> = early.into_iter().chain(late).collect();
            prop_assert_eq!(all, vec![line]);
            prop_assert!(asm.pending().is_empty());
        }

        #[test]
        fn arbitrary_chunking_preserves_order(
            lines in proptest::collection::vec("[ -~]{0,40}", 1..10),
            chunk in 1usize..17,
        ) {
            let wire: String = lines.iter().map(|l| format!("{l}\r\n")).collect();

            let mut asm = LineAssembler::new();
            let mut out = Vec::new();
            for piece in wire.as_bytes().chunks(chunk) {
                asm.push(piece).unwrap();
                out.extend(asm.lines());
            }

            prop_assert_eq!(out, lines);
            prop_assert!(asm.pending().is_empty());
        }
    }
}
