//! Multipart boundary generation.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// Prefix shared by every generated boundary.
pub const BOUNDARY_PREFIX: &str = "----=_assetmail_";

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generates a fresh boundary token.
///
/// The token combines the current UTC time in microseconds with a
/// process-wide counter, so two calls in the same process never return the
/// same value. The token is not checked against the body; callers supplying
/// content that may contain it must pick their own via
/// [`compose_with_boundary`](crate::compose_with_boundary).
#[must_use]
pub fn generate() -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let micros = Utc::now().timestamp_micros();
    format!("{BOUNDARY_PREFIX}{micros:x}_{seq:04x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn boundaries_are_unique() {
        let seen: HashSet<String> = (0..1000).map(|_| generate()).collect();
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn boundary_has_prefix_and_no_whitespace() {
        let b = generate();
        assert!(b.starts_with(BOUNDARY_PREFIX));
        assert!(!b.contains(char::is_whitespace));
    }
}
