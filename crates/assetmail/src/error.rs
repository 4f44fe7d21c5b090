//! Error types for the submission gate.

use thiserror::Error;

/// Errors that can occur while accepting or delivering a submission.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// One or more required fields were absent or empty.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// The request body was not a JSON object.
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    /// One or more fields were present with the wrong JSON type.
    #[error("Invalid fields: {}", .0.join(", "))]
    InvalidFields(Vec<&'static str>),

    /// The relay conversation failed.
    #[error("Delivery failed: {0}")]
    Delivery(#[from] assetmail_smtp::Error),

    /// Relay configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`SubmissionError`].
pub type Result<T> = std::result::Result<T, SubmissionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_listed() {
        let err = SubmissionError::MissingFields(vec!["subject", "html"]);
        assert_eq!(err.to_string(), "Missing required fields: subject, html");
    }

    #[test]
    fn invalid_fields_are_listed() {
        let err = SubmissionError::InvalidFields(vec!["replyTo"]);
        assert_eq!(err.to_string(), "Invalid fields: replyTo");
    }
}
