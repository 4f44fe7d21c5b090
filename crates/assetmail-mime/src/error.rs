//! Error types for message composition.

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A required request field is empty.
    #[error("Missing required field: {0}")]
    EmptyField(&'static str),

    /// The request names no recipients.
    #[error("At least one recipient is required")]
    NoRecipients,
}
